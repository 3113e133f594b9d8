//! Response buffer for the unframed shell stream.
//!
//! Shell output arrives in arbitrary chunks: truncated, empty, or several
//! logical responses merged together. The buffer accumulates everything
//! read since the last classification point and is emptied when the
//! driver takes it.

use bytes::BytesMut;

/// Bytes read from the shell since the last classification.
#[derive(Debug)]
pub struct ResponseBuffer {
    buffer: BytesMut,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Append a raw chunk.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the contents as text and reset.
    ///
    /// Escape sequences are stripped and UTF-8 decoded (lossily) over the
    /// whole response, so sequences and characters split across reads come
    /// out intact. Carriage returns go too; lines end in a bare `\n`.
    pub fn take_string(&mut self) -> String {
        let raw = self.buffer.split();
        String::from_utf8_lossy(&strip_ansi_escapes::strip(&raw)).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop anything read so far.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new()
    }
}
