//! Scripted session for driver tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;

use super::session::{ExecOutput, SessionHandle, ShellChannel};
use crate::error::{ChannelError, Result, TransportError};

/// How the shell misbehaves once its trigger line has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Reads fail with a transport timeout.
    Timeout,
    /// Reads and writes fail because the channel closed.
    Closed,
    /// The trigger write itself fails.
    WriteFailure,
    /// Reads return nothing.
    Silent,
}

#[derive(Debug, Default)]
struct Script {
    banner: String,
    replies: HashMap<String, String>,
    chunk_size: Option<usize>,
    fault: Option<(String, Fault)>,
    open_error: bool,
    exec_replies: HashMap<String, ExecOutput>,
    exec_default: ExecOutput,
    exec_error: bool,
}

#[derive(Debug, Default)]
struct Log {
    shell_sent: Vec<String>,
    exec_sent: Vec<String>,
    shells_opened: usize,
    shell_closed: bool,
}

/// A fake device: replies to shell lines from a table, answers exec
/// requests from another, and records everything it was sent.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockSession {
    script: Arc<Script>,
    log: Arc<Mutex<Log>>,
}

impl MockSession {
    pub(crate) fn new() -> Self {
        Self {
            script: Arc::new(Script {
                banner: "Linux sonic 5.10.0\r\nadmin@sonic:~$ ".to_string(),
                exec_default: ExecOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_status: 0,
                },
                ..Default::default()
            }),
            log: Arc::default(),
        }
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::get_mut(&mut self.script).expect("script is configured before use")
    }

    pub(crate) fn reply(mut self, line: &str, text: &str) -> Self {
        self.script_mut()
            .replies
            .insert(line.to_string(), text.to_string());
        self
    }

    pub(crate) fn chunk_size(mut self, size: usize) -> Self {
        self.script_mut().chunk_size = Some(size);
        self
    }

    pub(crate) fn fault_after(mut self, line: &str, fault: Fault) -> Self {
        self.script_mut().fault = Some((line.to_string(), fault));
        self
    }

    pub(crate) fn fail_open(mut self) -> Self {
        self.script_mut().open_error = true;
        self
    }

    pub(crate) fn exec_default(mut self, output: ExecOutput) -> Self {
        self.script_mut().exec_default = output;
        self
    }

    pub(crate) fn exec_reply(mut self, command: &str, output: ExecOutput) -> Self {
        self.script_mut()
            .exec_replies
            .insert(command.to_string(), output);
        self
    }

    pub(crate) fn exec_error(mut self) -> Self {
        self.script_mut().exec_error = true;
        self
    }

    /// Lines written to shell channels, without their newline.
    pub(crate) fn shell_sent(&self) -> Vec<String> {
        self.log.lock().unwrap().shell_sent.clone()
    }

    /// Commands submitted on exec channels.
    pub(crate) fn exec_sent(&self) -> Vec<String> {
        self.log.lock().unwrap().exec_sent.clone()
    }

    pub(crate) fn shells_opened(&self) -> usize {
        self.log.lock().unwrap().shells_opened
    }

    pub(crate) fn shell_closed(&self) -> bool {
        self.log.lock().unwrap().shell_closed
    }
}

impl SessionHandle for MockSession {
    type Shell = MockShell;

    async fn open_shell(&self) -> Result<MockShell> {
        if self.script.open_error {
            return Err(TransportError::Disconnected.into());
        }
        self.log.lock().unwrap().shells_opened += 1;
        Ok(MockShell {
            script: self.script.clone(),
            log: self.log.clone(),
            pending: self.script.banner.bytes().collect(),
            fault: None,
        })
    }

    async fn exec(&self, command: &str) -> Result<ExecOutput> {
        self.log.lock().unwrap().exec_sent.push(command.to_string());
        if self.script.exec_error {
            return Err(ChannelError::Closed.into());
        }
        Ok(self
            .script
            .exec_replies
            .get(command)
            .cloned()
            .unwrap_or_else(|| self.script.exec_default.clone()))
    }
}

pub(crate) struct MockShell {
    script: Arc<Script>,
    log: Arc<Mutex<Log>>,
    pending: VecDeque<u8>,
    fault: Option<Fault>,
}

impl ShellChannel for MockShell {
    async fn send(&mut self, data: &str) -> Result<()> {
        if self.fault == Some(Fault::Closed) {
            return Err(ChannelError::Closed.into());
        }

        let line = data.trim_end_matches('\n').to_string();
        self.log.lock().unwrap().shell_sent.push(line.clone());

        if let Some((trigger, fault)) = &self.script.fault {
            if *trigger == line {
                self.fault = Some(*fault);
                if *fault == Fault::WriteFailure {
                    return Err(ChannelError::WriteFailed("broken pipe".to_string()).into());
                }
                return Ok(());
            }
        }

        let reply = self
            .script
            .replies
            .get(&line)
            .cloned()
            .unwrap_or_else(|| format!("{line}\r\nsonic(config)# "));
        self.pending.extend(reply.bytes());
        Ok(())
    }

    async fn read_chunk(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        match self.fault {
            Some(Fault::Timeout) => return Err(TransportError::Timeout(timeout).into()),
            Some(Fault::Closed) => return Err(ChannelError::Closed.into()),
            Some(Fault::Silent) => return Ok(None),
            _ => {}
        }

        if self.pending.is_empty() {
            return Ok(None);
        }

        let take = self
            .script
            .chunk_size
            .unwrap_or(self.pending.len())
            .min(self.pending.len());
        let chunk: Vec<u8> = self.pending.drain(..take).collect();
        Ok(Some(Bytes::from(chunk)))
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().shell_closed = true;
        Ok(())
    }
}
