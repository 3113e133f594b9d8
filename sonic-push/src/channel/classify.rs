//! Free-text response classification.
//!
//! The device has no structured error codes. A response fails iff it
//! contains one of the platform's failure tokens as a substring. This can
//! misfire on help text that mentions "error", and misses silent
//! rejections; nothing further is attempted.

use memchr::memmem::Finder;

use crate::platform::PlatformDefinition;

/// Verdict for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No failure token present.
    Success,
    /// A failure token was found.
    Failure,
}

impl Classification {
    /// Whether this is [`Classification::Failure`].
    pub fn is_failure(self) -> bool {
        self == Classification::Failure
    }
}

/// Substring classifier over a fixed token list.
#[derive(Debug, Clone)]
pub struct Classifier {
    tokens: Vec<(String, Finder<'static>)>,
}

impl Classifier {
    /// Create a classifier from explicit tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(|token| {
                let token: String = token.into();
                let finder = Finder::new(token.as_bytes()).into_owned();
                (token, finder)
            })
            .collect();
        Self { tokens }
    }

    /// Create a classifier from a platform's failure patterns.
    pub fn for_platform(platform: &PlatformDefinition) -> Self {
        Self::new(platform.failed_when_contains.iter().cloned())
    }

    /// Return the first token found in `response`, if any.
    pub fn matched_token(&self, response: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(_, finder)| finder.find(response.as_bytes()).is_some())
            .map(|(token, _)| token.as_str())
    }

    /// Classify a whole response.
    pub fn classify(&self, response: &str) -> Classification {
        if self.matched_token(response).is_some() {
            Classification::Failure
        } else {
            Classification::Success
        }
    }

    /// Lines of `output` that classify as failures, trimmed.
    pub fn failing_lines<'a>(&'a self, output: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        output
            .lines()
            .filter(|line| self.classify(line).is_failure())
            .map(str::trim)
    }
}
