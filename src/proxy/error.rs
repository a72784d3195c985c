use std::error::Error as _;

use thiserror::Error;

/// Failures of a single proxied request before the response head is sent
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream URL: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    /// Error text including every underlying cause, e.g.
    /// `error sending request for url (...): ... Connection refused`
    pub fn message(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            // reqwest repeats the inner message in its own Display
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }
}
