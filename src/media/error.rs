use std::fmt;
use thiserror::Error;

/// The stage-level failure categories a download can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Extraction,
    Config,
    Network,
    ResponseFormat,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Input => "InputError",
            ErrorKind::Extraction => "ExtractionError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Network => "NetworkError",
            ErrorKind::ResponseFormat => "ResponseFormatError",
            ErrorKind::Io => "IOError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MediaError {
    pub kind: ErrorKind,
    pub message: String,
}

impl MediaError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Extraction, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn response_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseFormat, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }
}
