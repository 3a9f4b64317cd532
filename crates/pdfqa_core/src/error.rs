use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure category. Callers branch on this instead of parsing message text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or unsupported document. No index is built from it.
    Parse,
    /// A question was asked before any document was processed successfully.
    IndexUnavailable,
    /// The embedding or generation model (or its endpoint) failed.
    ModelInvocation,
    /// Caller-supplied input was rejected (e.g. an empty question).
    InvalidInput,
    /// Configuration could not be read or failed validation.
    Config,
}

/// Single structured error shape used across the pipeline and by the shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn parse(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, code, message)
    }

    pub fn model(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelInvocation, code, message)
    }

    pub fn invalid_input(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, code, message)
    }

    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, code, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Text suitable for showing next to the control that triggered the failure.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Parse => format!("Error processing PDF: {}", self.message),
            ErrorKind::IndexUnavailable => self.message.clone(),
            ErrorKind::ModelInvocation => {
                format!("Error processing your question: {}", self.message)
            }
            ErrorKind::InvalidInput => self.message.clone(),
            ErrorKind::Config => format!("Invalid configuration: {}", self.message),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
