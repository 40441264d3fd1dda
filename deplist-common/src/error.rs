// deplist-common/src/error.rs
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DeplistError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("{package}: {message}")]
    Resolve { package: String, message: String },

    #[error("Ledger Error: {0}")]
    Ledger(String),

    #[error("Visitor panicked: {0}")]
    Panic(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl DeplistError {
    pub fn resolve(package: impl Into<String>, message: impl ToString) -> Self {
        DeplistError::Resolve {
            package: package.into(),
            message: message.to_string(),
        }
    }

    /// The package a resolution failure is attributed to, if any.
    pub fn package(&self) -> Option<&str> {
        match self {
            DeplistError::Resolve { package, .. } => Some(package),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DeplistError {
    fn from(err: std::io::Error) -> Self {
        DeplistError::Io(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, DeplistError>;
