use std::io;
use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// Bad input: configuration, address files, command line values.
    #[error("{0}")]
    Invalid(String),
    /// Anything that went wrong while talking to the outside world.
    #[error("{0}")]
    Error(String),
}

impl From<io::Error> for ValidationError {
    fn from(error: io::Error) -> Self {
        ValidationError::Error(format!("IO error occurred: {}", error))
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(error: serde_json::Error) -> Self {
        ValidationError::Error(format!("JSON error occurred: {}", error))
    }
}

impl From<reqwest::Error> for ValidationError {
    fn from(error: reqwest::Error) -> Self {
        ValidationError::Error(format!("Communication error occurred: {}", error))
    }
}

impl From<hex::FromHexError> for ValidationError {
    fn from(error: hex::FromHexError) -> Self {
        ValidationError::Invalid(format!("Hex Parse Error: {}", error))
    }
}

impl From<ParseIntError> for ValidationError {
    fn from(error: ParseIntError) -> Self {
        ValidationError::Error(format!("Could not parse hex: {}", error))
    }
}

impl From<&str> for ValidationError {
    fn from(error: &str) -> Self {
        ValidationError::Error(error.to_string())
    }
}

impl From<String> for ValidationError {
    fn from(error: String) -> Self {
        ValidationError::Error(error)
    }
}
