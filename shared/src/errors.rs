//! Shared error types for the self-start launcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Server returned 500 Internal Server Error, something went wrong: {body}")]
    ServerFault { body: String },

    #[error("Failed to read JSON '{body}' with message: {message}")]
    DecodeError { body: String, message: String },

    #[error("HTTP request failed: {message}")]
    HttpError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

impl From<reqwest::Error> for SharedError {
    fn from(err: reqwest::Error) -> Self {
        SharedError::HttpError {
            message: err.to_string(),
        }
    }
}
