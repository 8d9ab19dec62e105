// src/client/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// サーバーが 2xx 以外を返した
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to {action}: {source}")]
    Transport {
        action: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Token store error: {0}")]
    Storage(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
