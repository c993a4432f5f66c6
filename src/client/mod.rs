//! Client side of the admin tool: fetches whole collections over HTTP, keeps them in
//! memory and derives filtered, sorted and paginated views from them.

pub mod controller;
pub mod records;
pub mod transport;
pub mod view;

pub use controller::*;
pub use records::*;
pub use transport::*;
pub use view::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
