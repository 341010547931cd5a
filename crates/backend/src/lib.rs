//! Client side of the Earth-observation service: prompt queries and remote
//! layer persistence.

pub mod client;
pub mod protocol;

pub use client::*;
pub use protocol::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Rejected locally; nothing was sent.
    EmptyPrompt,
    InvalidUrl(String),
    Transport(String),
    Status(u16),
    /// The service answered but reported failure.
    Rejected(String),
    /// Successful answer without imagery.
    MissingTileUrl,
    Decode(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::EmptyPrompt => write!(f, "Please enter a prompt"),
            BackendError::InvalidUrl(msg) => write!(f, "invalid backend url: {msg}"),
            BackendError::Transport(msg) => write!(f, "Failed to process the prompt: {msg}"),
            BackendError::Status(code) => write!(f, "backend returned HTTP {code}"),
            BackendError::Rejected(msg) => write!(f, "{msg}"),
            BackendError::MissingTileUrl => write!(f, "Error: No tile URL returned"),
            BackendError::Decode(msg) => write!(f, "unreadable backend response: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
