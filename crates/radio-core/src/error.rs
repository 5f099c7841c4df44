use crate::models::SettingsError;

/// The request never produced a server response
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to start transport runtime: {0}")]
    Runtime(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server answered but reported an error condition
    #[error("Server error: {0}")]
    Application(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Session worker is no longer running")]
    WorkerUnavailable,
}

impl SessionError {
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Transport(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, SessionError::Application(_))
    }
}
