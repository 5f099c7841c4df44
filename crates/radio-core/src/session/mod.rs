pub mod recipient;
pub(crate) mod worker;

pub use recipient::Recipient;
pub(crate) use worker::{SessionCommand, SessionWorker};

/// Which kind of send succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Direct,
    Broadcast,
}

/// Notifications emitted by the session worker, whichever path triggered them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MessageReceived { username: String, text: String },
}
