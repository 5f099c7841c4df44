//! Decides whether a fetched message is new relative to the last one seen.
//!
//! Pure: the caller owns notification, history and the last-seen update.

use crate::envelope::Envelope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No usable payload (absent, empty or undecodable)
    NoMessage,
    /// Same text as last time. `report` echoes the caller's request to be told.
    Unchanged { report: bool },
    New(String),
}

impl ReconcileOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, ReconcileOutcome::New(_))
    }

    /// Whether the caller asked to hear about this outcome
    pub fn should_report(&self) -> bool {
        match self {
            ReconcileOutcome::New(_) => true,
            ReconcileOutcome::Unchanged { report } => *report,
            ReconcileOutcome::NoMessage => false,
        }
    }
}

/// Message text carried by a "latest message" body, if any
pub fn extract_message(raw: &str) -> Option<String> {
    Envelope::decode(raw)?.message_text().map(String::from)
}

pub fn reconcile(raw: &str, previous: &str, notify_if_unchanged: bool) -> ReconcileOutcome {
    match extract_message(raw) {
        None => ReconcileOutcome::NoMessage,
        Some(text) if text == previous => ReconcileOutcome::Unchanged {
            report: notify_if_unchanged,
        },
        Some(text) => ReconcileOutcome::New(text),
    }
}
