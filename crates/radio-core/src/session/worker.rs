use std::sync::mpsc::{Receiver, Sender};

use super::{Recipient, SendOutcome, SessionEvent};
use crate::config::CoreConfig;
use crate::constants::endpoints;
use crate::envelope;
use crate::error::SessionError;
use crate::models::{HistoryEntry, HistoryLog, SharedSettings};
use crate::notify::Notifier;
use crate::reconciler::{self, ReconcileOutcome};
use crate::transport::{Transport, TransportResponse};

/// Requests processed one at a time by the session worker
pub enum SessionCommand {
    CreateUser {
        username: String,
        response_tx: Sender<Result<(), SessionError>>,
    },
    SendMessage {
        recipient: String,
        text: String,
        response_tx: Sender<Result<SendOutcome, SessionError>>,
    },
    /// Fetch the latest message for `username` and reconcile it
    FetchLatest {
        username: String,
        notify_if_unchanged: bool,
        response_tx: Sender<Result<ReconcileOutcome, SessionError>>,
    },
    ListUsers {
        response_tx: Sender<Vec<String>>,
    },
    LastSeenMessage {
        response_tx: Sender<String>,
    },
    Shutdown,
}

/// Sole owner of the mutable session state.
///
/// Foreground and background callers both reach it through the command
/// channel, so the last-seen comparison and every transport call are
/// serialized here.
pub struct SessionWorker {
    config: CoreConfig,
    settings: SharedSettings,
    transport: Box<dyn Transport>,
    notifier: Box<dyn Notifier>,
    last_seen_message: String,
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
}

impl SessionWorker {
    pub fn new(
        config: CoreConfig,
        settings: SharedSettings,
        transport: Box<dyn Transport>,
        notifier: Box<dyn Notifier>,
        command_rx: Receiver<SessionCommand>,
        event_tx: Sender<SessionEvent>,
    ) -> Self {
        Self {
            config,
            settings,
            transport,
            notifier,
            last_seen_message: String::new(),
            command_rx,
            event_tx,
        }
    }

    pub fn run(mut self) {
        tracing::debug!("Session worker started");

        // Exits on Shutdown or once every handle has been dropped
        while let Ok(cmd) = self.command_rx.recv() {
            match cmd {
                SessionCommand::CreateUser {
                    username,
                    response_tx,
                } => {
                    let _ = response_tx.send(self.create_user(&username));
                }
                SessionCommand::SendMessage {
                    recipient,
                    text,
                    response_tx,
                } => {
                    let _ = response_tx.send(self.send_message(&recipient, &text));
                }
                SessionCommand::FetchLatest {
                    username,
                    notify_if_unchanged,
                    response_tx,
                } => {
                    let _ = response_tx.send(self.fetch_latest(&username, notify_if_unchanged));
                }
                SessionCommand::ListUsers { response_tx } => {
                    let _ = response_tx.send(self.list_users());
                }
                SessionCommand::LastSeenMessage { response_tx } => {
                    let _ = response_tx.send(self.last_seen_message.clone());
                }
                SessionCommand::Shutdown => break,
            }
        }

        tracing::debug!("Session worker stopped");
    }

    fn create_user(&self, username: &str) -> Result<(), SessionError> {
        let response = self
            .transport
            .post(endpoints::CREATE_USER, &[("username", username)])?;
        check_response(&response)?;
        tracing::info!("Registered user {}", username);
        Ok(())
    }

    fn send_message(&self, recipient: &str, text: &str) -> Result<SendOutcome, SessionError> {
        let recipient = Recipient::parse(recipient)
            .ok_or_else(|| SessionError::Application("Recipient is required".to_string()))?;

        let response = self.transport.post(
            endpoints::SEND_MESSAGE,
            &[("sendto", recipient.as_wire()), ("message", text)],
        )?;
        check_response(&response)?;

        self.record_history(&HistoryEntry::sent(recipient.as_wire(), text));

        Ok(if recipient.is_broadcast() {
            SendOutcome::Broadcast
        } else {
            SendOutcome::Direct
        })
    }

    fn fetch_latest(
        &mut self,
        username: &str,
        notify_if_unchanged: bool,
    ) -> Result<ReconcileOutcome, SessionError> {
        let response = self
            .transport
            .get(endpoints::LATEST_MESSAGE, &[("username", username)])?;
        check_response(&response)?;

        let outcome =
            reconciler::reconcile(&response.body, &self.last_seen_message, notify_if_unchanged);

        if let ReconcileOutcome::New(text) = &outcome {
            tracing::info!("New message for {}", username);
            let settings = self.settings.snapshot();
            self.record_history(&HistoryEntry::received(username, text));
            self.notifier.announce(text, settings.voice_rate);
            self.last_seen_message = text.clone();
            let _ = self.event_tx.send(SessionEvent::MessageReceived {
                username: username.to_string(),
                text: text.clone(),
            });
        }

        Ok(outcome)
    }

    fn list_users(&self) -> Vec<String> {
        let response = match self.transport.get(endpoints::USERS, &[]) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error getting users: {}", e);
                return Vec::new();
            }
        };
        if let Err(e) = check_response(&response) {
            tracing::warn!("Failed to get users: {}", e);
            return Vec::new();
        }
        envelope::user_list(&response.body).unwrap_or_default()
    }

    /// History failures are logged and never fail the operation
    fn record_history(&self, entry: &HistoryEntry) {
        let settings = self.settings.snapshot();
        if !settings.save_messages {
            return;
        }
        let log = HistoryLog::new(self.config.resolve_path(&settings.message_history_file));
        if let Err(e) = log.append(entry) {
            tracing::warn!(
                "Error saving message history to {}: {}",
                log.path().display(),
                e
            );
        }
    }
}

/// Map a server reply to an application failure when it reports one
fn check_response(response: &TransportResponse) -> Result<(), SessionError> {
    if let Some(error) = envelope::server_error(&response.body) {
        return Err(SessionError::Application(error));
    }
    if !response.is_success() {
        return Err(SessionError::Application(format!(
            "{} (HTTP {})",
            envelope::UNKNOWN_ERROR,
            response.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_fails_even_on_success_status() {
        let response = TransportResponse::ok(r#"{"error":"Recipient not found"}"#);
        match check_response(&response) {
            Err(SessionError::Application(msg)) => assert_eq!(msg, "Recipient not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_error_status_without_body() {
        let response = TransportResponse::new(500, "Internal Server Error");
        match check_response(&response) {
            Err(SessionError::Application(msg)) => assert_eq!(msg, "Unknown error (HTTP 500)"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_error_field_without_text_still_fails() {
        for body in [r#"{"error":""}"#, r#"{"error":{"msg":"x"}}"#] {
            match check_response(&TransportResponse::ok(body)) {
                Err(SessionError::Application(msg)) => assert_eq!(msg, "Unknown error"),
                other => panic!("unexpected for {}: {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_plain_ok_passes() {
        assert!(check_response(&TransportResponse::ok("OK")).is_ok());
        assert!(check_response(&TransportResponse::ok(r#"{"message":"hi"}"#)).is_ok());
    }
}
