use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use anyhow::{Context, Result};

use crate::config::CoreConfig;
use crate::error::SessionError;
use crate::models::{SettingKey, Settings, SettingsStore, SharedSettings};
use crate::notify::Notifier;
use crate::reconciler::ReconcileOutcome;
use crate::scheduler::PollScheduler;
use crate::session::{SendOutcome, SessionCommand, SessionEvent, SessionWorker};
use crate::transport::{HttpTransport, Transport};

/// Cloneable entry point to the session worker
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: Sender<SessionCommand>) -> Self {
        Self { command_tx }
    }

    pub(crate) fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.command_tx
            .send(command)
            .map_err(|_| SessionError::WorkerUnavailable)
    }

    fn request<T>(&self, build: impl FnOnce(Sender<T>) -> SessionCommand) -> Result<T, SessionError> {
        let (response_tx, response_rx) = mpsc::channel();
        self.send(build(response_tx))?;
        response_rx
            .recv()
            .map_err(|_| SessionError::WorkerUnavailable)
    }

    pub fn create_user(&self, username: &str) -> Result<(), SessionError> {
        self.request(|response_tx| SessionCommand::CreateUser {
            username: username.to_string(),
            response_tx,
        })?
    }

    pub fn send_message(&self, recipient: &str, text: &str) -> Result<SendOutcome, SessionError> {
        self.request(|response_tx| SessionCommand::SendMessage {
            recipient: recipient.to_string(),
            text: text.to_string(),
            response_tx,
        })?
    }

    pub fn fetch_once(
        &self,
        username: &str,
        notify_if_unchanged: bool,
    ) -> Result<ReconcileOutcome, SessionError> {
        self.request(|response_tx| SessionCommand::FetchLatest {
            username: username.to_string(),
            notify_if_unchanged,
            response_tx,
        })?
    }

    /// Known usernames; empty on any failure
    pub fn list_users(&self) -> Vec<String> {
        self.request(|response_tx| SessionCommand::ListUsers { response_tx })
            .unwrap_or_default()
    }

    pub fn last_seen_message(&self) -> Result<String, SessionError> {
        self.request(|response_tx| SessionCommand::LastSeenMessage { response_tx })
    }
}

/// One client session: the worker thread, its settings and the auto-check loop
pub struct SessionRuntime {
    config: CoreConfig,
    settings: SharedSettings,
    handle: SessionHandle,
    event_rx: Option<Receiver<SessionEvent>>,
    worker_handle: Option<JoinHandle<()>>,
    scheduler: PollScheduler,
}

impl SessionRuntime {
    pub fn new(config: CoreConfig, transport: Box<dyn Transport>, notifier: Box<dyn Notifier>) -> Self {
        let settings = SharedSettings::new(SettingsStore::load(config.settings_path()));

        let (command_tx, command_rx) = mpsc::channel::<SessionCommand>();
        let (event_tx, event_rx) = mpsc::channel::<SessionEvent>();

        let worker = SessionWorker::new(
            config.clone(),
            settings.clone(),
            transport,
            notifier,
            command_rx,
            event_tx,
        );
        let worker_handle = std::thread::spawn(move || {
            worker.run();
        });

        let handle = SessionHandle::new(command_tx);
        let scheduler = PollScheduler::new(handle.clone(), settings.clone());

        Self {
            config,
            settings,
            handle,
            event_rx: Some(event_rx),
            worker_handle: Some(worker_handle),
            scheduler,
        }
    }

    /// Session talking HTTP to `config.server_url`
    pub fn connect(config: CoreConfig, notifier: Box<dyn Notifier>) -> Result<Self> {
        let transport = HttpTransport::new(config.server_url.clone())
            .with_context(|| format!("Failed to create transport for {}", config.server_url))?;
        Ok(Self::new(config, Box::new(transport), notifier))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn take_event_rx(&mut self) -> Option<Receiver<SessionEvent>> {
        self.event_rx.take()
    }

    pub fn settings(&self) -> Settings {
        self.settings.snapshot()
    }

    pub fn update_setting(&self, key: SettingKey, raw_value: &str) -> Result<(), SessionError> {
        self.settings.update(key, raw_value)?;
        Ok(())
    }

    pub fn create_user(&self, username: &str) -> Result<(), SessionError> {
        self.handle.create_user(username)
    }

    pub fn send_message(&self, recipient: &str, text: &str) -> Result<SendOutcome, SessionError> {
        self.handle.send_message(recipient, text)
    }

    pub fn fetch_once(
        &self,
        username: &str,
        notify_if_unchanged: bool,
    ) -> Result<ReconcileOutcome, SessionError> {
        self.handle.fetch_once(username, notify_if_unchanged)
    }

    pub fn list_users(&self) -> Vec<String> {
        self.handle.list_users()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn start_polling(&mut self, username: &str) -> bool {
        self.scheduler.start(username)
    }

    pub fn stop_polling(&mut self) -> bool {
        self.scheduler.stop()
    }

    /// Start auto-check if stopped, stop it if running. Returns the new state.
    pub fn toggle_polling(&mut self, username: &str) -> bool {
        if self.scheduler.is_running() {
            self.scheduler.stop();
            false
        } else {
            self.scheduler.start(username);
            true
        }
    }

    /// Stop the auto-check loop, then the worker. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        if let Some(worker_handle) = self.worker_handle.take() {
            let _ = self.handle.send(SessionCommand::Shutdown);
            let _ = worker_handle.join();
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_reports_stopped_worker() {
        let (command_tx, command_rx) = mpsc::channel();
        let handle = SessionHandle::new(command_tx);
        drop(command_rx);

        assert!(matches!(
            handle.send(SessionCommand::Shutdown),
            Err(SessionError::WorkerUnavailable)
        ));
        assert!(matches!(
            handle.create_user("alice"),
            Err(SessionError::WorkerUnavailable)
        ));
        assert!(handle.list_users().is_empty());
        assert!(handle.last_seen_message().is_err());
    }
}
