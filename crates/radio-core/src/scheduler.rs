//! Background auto-check loop
//!
//! At most one loop runs per scheduler. The loop reaches the session only
//! through a [`SessionHandle`], so it never touches session state directly.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::models::SharedSettings;
use crate::reconciler::ReconcileOutcome;
use crate::runtime::SessionHandle;

struct RunningLoop {
    username: String,
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    thread: JoinHandle<()>,
}

pub struct PollScheduler {
    handle: SessionHandle,
    settings: SharedSettings,
    running: Option<RunningLoop>,
}

impl PollScheduler {
    pub fn new(handle: SessionHandle, settings: SharedSettings) -> Self {
        Self {
            handle,
            settings,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Launch the loop. Returns false (and does nothing) if already running.
    pub fn start(&mut self, username: &str) -> bool {
        if self.running.is_some() {
            tracing::debug!("Auto-check already running");
            return false;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let handle = self.handle.clone();
        let settings = self.settings.clone();
        let user = username.to_string();

        let thread = thread::spawn(move || {
            poll_loop(&handle, &settings, &user, &stop_rx);
            let _ = done_tx.send(());
        });

        self.running = Some(RunningLoop {
            username: username.to_string(),
            stop_tx,
            done_rx,
            thread,
        });
        tracing::info!("Auto-check enabled for {}", username);
        true
    }

    /// Signal the loop and block until it has exited. Returns false if it
    /// was not running.
    pub fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };

        let _ = running.stop_tx.send(());
        // Err means the loop dropped its sender, which also means it is gone
        let _ = running.done_rx.recv();
        if running.thread.join().is_err() {
            tracing::error!("Auto-check loop panicked");
        }
        tracing::info!("Auto-check disabled for {}", running.username);
        true
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fetch, then wait one interval; stop is checked at both boundaries.
/// No single iteration's failure ends the loop.
fn poll_loop(handle: &SessionHandle, settings: &SharedSettings, username: &str, stop_rx: &Receiver<()>) {
    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match handle.fetch_once(username, false) {
            Ok(ReconcileOutcome::New(_)) => tracing::debug!("Auto-check found a new message"),
            Ok(_) => {}
            Err(e) => tracing::warn!("Error in auto-check: {}", e),
        }

        match stop_rx.recv_timeout(settings.poll_interval()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}
