#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use radio_core::constants::endpoints;
use radio_core::notify::Notifier;
use radio_core::transport::{Transport, TransportResponse};
use radio_core::{CoreConfig, SessionRuntime, TransportError};
use tempfile::TempDir;

/// Scripted server state shared between a test and its fake transport
pub struct ServerState {
    pub latest: TransportResponse,
    pub send: TransportResponse,
    pub create: TransportResponse,
    pub users: TransportResponse,
    pub unreachable: bool,
    pub fetch_delay: Option<Duration>,
    pub fetches_started: usize,
    pub fetches_finished: usize,
    pub posts: Vec<(String, Vec<(String, String)>)>,
    pub gets: Vec<(String, Vec<(String, String)>)>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            latest: TransportResponse::ok("{}"),
            send: TransportResponse::ok("OK"),
            create: TransportResponse::ok("OK"),
            users: TransportResponse::ok(r#"{"users":[]}"#),
            unreachable: false,
            fetch_delay: None,
            fetches_started: 0,
            fetches_finished: 0,
            posts: Vec::new(),
            gets: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<ServerState>>,
}

impl FakeServer {
    pub fn transport(&self) -> Box<dyn Transport> {
        Box::new(FakeTransport {
            state: self.state.clone(),
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ServerState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_latest(&self, body: &str) {
        self.with(|s| s.latest = TransportResponse::ok(body));
    }

    pub fn fetches_started(&self) -> usize {
        self.with(|s| s.fetches_started)
    }

    pub fn fetches_finished(&self) -> usize {
        self.with(|s| s.fetches_finished)
    }

    pub fn last_post(&self) -> Option<(String, Vec<(String, String)>)> {
        self.with(|s| s.posts.last().cloned())
    }
}

struct FakeTransport {
    state: Arc<Mutex<ServerState>>,
}

fn owned(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Transport for FakeTransport {
    fn post(&self, path: &str, fields: &[(&str, &str)]) -> Result<TransportResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(TransportError::Request("connection refused".to_string()));
        }
        state.posts.push((path.to_string(), owned(fields)));
        Ok(match path {
            endpoints::CREATE_USER => state.create.clone(),
            endpoints::SEND_MESSAGE => state.send.clone(),
            _ => TransportResponse::new(404, "Not Found"),
        })
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<TransportResponse, TransportError> {
        let is_fetch = path == endpoints::LATEST_MESSAGE;
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.gets.push((path.to_string(), owned(query)));
            if is_fetch {
                state.fetches_started += 1;
            }
            if state.unreachable {
                return Err(TransportError::Request("connection refused".to_string()));
            }
            if is_fetch { state.fetch_delay } else { None }
        };

        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let mut state = self.state.lock().unwrap();
        Ok(match path {
            endpoints::LATEST_MESSAGE => {
                state.fetches_finished += 1;
                state.latest.clone()
            }
            endpoints::USERS => state.users.clone(),
            _ => TransportResponse::new(404, "Not Found"),
        })
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub spoken: Arc<Mutex<Vec<(String, u32)>>>,
}

impl Notifier for RecordingNotifier {
    fn announce(&self, text: &str, rate: u32) {
        self.spoken.lock().unwrap().push((text.to_string(), rate));
    }
}

pub struct Harness {
    // Declared first so the session shuts down before the temp dir goes away
    pub runtime: SessionRuntime,
    pub server: FakeServer,
    pub spoken: Arc<Mutex<Vec<(String, u32)>>>,
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::in_dir(dir)
    }

    pub fn in_dir(dir: TempDir) -> Self {
        let server = FakeServer::default();
        let notifier = RecordingNotifier::default();
        let spoken = notifier.spoken.clone();
        let runtime = SessionRuntime::new(
            CoreConfig::new(dir.path()),
            server.transport(),
            Box::new(notifier),
        );
        Self {
            runtime,
            server,
            spoken,
            dir,
        }
    }

    pub fn history_lines(&self) -> Vec<String> {
        read_lines(&self.dir.path().join("message_history.txt"))
    }

    pub fn spoken(&self) -> Vec<(String, u32)> {
        self.spoken.lock().unwrap().clone()
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|contents| contents.lines().map(String::from).collect())
        .unwrap_or_default()
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
