pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod models;
pub mod notify;
pub mod reconciler;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod tracing_setup;
pub mod transport;

pub use config::CoreConfig;
pub use error::{SessionError, TransportError};
pub use reconciler::ReconcileOutcome;
pub use runtime::{SessionHandle, SessionRuntime};
pub use session::{SendOutcome, SessionEvent};
