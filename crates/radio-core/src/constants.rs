//! Application-wide constants
//!
//! Centralized location for endpoint paths, file names and setting
//! defaults shared across modules.

/// Default message server URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Recipient value that fans a message out to every user
pub const BROADCAST_RECIPIENT: &str = "all";

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

// Settings defaults
pub const DEFAULT_VOICE_RATE: u32 = 200;
pub const DEFAULT_AUTO_CHECK_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_HISTORY_FILE: &str = "message_history.txt";

/// Local-time format used for history entries (second precision)
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Server endpoints
pub mod endpoints {
    pub const CREATE_USER: &str = "/create_user";
    pub const SEND_MESSAGE: &str = "/send_message";
    pub const LATEST_MESSAGE: &str = "/latest_message";
    pub const USERS: &str = "/users";
}
