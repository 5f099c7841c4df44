pub mod history;
pub mod settings;

pub use history::{Direction, HistoryEntry, HistoryLog};
pub use settings::{SettingKey, Settings, SettingsError, SettingsStore, SharedSettings};
