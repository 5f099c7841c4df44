use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_SERVER_URL, SETTINGS_FILE};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub server_url: String,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// Relative paths are taken relative to the data directory
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_server() {
        let config = CoreConfig::default();
        assert_eq!(config.server_url, "http://localhost:3000");
        assert_eq!(config.settings_path(), PathBuf::from("./settings.json"));
    }

    #[test]
    fn test_server_url_trailing_slash_is_dropped() {
        let config = CoreConfig::new("/tmp/radio").with_server_url("http://example.com:8080/");
        assert_eq!(config.server_url, "http://example.com:8080");
    }

    #[test]
    fn test_resolve_path() {
        let config = CoreConfig::new("/tmp/radio");
        assert_eq!(
            config.resolve_path("history.txt"),
            PathBuf::from("/tmp/radio/history.txt")
        );
        assert_eq!(
            config.resolve_path("/var/log/history.txt"),
            PathBuf::from("/var/log/history.txt")
        );
    }
}
