// src/config.rs
//! Client configuration stored as JSON under the user's config directory

use crate::error::{GpsError, Result};
use crate::gps::gpsd::{DEFAULT_HOST, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub verbose: bool,
    pub refresh_ms: u64, // terminal redraw check interval
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            verbose: false,
            refresh_ms: 250,
        }
    }
}

impl ClientConfig {
    /// Load configuration, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| GpsError::Other(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| GpsError::Other(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GpsError::Other(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(config_path, contents)
            .map_err(|e| GpsError::Other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| GpsError::Other("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("gpsd-client").join("config.json"))
    }

    /// Point the client at a different daemon
    pub fn update_server(&mut self, host: String, port: u16) {
        self.host = host;
        self.port = port;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gpsd-client-test-{}-{}", std::process::id(), name))
            .join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 2947);
        assert!(!config.verbose);
    }

    #[test]
    fn test_update_server() {
        let mut config = ClientConfig::default();
        config.update_server("gps.local".to_string(), 3000);
        assert_eq!(config.host, "gps.local");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ClientConfig::load_from(&scratch_path("missing")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = scratch_path("save");
        let mut config = ClientConfig::default();
        config.update_server("10.0.0.5".to_string(), 2948);
        config.verbose = true;

        config.save_to(&path).unwrap();
        let loaded = ClientConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"host":"gps.local"}"#).unwrap();
        assert_eq!(config.host, "gps.local");
        assert_eq!(config.port, 2947);
        assert_eq!(config.refresh_ms, 250);
    }
}
