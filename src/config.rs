use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;
use crate::receiver::DEFAULT_READ_BUFFER;
use crate::session::DEFAULT_MAX_COMMAND_LEN;

pub const DEFAULT_CONFIG_PATH: &str = "chatclient.json";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:55555";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_address: String,
    pub read_buffer_size: usize,
    pub max_command_len: usize,
    /// Unset means `ls` waits for a reply indefinitely.
    pub list_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            read_buffer_size: DEFAULT_READ_BUFFER,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
            list_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn parse(content: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn list_timeout(&self) -> Option<Duration> {
        self.list_timeout_secs.map(Duration::from_secs)
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match AppConfig::parse(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}
