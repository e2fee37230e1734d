use crate::core_tls::TlsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Concurrent control connections accepted before new ones are refused.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_pasv_port_start")]
    pub pasv_port_start: u16,
    #[serde(default = "default_pasv_port_end")]
    pub pasv_port_end: u16,
    /// Externally advertised IP for PASV replies, when the server sits behind
    /// NAT. Falls back to the listen address or the control socket address.
    #[serde(default)]
    pub pasv_address: Option<String>,
    /// Seconds a session may sit idle between commands; 0 disables the bound.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_data_open_timeout")]
    pub data_open_timeout_secs: u64,
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,
    /// Data-connection ceiling in bytes per second; 0 disables throttling.
    #[serde(default)]
    pub transfer_rate_limit: u64,
    #[serde(default = "default_storage_backend")]
    pub storage_backend: String,
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
    #[serde(default = "default_auth_backend")]
    pub auth_backend: String,
    #[serde(default)]
    pub passwd_file: Option<String>,
    /// Optional banner shown as 220- continuation lines before the greeting.
    #[serde(default)]
    pub banner_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tls: TlsConfig,
}

fn default_listen_address() -> String {
    String::from("0.0.0.0")
}
fn default_listen_port() -> u16 {
    2121
}
fn default_max_sessions() -> usize {
    100
}
fn default_pasv_port_start() -> u16 {
    50000
}
fn default_pasv_port_end() -> u16 {
    50100
}
fn default_idle_timeout() -> u64 {
    300
}
fn default_data_open_timeout() -> u64 {
    30
}
fn default_transfer_timeout() -> u64 {
    600
}
fn default_storage_backend() -> String {
    String::from("filesystem")
}
fn default_storage_root() -> String {
    String::from("/var/ftp")
}
fn default_auth_backend() -> String {
    String::from("passwd")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            max_sessions: default_max_sessions(),
            pasv_port_start: default_pasv_port_start(),
            pasv_port_end: default_pasv_port_end(),
            pasv_address: None,
            idle_timeout_secs: default_idle_timeout(),
            data_open_timeout_secs: default_data_open_timeout(),
            transfer_timeout_secs: default_transfer_timeout(),
            transfer_rate_limit: 0,
            storage_backend: default_storage_backend(),
            storage_root: default_storage_root(),
            auth_backend: default_auth_backend(),
            passwd_file: None,
            banner_file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen_port = 2100
            pasv_port_start = 40000
            pasv_port_end = 40050
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen_port, 2100);
        assert_eq!(config.server.pasv_port_start, 40000);
        assert_eq!(config.server.max_sessions, 100);
        assert!(!config.tls.enabled);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.listen_address, "0.0.0.0");
        assert_eq!(config.server.storage_backend, "filesystem");
        assert_eq!(config.server.transfer_rate_limit, 0);
    }
}
