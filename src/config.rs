use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid denylist pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("{field} = {value} is out of range (max {max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

/// Terminal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Prompt, history and banner settings
    #[serde(default)]
    pub terminal: TerminalConfig,

    /// Rate limiting and content validation
    #[serde(default)]
    pub guard: GuardConfig,

    /// Backend API for session telemetry and contact requests
    #[serde(default)]
    pub api: ApiConfig,

    /// Public IP lookup services used by `myip`
    #[serde(default)]
    pub ip_lookup: IpLookupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Entries kept for recall; 0 behaves as 1
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_true")]
    pub show_welcome: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_max_commands")]
    pub max_commands_per_window: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_block_secs")]
    pub block_secs: u64,
    #[serde(default = "default_max_input_len")]
    pub max_input_len: usize,
    /// Appended to the built-in denylist
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_session_path")]
    pub session_path: String,
    #[serde(default = "default_log_path")]
    pub log_path: String,
    #[serde(default = "default_contact_path")]
    pub contact_path: String,
    /// Disables session start and command logging entirely
    #[serde(default = "default_true")]
    pub telemetry: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLookupConfig {
    #[serde(default = "default_ip_endpoints")]
    pub endpoints: Vec<String>,
}

fn default_prompt() -> String {
    "guest@trusik:~$ ".to_string()
}

fn default_max_history() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_max_commands() -> u32 {
    30
}

fn default_window_secs() -> u64 {
    60
}

fn default_block_secs() -> u64 {
    30
}

fn default_max_input_len() -> usize {
    200
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_session_path() -> String {
    "/session/start".to_string()
}

fn default_log_path() -> String {
    "/log".to_string()
}

fn default_contact_path() -> String {
    "/contact".to_string()
}

fn default_ip_endpoints() -> Vec<String> {
    vec![
        "https://api.ipify.org?format=json".to_string(),
        "https://ipapi.co/json/".to_string(),
    ]
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            max_history: default_max_history(),
            show_welcome: true,
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_commands_per_window: default_max_commands(),
            window_secs: default_window_secs(),
            block_secs: default_block_secs(),
            max_input_len: default_max_input_len(),
            extra_patterns: Vec::new(),
        }
    }
}

impl GuardConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn block(&self) -> Duration {
        Duration::from_secs(self.block_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_path: default_session_path(),
            log_path: default_log_path(),
            contact_path: default_contact_path(),
            telemetry: true,
        }
    }
}

impl ApiConfig {
    /// Join the base URL with an endpoint path, tolerating stray slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for IpLookupConfig {
    fn default() -> Self {
        Self {
            endpoints: default_ip_endpoints(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(
            api = %config.api.base_url,
            max_history = config.terminal.max_history,
            "configuration loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.terminal.max_history, 50);
        assert_eq!(cfg.guard.max_commands_per_window, 30);
        assert_eq!(cfg.guard.window(), Duration::from_secs(60));
        assert_eq!(cfg.guard.block(), Duration::from_secs(30));
        assert_eq!(cfg.guard.max_input_len, 200);
        assert!(cfg.api.telemetry);
        assert_eq!(cfg.ip_lookup.endpoints.len(), 2);
    }

    #[test]
    fn test_from_file_partial() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"
[terminal]
prompt = "visitor$ "

[guard]
max_commands_per_window = 5
extra_patterns = ["(?i)drop\\s+table"]

[api]
base_url = "https://example.test/api/"
"#
        )
        .unwrap();

        let cfg = Config::from_file(tmp.path()).unwrap();
        assert_eq!(cfg.terminal.prompt, "visitor$ ");
        assert_eq!(cfg.terminal.max_history, 50);
        assert_eq!(cfg.guard.max_commands_per_window, 5);
        assert_eq!(cfg.guard.block_secs, 30);
        assert_eq!(cfg.guard.extra_patterns.len(), 1);
        assert_eq!(cfg.api.log_path, "/log");
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/webterm.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_from_file_malformed() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "[guard]\nwindow_secs = \"soon\"").unwrap();
        let err = Config::from_file(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_endpoint_join() {
        let api = ApiConfig {
            base_url: "https://example.test/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(api.endpoint("/session/start"), "https://example.test/api/session/start");
        assert_eq!(api.endpoint("log"), "https://example.test/api/log");
    }
}
