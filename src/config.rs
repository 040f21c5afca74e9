use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Poll interval used when `interval` is unset or zero.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Environment variable overriding `ctfd.api_key`.
pub const ENV_CTFD_API_KEY: &str = "CTFD_API_KEY";
/// Environment variable overriding `ntfy.access_token`.
pub const ENV_NTFY_ACCESS_TOKEN: &str = "NTFY_ACCESS_TOKEN";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub debug: bool,
    /// Team or member name to watch on the scoreboard.
    #[serde(default)]
    pub user: String,
    /// Polling interval in seconds.
    #[serde(default)]
    pub interval: u64,
    pub ctfd: CtfdConfig,
    pub ntfy: NtfyConfig,
}

/// CTFd API endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtfdConfig {
    /// Base URL including the API prefix, e.g. `https://ctf.example.com/api/v1`.
    #[serde(default)]
    pub api_base: String,
    /// Access token, `ctfd_` followed by 64 hex characters.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// ntfy server and topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NtfyConfig {
    #[serde(default)]
    pub api_base: String,
    /// Optional bearer token. Older configs spell the key `acess_token`.
    #[serde(default, alias = "acess_token")]
    pub access_token: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl AppConfig {
    /// Load, apply environment overrides, and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Secrets may come from the environment (or a `.env` file) instead of the config.
    /// Blank values leave the file's setting in place.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(key) = lookup(ENV_CTFD_API_KEY) {
            self.ctfd.api_key = key;
        }
        if let Some(token) = lookup(ENV_NTFY_ACCESS_TOKEN) {
            self.ntfy.access_token = token;
        }
    }

    /// Check required settings and fill in defaults. An empty `ntfy.api_base`
    /// is allowed; the client then publishes to ntfy.sh.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.ctfd.api_base.trim().is_empty() {
            return Err(invalid("ctfd api_base URL cannot be empty"));
        }
        if self.ctfd.api_key.is_empty() {
            return Err(invalid("ctfd api_key cannot be empty"));
        }
        if !is_valid_api_key(&self.ctfd.api_key) {
            return Err(invalid(
                "ctfd api_key must be in the format ctfd_<64 hex characters>",
            ));
        }
        if self.ntfy.topic.trim().is_empty() {
            return Err(invalid("ntfy topic cannot be empty"));
        }
        if self.user.is_empty() {
            return Err(invalid("user cannot be empty"));
        }
        if self.interval == 0 {
            self.interval = DEFAULT_INTERVAL_SECS;
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

fn is_valid_api_key(key: &str) -> bool {
    match key.strip_prefix("ctfd_") {
        Some(hex) => hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn valid_key() -> String {
        format!("ctfd_{}", "ab12".repeat(16))
    }

    fn sample(api_key: &str, interval: Option<u64>) -> String {
        let interval = interval
            .map(|i| format!("interval = {i}\n"))
            .unwrap_or_default();
        format!(
            r#"
user = "alice"
{interval}
[ctfd]
api_base = "https://ctf.example.com/api/v1"
api_key = "{api_key}"

[ntfy]
api_base = "https://ntfy.sh"
acess_token = "tk_legacy"
topic = "ctf"
"#
        )
    }

    fn parsed(contents: &str) -> AppConfig {
        AppConfig::parse(contents).unwrap()
    }

    #[test]
    fn valid_config_defaults_interval() {
        let mut cfg = parsed(&sample(&valid_key(), None));
        cfg.validate().unwrap();
        assert_eq!(cfg.interval, DEFAULT_INTERVAL_SECS);
        assert_eq!(cfg.user, "alice");
        assert!(!cfg.debug);
        assert!(!cfg.ctfd.insecure_skip_verify);
    }

    #[test]
    fn explicit_interval_kept() {
        let mut cfg = parsed(&sample(&valid_key(), Some(60)));
        cfg.validate().unwrap();
        assert_eq!(cfg.interval, 60);
    }

    #[test]
    fn legacy_token_key_accepted() {
        let cfg = parsed(&sample(&valid_key(), None));
        assert_eq!(cfg.ntfy.access_token, "tk_legacy");
    }

    #[test]
    fn rejects_malformed_api_key() {
        let bad_hex = format!("ctfd_{}", "zz".repeat(32));
        for key in ["", "ctfd_short", "token_0000", bad_hex.as_str()] {
            let mut cfg = parsed(&sample(key, None));
            assert!(
                matches!(cfg.validate(), Err(ConfigError::Invalid(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_user() {
        let mut cfg = parsed(&sample(&valid_key(), None));
        cfg.user.clear();
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid config: user cannot be empty");
    }

    #[test]
    fn rejects_empty_topic() {
        let mut cfg = parsed(&sample(&valid_key(), None));
        cfg.ntfy.topic = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_ctfd_base() {
        let mut cfg = parsed(&sample(&valid_key(), None));
        cfg.ctfd.api_base.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_ntfy_base_is_allowed() {
        let mut cfg = parsed(&sample(&valid_key(), None));
        cfg.ntfy.api_base.clear();
        cfg.validate().unwrap();
        assert!(cfg.ntfy.api_base.is_empty());
    }

    // ── overrides ──────────────────────────────────────────────────

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn env_overrides_replace_secrets() {
        let mut cfg = parsed(&sample("", None));
        cfg.apply_overrides(env(&[
            (ENV_CTFD_API_KEY, &format!("  {}\n", valid_key())),
            (ENV_NTFY_ACCESS_TOKEN, "tk_env"),
        ]));
        assert_eq!(cfg.ctfd.api_key, valid_key());
        assert_eq!(cfg.ntfy.access_token, "tk_env");
        cfg.validate().unwrap();
    }

    #[test]
    fn blank_env_keeps_file_values() {
        let mut cfg = parsed(&sample(&valid_key(), None));
        cfg.apply_overrides(env(&[(ENV_CTFD_API_KEY, "   "), (ENV_NTFY_ACCESS_TOKEN, "")]));
        assert_eq!(cfg.ctfd.api_key, valid_key());
        assert_eq!(cfg.ntfy.access_token, "tk_legacy");

        cfg.apply_overrides(env(&[]));
        assert_eq!(cfg.ctfd.api_key, valid_key());
        assert_eq!(cfg.ntfy.access_token, "tk_legacy");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_garbage_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is = = not toml").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
