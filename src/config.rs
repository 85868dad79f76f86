use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::remote::Transport;

pub const SUPPORTED_LOCALES: &[&str] = &["ru", "en"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Proxy,
    Credential,
}

impl TransportKind {
    pub fn toggled(self) -> Self {
        match self {
            TransportKind::Proxy => TransportKind::Credential,
            TransportKind::Credential => TransportKind::Proxy,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_transport")]
    pub transport: TransportKind,
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_card_count")]
    pub card_count: usize,
    #[serde(default = "default_flip_settle_ms")]
    pub flip_settle_ms: u64,
    #[serde(default = "default_nav_settle_ms")]
    pub nav_settle_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_transport() -> TransportKind {
    TransportKind::Proxy
}
fn default_proxy_url() -> String {
    "http://localhost:3000/api/chat".to_string()
}
fn default_api_base() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_api_version() -> String {
    "2023-06-01".to_string()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_card_count() -> usize {
    15
}
fn default_flip_settle_ms() -> u64 {
    600
}
fn default_nav_settle_ms() -> u64 {
    250
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_locale() -> String {
    "ru".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            proxy_url: default_proxy_url(),
            api_base: default_api_base(),
            api_key: String::new(),
            api_version: default_api_version(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            card_count: default_card_count(),
            flip_settle_ms: default_flip_settle_ms(),
            nav_settle_ms: default_nav_settle_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            locale: default_locale(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wortkarten")
            .join("config.toml")
    }

    /// Clamp numeric settings and reset unknown names. Call after loading.
    pub fn validate(&mut self, valid_themes: &[String]) {
        self.card_count = self.card_count.clamp(3, 40);
        self.max_tokens = self.max_tokens.clamp(256, 16_384);
        self.flip_settle_ms = self.flip_settle_ms.min(2_000);
        self.nav_settle_ms = self.nav_settle_ms.min(2_000);
        self.request_timeout_secs = self.request_timeout_secs.clamp(5, 300);
        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
        if !valid_themes.iter().any(|t| *t == self.theme) {
            self.theme = default_theme();
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn flip_settle(&self) -> Duration {
        Duration::from_millis(self.flip_settle_ms)
    }

    pub fn nav_settle(&self) -> Duration {
        Duration::from_millis(self.nav_settle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn transport(&self) -> Transport {
        match self.transport {
            TransportKind::Proxy => Transport::Proxy {
                url: self.proxy_url.clone(),
            },
            TransportKind::Credential => Transport::Direct {
                base_url: self.api_base.clone(),
                api_key: self.api_key.trim().to_string(),
                api_version: self.api_version.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes() -> Vec<String> {
        vec!["catppuccin-mocha".to_string(), "terminal-default".to_string()]
    }

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.transport, TransportKind::Proxy);
        assert_eq!(config.card_count, 15);
        assert!(config.api_key.is_empty());
        assert!(config.flip_settle_ms > config.nav_settle_ms);
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
transport = "credential"
api_key = "sk-test"
card_count = 8
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.transport, TransportKind::Credential);
        assert_eq!(config.card_count, 8);
        assert_eq!(config.locale, "ru");
        assert!(config.has_credential());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.proxy_url, deserialized.proxy_url);
        assert_eq!(config.transport, deserialized.transport);
        assert_eq!(config.max_tokens, deserialized.max_tokens);
    }

    #[test]
    fn test_validate_clamps_and_resets() {
        let mut config = Config::default();
        config.card_count = 0;
        config.max_tokens = 1_000_000;
        config.locale = "fr".to_string();
        config.theme = "nope".to_string();
        config.validate(&themes());
        assert_eq!(config.card_count, 3);
        assert_eq!(config.max_tokens, 16_384);
        assert_eq!(config.locale, "ru");
        assert_eq!(config.theme, "catppuccin-mocha");
    }

    #[test]
    fn test_transport_selection() {
        let mut config = Config::default();
        assert!(!config.transport().is_credential());
        config.transport = TransportKind::Credential;
        config.api_key = "  key  ".to_string();
        match config.transport() {
            Transport::Direct { api_key, .. } => assert_eq!(api_key, "key"),
            other => panic!("unexpected transport {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_key_is_not_a_credential() {
        let mut config = Config::default();
        config.api_key = "   ".to_string();
        assert!(!config.has_credential());
    }
}
