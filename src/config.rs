//! Runtime configuration for fitness-plan-proxy.
//!
//! Non-secret settings are loaded from a JSON file (or defaults). The Gemini
//! API key is never part of the file: it comes from the environment and is
//! injected into the [`Config`] before the server starts, so handlers never
//! touch ambient process state.

use std::path::PathBuf;

use clap::Parser;
use secrecy::Secret;
use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fitness-plan-proxy",
    about = "Credential-guarding proxy for Gemini fitness plans"
)]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inbound HTTP settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// External generation API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Gemini API key. `None` makes every proxy request fail with a
    /// configuration error.
    #[serde(skip)]
    pub api_key: Option<Secret<String>>,
}

/// Inbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path the proxy handler is mounted at.
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            route: "/api/generate-plan".to_string(),
        }
    }
}

/// External generation API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the Gemini REST API, without a trailing `/models/...`.
    pub base_url: String,

    /// Model name used in the `generateContent` path.
    pub model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Full `generateContent` URL, without the key query parameter.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let data = std::fs::read_to_string(path)?;
            serde_json::from_str::<Config>(&data)?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Attach the API key. Empty values count as unset.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty()).map(Secret::new);
        self
    }

    /// Attach the API key from [`API_KEY_ENV`].
    pub fn with_api_key_from_env(self) -> Self {
        self.with_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !self.server.route.starts_with('/') {
            anyhow::bail!("server.route must start with '/', got {:?}", self.server.route);
        }
        if self.upstream.model.is_empty() {
            anyhow::bail!("upstream.model must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.server.route, "/api/generate-plan");
        assert_eq!(cfg.upstream.model, DEFAULT_MODEL);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_default_endpoint() {
        let cfg = Config::default();
        assert_eq!(
            cfg.upstream.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-09-2025:generateContent"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let upstream = UpstreamConfig {
            base_url: "http://localhost:9000/".to_string(),
            model: "m".to_string(),
        };
        assert_eq!(upstream.endpoint(), "http://localhost:9000/models/m:generateContent");
    }

    #[test]
    fn test_empty_key_is_unset() {
        let cfg = Config::default().with_api_key(Some(String::new()));
        assert!(cfg.api_key.is_none());

        let cfg = Config::default().with_api_key(Some("abc".to_string()));
        assert_eq!(cfg.api_key.unwrap().expose_secret(), "abc");
    }

    #[test]
    fn test_key_is_redacted_in_debug() {
        let cfg = Config::default().with_api_key(Some("super-secret".to_string()));
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["fitness-plan-proxy", "--log-json", "-v"]);
        assert!(cli.log_json);
        assert!(cli.verbose);
        assert_eq!(cli.listen, "0.0.0.0:8080");

        let cli = Cli::parse_from(["fitness-plan-proxy"]);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(cfg.server.route, "/api/generate-plan");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"upstream": {{"base_url": "http://x", "model": "gemini-pro"}}}}"#).unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.upstream.model, "gemini-pro");
        assert_eq!(cfg.server.route, "/api/generate-plan");
    }

    #[test]
    fn test_load_rejects_relative_route() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server": {{"route": "generate"}}}}"#).unwrap();

        assert!(Config::load(file.path()).is_err());
    }
}
