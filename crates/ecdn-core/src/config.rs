use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level daemon configuration (loaded from config.toml)
///
/// Secrets (API key, symmetric key secret) are never read from this file;
/// they come from the environment at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EcdnConfig {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address for the file API (default: 0.0.0.0:17233)
    pub listen: String,
    /// Directory whose files are served
    pub base_dir: PathBuf,
    /// Prometheus metrics + health endpoint (default: 127.0.0.1:9100)
    pub metrics_addr: Option<String>,
    /// Log level (default: info)
    pub log_level: String,
    /// Log format: "json" or "text"
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:17233".into(),
            base_dir: PathBuf::from("/srv/ecdn"),
            metrics_addr: Some("127.0.0.1:9100".into()),
            log_level: "info".into(),
            log_format: "text".into(),
        }
    }
}

impl EcdnConfig {
    pub fn from_toml(content: &str) -> crate::EcdnResult<Self> {
        toml::from_str(content).map_err(|e| crate::EcdnError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:8080"
base_dir = "/data/cdn"
metrics_addr = "127.0.0.1:9200"
log_level = "debug"
log_format = "json"
"#;
        let config = EcdnConfig::from_toml(toml_str).unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert_eq!(config.server.base_dir, PathBuf::from("/data/cdn"));
        assert_eq!(config.server.metrics_addr.as_deref(), Some("127.0.0.1:9200"));
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.log_format, "json");
    }

    #[test]
    fn test_parse_defaults() {
        let config = EcdnConfig::from_toml("").unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:17233");
        assert_eq!(config.server.base_dir, PathBuf::from("/srv/ecdn"));
        assert_eq!(config.server.metrics_addr.as_deref(), Some("127.0.0.1:9100"));
        assert_eq!(config.server.log_level, "info");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[server]
base_dir = "/mnt/media"
"#;
        let config = EcdnConfig::from_toml(toml_str).unwrap();

        // Overridden
        assert_eq!(config.server.base_dir, PathBuf::from("/mnt/media"));
        // Defaults
        assert_eq!(config.server.listen, "0.0.0.0:17233");
        assert_eq!(config.server.log_format, "text");
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let err = EcdnConfig::from_toml("[server]\nlisten = 17").unwrap_err();
        assert!(matches!(err, crate::EcdnError::Config(_)));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = EcdnConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = EcdnConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.server.listen, parsed.server.listen);
        assert_eq!(config.server.base_dir, parsed.server.base_dir);
    }
}
