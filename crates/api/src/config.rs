//! Layered application configuration
//!
//! Defaults, then an optional TOML file, then `BRAKE_ALERT__*` environment
//! variables (e.g. `BRAKE_ALERT__SERVER__BIND_ADDR=127.0.0.1:9000`).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "BRAKE_ALERT_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "brake-alert.toml";
const ENV_PREFIX: &str = "BRAKE_ALERT";

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Serve Prometheus metrics on `/metrics`
    pub metrics_enabled: bool,
    /// Largest accepted frame body (bytes)
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            metrics_enabled: true,
            // 1920x1080 RGB24 plus headroom
            max_frame_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Include the module target in log lines
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, INFO when unrecognized
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

impl AppConfig {
    /// Load from `path`, else `$BRAKE_ALERT_CONFIG`, else `brake-alert.toml`.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Config::builder()
            .add_source(File::from(path.as_path()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/brake-alert.toml"))).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.pipeline.alert.cooldown_ms, 1500);
        assert_eq!(config.pipeline.adas.detection.confidence_threshold, 0.3);
    }

    #[test]
    fn test_file_overrides_nested_values() {
        let path = std::env::temp_dir().join(format!("brake-alert-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nbind_addr = \"127.0.0.1:9000\"\n\n\
             [pipeline.alert]\ncooldown_ms = 500\n\n\
             [pipeline.adas.distance]\nsmoothing_factor = 0.5\n"
        )
        .unwrap();
        drop(file);

        let config = AppConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.pipeline.alert.cooldown_ms, 500);
        assert_eq!(config.pipeline.alert.danger_ttc_s, 2.0);
        assert_eq!(config.pipeline.adas.distance.smoothing_factor, 0.5);
    }

    #[test]
    fn test_log_level_parsing() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        assert_eq!(logging.max_level(), Level::DEBUG);

        let logging = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(logging.max_level(), Level::INFO);
    }
}
