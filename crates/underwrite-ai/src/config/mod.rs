use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::assessment::{ScoringConfig, ScoringConfigError};

const DEFAULT_ADVISOR_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_ADVISOR_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_ADVISOR_TIMEOUT_SECS: u64 = 30;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringSettings,
    pub advisor: AdvisorConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let rubric_path = non_empty_var("SCORING_RUBRIC_PATH").map(PathBuf::from);

        let timeout_secs = match non_empty_var("ADVISOR_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidAdvisorTimeout)?,
            None => DEFAULT_ADVISOR_TIMEOUT_SECS,
        };

        let advisor = AdvisorConfig {
            api_key: non_empty_var("ADVISOR_API_KEY"),
            model: non_empty_var("ADVISOR_MODEL")
                .unwrap_or_else(|| DEFAULT_ADVISOR_MODEL.to_string()),
            endpoint: non_empty_var("ADVISOR_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ADVISOR_ENDPOINT.to_string()),
            timeout_secs,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringSettings { rubric_path },
            advisor,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the scoring rubric comes from. Without a path the built-in rubric is used.
#[derive(Debug, Clone, Default)]
pub struct ScoringSettings {
    pub rubric_path: Option<PathBuf>,
}

impl ScoringSettings {
    /// Loads and validates the rubric file, or returns the standard rubric.
    pub fn load_rubric(&self) -> Result<ScoringConfig, ConfigError> {
        let Some(path) = &self.rubric_path else {
            return Ok(ScoringConfig::standard());
        };

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::RubricRead {
            path: path.clone(),
            source,
        })?;
        let rubric: ScoringConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::RubricParse {
                path: path.clone(),
                source,
            })?;
        rubric.validate().map_err(ConfigError::RubricInvalid)?;

        Ok(rubric)
    }
}

/// Hosted advisory model settings. No API key means advice is disabled.
#[derive(Clone)]
pub struct AdvisorConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl AdvisorConfig {
    pub fn disabled() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_ADVISOR_MODEL.to_string(),
            endpoint: DEFAULT_ADVISOR_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_ADVISOR_TIMEOUT_SECS,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidAdvisorTimeout,
    RubricRead {
        path: PathBuf,
        source: std::io::Error,
    },
    RubricParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    RubricInvalid(ScoringConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAdvisorTimeout => {
                write!(f, "ADVISOR_TIMEOUT_SECS must be a positive whole number")
            }
            ConfigError::RubricRead { path, .. } => {
                write!(f, "unable to read scoring rubric at {}", path.display())
            }
            ConfigError::RubricParse { path, source } => {
                write!(
                    f,
                    "scoring rubric at {} is not valid JSON: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::RubricInvalid(err) => write!(f, "scoring rubric rejected: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidAdvisorTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::RubricRead { source, .. } => Some(source),
            ConfigError::RubricParse { source, .. } => Some(source),
            ConfigError::RubricInvalid(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "SCORING_RUBRIC_PATH",
            "ADVISOR_API_KEY",
            "ADVISOR_MODEL",
            "ADVISOR_ENDPOINT",
            "ADVISOR_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.scoring.rubric_path.is_none());
        assert!(!config.advisor.is_enabled());
        assert_eq!(config.advisor.model, DEFAULT_ADVISOR_MODEL);
        assert_eq!(config.advisor.timeout_secs, 30);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn advisor_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADVISOR_API_KEY", "secret-key");
        env::set_var("ADVISOR_MODEL", "custom-model");
        env::set_var("ADVISOR_TIMEOUT_SECS", "5");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert!(config.advisor.is_enabled());
        assert_eq!(config.advisor.model, "custom-model");
        assert_eq!(config.advisor.timeout_secs, 5);
        assert!(!format!("{:?}", config.advisor).contains("secret-key"));
    }

    #[test]
    fn rejects_zero_advisor_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADVISOR_TIMEOUT_SECS", "0");
        let result = AppConfig::load();
        reset_env();

        assert!(matches!(result, Err(ConfigError::InvalidAdvisorTimeout)));
    }

    #[test]
    fn missing_rubric_path_uses_standard_rubric() {
        let rubric = ScoringSettings::default()
            .load_rubric()
            .expect("standard rubric");
        assert_eq!(rubric, ScoringConfig::standard());
    }

    #[test]
    fn loads_rubric_from_file() {
        let mut rubric = ScoringConfig::standard();
        rubric.version = "custom-1".to_string();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = serde_json::to_string(&rubric).expect("rubric serializes");
        file.write_all(json.as_bytes()).expect("rubric written");

        let settings = ScoringSettings {
            rubric_path: Some(file.path().to_path_buf()),
        };
        let loaded = settings.load_rubric().expect("rubric loads");
        assert_eq!(loaded.version, "custom-1");
    }

    #[test]
    fn rejects_rubric_with_overweight_categories() {
        let mut rubric = ScoringConfig::standard();
        rubric.weights.coverage_summary.weight = 40;
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = serde_json::to_string(&rubric).expect("rubric serializes");
        file.write_all(json.as_bytes()).expect("rubric written");

        let settings = ScoringSettings {
            rubric_path: Some(file.path().to_path_buf()),
        };
        let err = settings.load_rubric().expect_err("rubric rejected");
        assert!(matches!(
            err,
            ConfigError::RubricInvalid(ScoringConfigError::WeightsExceedScale { total: 133 })
        ));
    }

    #[test]
    fn reports_malformed_rubric_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ not json").expect("rubric written");

        let settings = ScoringSettings {
            rubric_path: Some(file.path().to_path_buf()),
        };
        let err = settings.load_rubric().expect_err("rubric rejected");
        assert!(matches!(err, ConfigError::RubricParse { .. }));
    }
}
