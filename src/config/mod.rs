use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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
    pub verification: VerificationConfig,
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

        let shards = env::var("APP_VERIFICATION_SHARDS")
            .unwrap_or_else(|_| VerificationConfig::DEFAULT_SHARDS.to_string())
            .parse::<usize>()
            .ok()
            .filter(|shards| *shards > 0)
            .ok_or(ConfigError::InvalidShardCount)?;

        let sweep_secs = env::var("APP_VERIFICATION_SWEEP_SECS")
            .unwrap_or_else(|_| VerificationConfig::DEFAULT_SWEEP_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSweepInterval)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            verification: VerificationConfig {
                shards,
                sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            },
        })
    }
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

/// Pending verification store sizing and housekeeping.
///
/// The code TTL is fixed and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    pub shards: usize,
    /// `None` disables the background sweep; expiry is then enforced only on access.
    pub sweep_interval: Option<Duration>,
}

impl VerificationConfig {
    pub const DEFAULT_SHARDS: usize = 16;
    pub const DEFAULT_SWEEP_SECS: u64 = 60;
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            shards: Self::DEFAULT_SHARDS,
            sweep_interval: Some(Duration::from_secs(Self::DEFAULT_SWEEP_SECS)),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidShardCount,
    InvalidSweepInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidShardCount => {
                write!(f, "APP_VERIFICATION_SHARDS must be a positive integer")
            }
            ConfigError::InvalidSweepInterval => {
                write!(f, "APP_VERIFICATION_SWEEP_SECS must be a whole number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidShardCount
            | ConfigError::InvalidSweepInterval => None,
        }
    }
}
