use crate::reports::RiskThresholds;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub reporting: RiskThresholds,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("TEAMPULSE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("TEAMPULSE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("TEAMPULSE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("TEAMPULSE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = RiskThresholds::default();
        let reporting = RiskThresholds {
            member: threshold_var("TEAMPULSE_MEMBER_RISK_THRESHOLD", defaults.member)?,
            kpi: threshold_var("TEAMPULSE_KPI_RISK_THRESHOLD", defaults.kpi)?,
            team: threshold_var("TEAMPULSE_TEAM_RISK_THRESHOLD", defaults.team)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            reporting,
        })
    }
}

fn threshold_var(variable: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && (0.0..=4.0).contains(value))
            .ok_or(ConfigError::InvalidThreshold { variable }),
        Err(_) => Ok(default),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "TEAMPULSE_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "TEAMPULSE_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { variable } => {
                write!(f, "{variable} must be a mean score between 0 and 4")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidThreshold { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
