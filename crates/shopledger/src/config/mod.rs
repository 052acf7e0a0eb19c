use rand::RngCore;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::domain::DEFAULT_PAGE_SIZE;

const MIN_SECRET_BYTES: usize = 32;

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
    pub auth: AuthConfig,
    pub listing: ListingConfig,
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
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            auth: AuthConfig::from_env(environment)?,
            listing: ListingConfig {
                default_page_size: parse_number("PAGE_SIZE_DEFAULT", DEFAULT_PAGE_SIZE)?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Line layout of the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ConfigError::InvalidLogFormat {
                value: value.to_string(),
            }),
        }
    }
}

/// Token signing and bootstrap account settings.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: Vec<u8>,
    pub token_ttl_minutes: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl AuthConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let secret = match env::var("AUTH_SECRET") {
            Ok(value) if value.len() >= MIN_SECRET_BYTES => value.into_bytes(),
            Ok(_) => return Err(ConfigError::WeakAuthSecret),
            Err(_) if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingAuthSecret)
            }
            Err(_) => Self::ephemeral_secret(),
        };

        let token_ttl_minutes = parse_number("AUTH_TOKEN_TTL_MINUTES", 720_u32)?;

        let bootstrap_admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(BootstrapAdmin { username, password }),
            _ => None,
        };

        Ok(Self {
            secret,
            token_ttl_minutes: i64::from(token_ttl_minutes),
            bootstrap_admin,
        })
    }

    /// Random per-process key; tokens do not survive a restart.
    pub fn ephemeral_secret() -> Vec<u8> {
        let mut secret = vec![0u8; MIN_SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut secret);
        secret
    }
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    pub default_page_size: u32,
}

fn parse_number<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
    InvalidLogFormat { value: String },
    MissingAuthSecret,
    WeakAuthSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative integer")
            }
            ConfigError::InvalidLogFormat { value } => {
                write!(f, "APP_LOG_FORMAT '{value}' must be compact, full or pretty")
            }
            ConfigError::MissingAuthSecret => {
                write!(f, "AUTH_SECRET must be set in production")
            }
            ConfigError::WeakAuthSecret => {
                write!(f, "AUTH_SECRET must be at least {MIN_SECRET_BYTES} bytes")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
