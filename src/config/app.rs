use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BREVO_API_URL: &str = "https://api.brevo.com/v3";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("Production configuration rejected: {0}")]
    Production(String),
}

/// Credentials and endpoints of the two upstream verification services.
///
/// Missing API keys are allowed here. The gateways report them as a
/// configuration error when a call actually needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub sender_api_url: String,
    pub sender_api_key: Option<String>,
    pub brevo_api_url: String,
    pub brevo_api_key: Option<String>,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = parse_env("GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT_SECS)?;

        let config = GatewayConfig {
            sender_api_url: env::var("SENDER_API_URL")
                .unwrap_or_else(|_| DEFAULT_BREVO_API_URL.to_string()),
            sender_api_key: non_empty_env("SENDER_API_KEY"),
            brevo_api_url: env::var("BREVO_API_URL")
                .unwrap_or_else(|_| DEFAULT_BREVO_API_URL.to_string()),
            brevo_api_key: non_empty_env("BREVO_API_KEY"),
            timeout: Duration::from_secs(timeout_secs),
        };

        if config.sender_api_key.is_none() {
            warn!("SENDER_API_KEY not set; sender creation and OTP validation will fail");
        }
        if config.brevo_api_key.is_none() {
            warn!("BREVO_API_KEY not set; domain authentication will fail");
        }

        Ok(config)
    }

    /// Config pointing both services at `base_url` (wiremock in tests).
    pub fn for_base_url(base_url: &str, api_key: Option<&str>) -> Self {
        GatewayConfig {
            sender_api_url: base_url.to_string(),
            sender_api_key: api_key.map(str::to_string),
            brevo_api_url: base_url.to_string(),
            brevo_api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub environment: String,
    pub cors_allowed_origin: Option<String>,
    pub session_ttl_hours: i64,
    pub gateway: GatewayConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(AppConfig {
            database_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            environment: current_environment(),
            cors_allowed_origin: non_empty_env("CORS_ALLOWED_ORIGIN"),
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?,
            gateway: GatewayConfig::from_env()?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn validate_production_config(&self) -> Result<(), ConfigError> {
        if !self.is_production() {
            return Ok(());
        }

        if self.database_url.contains(":memory:") {
            return Err(ConfigError::Production(
                "in-memory database is not allowed in production".to_string(),
            ));
        }

        if self.cors_allowed_origin.is_none() {
            return Err(ConfigError::Production(
                "CORS_ALLOWED_ORIGIN must be set in production".to_string(),
            ));
        }

        for (key, url) in [
            ("SENDER_API_URL", &self.gateway.sender_api_url),
            ("BREVO_API_URL", &self.gateway.brevo_api_url),
        ] {
            if !url.starts_with("https://") {
                return Err(ConfigError::Production(format!("{} must use https", key)));
            }
        }

        Ok(())
    }
}

fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_gateway_env() {
        for key in [
            "SENDER_API_URL",
            "SENDER_API_KEY",
            "BREVO_API_URL",
            "BREVO_API_KEY",
            "GATEWAY_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_gateway_defaults() {
        clear_gateway_env();
        let config = GatewayConfig::from_env().unwrap();

        assert_eq!(config.sender_api_url, DEFAULT_BREVO_API_URL);
        assert_eq!(config.brevo_api_url, DEFAULT_BREVO_API_URL);
        assert_eq!(config.sender_api_key, None);
        assert_eq!(config.brevo_api_key, None);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_blank_api_key_counts_as_missing() {
        clear_gateway_env();
        env::set_var("BREVO_API_KEY", "   ");
        env::set_var("SENDER_API_KEY", "xkeysib-123");

        let config = GatewayConfig::from_env().unwrap();
        assert_eq!(config.brevo_api_key, None);
        assert_eq!(config.sender_api_key.as_deref(), Some("xkeysib-123"));
        clear_gateway_env();
    }

    #[test]
    #[serial]
    fn test_invalid_timeout() {
        clear_gateway_env();
        env::set_var("GATEWAY_TIMEOUT_SECS", "soon");

        let err = GatewayConfig::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "GATEWAY_TIMEOUT_SECS",
                value: "soon".to_string()
            }
        );
        clear_gateway_env();
    }

    #[test]
    fn test_production_rejects_plain_http_gateway() {
        let config = AppConfig {
            database_url: "sqlite://data/app.db".to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            environment: "production".to_string(),
            cors_allowed_origin: Some("https://app.example.com".to_string()),
            session_ttl_hours: 24,
            gateway: GatewayConfig::for_base_url("http://localhost:9999", Some("key")),
        };

        assert_eq!(
            config.validate_production_config(),
            Err(ConfigError::Production(
                "SENDER_API_URL must use https".to_string()
            ))
        );

        let development = AppConfig {
            environment: "development".to_string(),
            ..config
        };
        assert!(development.validate_production_config().is_ok());
    }

    #[test]
    #[serial]
    fn test_production_requires_cors_origin() {
        clear_gateway_env();
        env::set_var("DATABASE_URL", "sqlite://data/app.db");
        env::set_var("ENVIRONMENT", "production");
        env::remove_var("CORS_ALLOWED_ORIGIN");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.validate_production_config(),
            Err(ConfigError::Production(
                "CORS_ALLOWED_ORIGIN must be set in production".to_string()
            ))
        );

        env::set_var("CORS_ALLOWED_ORIGIN", "https://app.example.com");
        let config = AppConfig::from_env().unwrap();
        assert!(config.validate_production_config().is_ok());

        for key in ["DATABASE_URL", "ENVIRONMENT", "CORS_ALLOWED_ORIGIN"] {
            env::remove_var(key);
        }
    }
}
