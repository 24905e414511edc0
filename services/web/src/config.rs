//! services/web/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Credentials for the remote services are
//! optional: a deployment without them still starts and degrades the affected
//! features instead of refusing to boot.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Origin used to build links sent by email (sign-up confirmation, reset).
    pub public_url: String,
    /// Address shown in every page footer.
    pub support_email: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub completion_model: String,
    pub completion_timeout: Duration,
    pub baas_timeout: Duration,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            public_url: "http://localhost:3000".to_string(),
            support_email: "support@clearcom.ai".to_string(),
            supabase_url: None,
            supabase_anon_key: None,
            openai_api_key: None,
            completion_model: "gpt-3.5-turbo".to_string(),
            completion_timeout: Duration::from_secs(60),
            baas_timeout: Duration::from_secs(15),
            secure_cookies: true,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        // --- Server Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        let public_url = non_blank(lookup("PUBLIC_URL"))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_url);

        let support_email = non_blank(lookup("SUPPORT_EMAIL")).unwrap_or(defaults.support_email);

        // --- Load Credentials (as optional) ---
        let supabase_url = non_blank(lookup("SUPABASE_URL"));
        let supabase_anon_key = non_blank(lookup("SUPABASE_ANON_KEY"));
        let openai_api_key = non_blank(lookup("OPENAI_API_KEY"));

        // --- Load Adapter-specific Settings ---
        let completion_model =
            non_blank(lookup("COMPLETION_MODEL")).unwrap_or(defaults.completion_model);
        let completion_timeout = parse_secs(&lookup, "COMPLETION_TIMEOUT_SECS")?
            .unwrap_or(defaults.completion_timeout);
        let baas_timeout =
            parse_secs(&lookup, "BAAS_TIMEOUT_SECS")?.unwrap_or(defaults.baas_timeout);

        let secure_cookies = match lookup("SECURE_COOKIES") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "SECURE_COOKIES".to_string(),
                    format!("'{}' is not true or false", raw),
                )
            })?,
            None => defaults.secure_cookies,
        };

        Ok(Self {
            bind_address,
            log_level,
            public_url,
            support_email,
            supabase_url,
            supabase_anon_key,
            openai_api_key,
            completion_model,
            completion_timeout,
            baas_timeout,
            secure_cookies,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                format!("'{}' is not a positive number of seconds", raw),
            )),
        },
        None => Ok(None),
    }
}
