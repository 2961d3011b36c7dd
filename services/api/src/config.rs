//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::i18n::{Locale, LocaleSettings};

const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which generative AI provider the OpenAI-compatible client talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenAiSettings {
    pub api_key: String,
    pub api_base: Option<String>,
    pub report_model: String,
    pub valuation_model: String,
    pub assistant_model: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub genai: GenAiSettings,
    pub vision_service_url: String,
    pub vision_timeout: Duration,
    pub generation_timeout: Duration,
    pub locales: LocaleSettings,
    pub cors_origin: String,
    pub auth_session_days: i64,
    pub expose_error_detail: bool,
    pub max_body_bytes: usize,
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3001".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Generative AI Provider ---
        // Gemini is reached through its OpenAI-compatible endpoint.
        let (api_key, provider_base, default_model) = match (
            lookup("OPENAI_API_KEY"),
            lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")),
        ) {
            (Some(key), _) => (key, None, "gpt-4o-mini"),
            (None, Some(key)) => (key, Some(GEMINI_OPENAI_BASE.to_string()), "gemini-2.5-flash"),
            (None, None) => {
                return Err(ConfigError::MissingVar(
                    "OPENAI_API_KEY or GEMINI_API_KEY".to_string(),
                ))
            }
        };
        let model = |name: &str| lookup(name).unwrap_or_else(|| default_model.to_string());
        let genai = GenAiSettings {
            api_key,
            api_base: lookup("GENAI_API_BASE").or(provider_base),
            report_model: model("REPORT_MODEL"),
            valuation_model: model("VALUATION_MODEL"),
            assistant_model: model("ASSISTANT_MODEL"),
        };

        // --- Vision Hint Service and Timeouts ---
        let vision_service_url = lookup("VISION_SERVICE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        let vision_timeout =
            Duration::from_secs(parse_var("VISION_TIMEOUT_SECS", lookup("VISION_TIMEOUT_SECS"), 15u64)?);
        let generation_timeout = Duration::from_secs(parse_var(
            "GENERATION_TIMEOUT_SECS",
            lookup("GENERATION_TIMEOUT_SECS"),
            60u64,
        )?);

        // --- Localization ---
        let default_locale = parse_var("DEFAULT_LOCALE", lookup("DEFAULT_LOCALE"), Locale::En)?;
        let supported = match lookup("SUPPORTED_LOCALES") {
            None => Locale::ALL.to_vec(),
            Some(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.parse::<Locale>()
                        .map_err(|e| ConfigError::InvalidValue("SUPPORTED_LOCALES".to_string(), e))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        if !supported.contains(&default_locale) {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_LOCALE".to_string(),
                format!("'{}' is not in SUPPORTED_LOCALES", default_locale),
            ));
        }

        // --- Web Layer ---
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let auth_session_days = parse_var("AUTH_SESSION_DAYS", lookup("AUTH_SESSION_DAYS"), 30i64)?;
        let expose_error_detail =
            parse_var("EXPOSE_ERROR_DETAIL", lookup("EXPOSE_ERROR_DETAIL"), false)?;
        let max_body_bytes =
            parse_var("MAX_BODY_BYTES", lookup("MAX_BODY_BYTES"), 10 * 1024 * 1024usize)?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            genai,
            vision_service_url,
            vision_timeout,
            generation_timeout,
            locales: LocaleSettings {
                default: default_locale,
                supported,
            },
            cors_origin,
            auth_session_days,
            expose_error_detail,
            max_body_bytes,
        })
    }

    /// `DATABASE_URL=memory://` selects the in-memory store.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_with_minimal_environment() {
        let config = load(&[("DATABASE_URL", "memory://"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.bind_address.port(), 3001);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.genai.report_model, "gpt-4o-mini");
        assert_eq!(config.genai.api_base, None);
        assert_eq!(config.vision_service_url, "http://127.0.0.1:5000");
        assert_eq!(config.vision_timeout, Duration::from_secs(15));
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert_eq!(config.locales, LocaleSettings::default());
        assert_eq!(config.auth_session_days, 30);
        assert!(!config.expose_error_detail);
        assert!(config.uses_memory_store());
    }

    #[test]
    fn gemini_key_selects_gemini_endpoint() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/livestock"),
            ("GEMINI_API_KEY", "g-test"),
            ("ASSISTANT_MODEL", "gemini-1.5-flash"),
        ])
        .unwrap();
        assert_eq!(config.genai.api_base.as_deref(), Some(GEMINI_OPENAI_BASE));
        assert_eq!(config.genai.report_model, "gemini-2.5-flash");
        assert_eq!(config.genai.assistant_model, "gemini-1.5-flash");
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn missing_required_values_are_reported() {
        assert!(matches!(
            load(&[("OPENAI_API_KEY", "sk")]),
            Err(ConfigError::MissingVar(v)) if v == "DATABASE_URL"
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "memory://")]),
            Err(ConfigError::MissingVar(_))
        ));
    }

    #[test]
    fn locale_settings_are_validated() {
        let config = load(&[
            ("DATABASE_URL", "memory://"),
            ("OPENAI_API_KEY", "sk"),
            ("SUPPORTED_LOCALES", "en, hi"),
            ("DEFAULT_LOCALE", "hi"),
        ])
        .unwrap();
        assert_eq!(config.locales.supported, vec![Locale::En, Locale::Hi]);
        assert_eq!(config.locales.default, Locale::Hi);

        assert!(matches!(
            load(&[
                ("DATABASE_URL", "memory://"),
                ("OPENAI_API_KEY", "sk"),
                ("SUPPORTED_LOCALES", "en"),
                ("DEFAULT_LOCALE", "ta"),
            ]),
            Err(ConfigError::InvalidValue(v, _)) if v == "DEFAULT_LOCALE"
        ));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(matches!(
            load(&[
                ("DATABASE_URL", "memory://"),
                ("OPENAI_API_KEY", "sk"),
                ("VISION_TIMEOUT_SECS", "soon"),
            ]),
            Err(ConfigError::InvalidValue(v, _)) if v == "VISION_TIMEOUT_SECS"
        ));
    }
}
