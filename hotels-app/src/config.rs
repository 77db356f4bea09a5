//! Configuration loading from environment.

use std::env;

use hotels_stripe::STRIPE_API_BASE;
use hotels_types::Currency;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub stripe_api_key: String,
    pub stripe_api_base: String,
    pub currency: Currency,
    /// Origin allowed to make credentialed cross-origin requests
    pub frontend_url: Option<String>,
    pub rate_limit_per_minute: u32,
    pub cookie_secure: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT: {}", e))?;

        let currency = match var("PAYMENT_CURRENCY") {
            Some(code) => code.parse()?,
            None => Currency::GBP,
        };

        let rate_limit_per_minute = var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|| "100".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid RATE_LIMIT_PER_MINUTE: {}", e))?;

        let cookie_secure = match var("COOKIE_SECURE").as_deref() {
            None => false,
            Some(v) => parse_bool(v)
                .ok_or_else(|| anyhow::anyhow!("Invalid COOKIE_SECURE: {}", v))?,
        };

        Ok(Self {
            port,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET_KEY")?,
            stripe_api_key: required("STRIPE_API_KEY")?,
            stripe_api_base: var("STRIPE_API_BASE").unwrap_or_else(|| STRIPE_API_BASE.to_string()),
            currency,
            frontend_url: var("FRONTEND_URL"),
            rate_limit_per_minute,
            cookie_secure,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
