use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Default cap on a request body, cover uploads included
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("JWT_SECRET environment variable must be set in release builds")]
    MissingJwtSecret,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub media_root: PathBuf,
    pub page_size: u64,
    pub max_page_size: u64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://bibliocatalog.db?mode=rwc".to_string());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if cfg!(debug_assertions) => "secret".to_string(),
            _ => return Err(ConfigError::MissingJwtSecret),
        };

        let page_size = number("PAGE_SIZE", 10)?;
        let max_page_size = number("MAX_PAGE_SIZE", 100)?.max(page_size);

        Ok(Self {
            database_url,
            port: number("PORT", 8000)?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            jwt_secret,
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            page_size,
            max_page_size,
            max_upload_bytes: number("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn number<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().parse::<T>() {
            Ok(n) if n > T::default() => Ok(n),
            _ => Err(ConfigError::InvalidNumber { name, value }),
        },
    }
}
