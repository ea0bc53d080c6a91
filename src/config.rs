/// Configuration management for the forum content service
///
/// This module handles loading and managing configuration from environment
/// variables.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Media storage configuration
    pub storage: StorageConfig,
    /// Moderation gating configuration
    pub moderation: ModerationConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to validate session tokens
    pub jwt_secret: String,
}

/// Media storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for uploaded media (images/ and videos/ live below it)
    pub upload_dir: PathBuf,
    /// Maximum overall multipart request size in bytes
    pub max_form_bytes: usize,
}

/// Moderation gating configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// When true, posts from ordinary users are inserted unapproved and must
    /// be approved by a moderator before becoming visible.
    pub approval_required: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("FORUM_CONTENT_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FORUM_CONTENT_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8181),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/forum".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            auth: {
                let jwt_secret = match std::env::var("JWT_SECRET") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("JWT_SECRET must be set in production".to_string())
                    }
                    Err(_) => "dev-secret".to_string(),
                };
                AuthConfig { jwt_secret }
            },
            storage: StorageConfig {
                upload_dir: std::env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./assets/uploads")),
                max_form_bytes: std::env::var("MAX_FORM_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_FORM_BYTES),
            },
            moderation: ModerationConfig {
                approval_required: std::env::var("APPROVAL_REQUIRED")
                    .ok()
                    .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                    .unwrap_or(false),
            },
        })
    }
}

/// Image ceiling (20 MiB) + video ceiling (100 MiB) + headroom for text fields.
const DEFAULT_MAX_FORM_BYTES: usize = 128 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_env() {
        // Only exercises the default branches; CI may set DATABASE_URL, so
        // assert on fields that have no common environment override.
        let config = Config::from_env().expect("default config must load");
        assert_eq!(config.storage.max_form_bytes, DEFAULT_MAX_FORM_BYTES);
        assert!(!config.moderation.approval_required);
        assert_eq!(config.app.port, 8181);
    }
}
