use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BLOB_TIMEOUT_SECS, DEFAULT_CLOUDINARY_API_BASE, DEFAULT_CLOUDINARY_FOLDER,
    DEFAULT_DB_TIMEOUT_SECS, DEFAULT_JWT_EXPIRY_SECS,
};

/// Credentials and placement for the Cloudinary blob store
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder every uploaded sheet is placed under
    pub folder: String,
    /// API origin, overridable so tests can point at a mock server
    pub api_base: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expiry_secs: u64,
    pub admin_username: Option<String>,
    /// Argon2 PHC string of the operator password
    pub admin_password_hash: Option<String>,
    pub cloudinary: CloudinaryConfig,
    pub blob_timeout_secs: u64,
    pub db_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_url = required("DATABASE_URL")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set for admin token signing")?;
        let jwt_expiry_secs = parse_or("JWT_EXPIRY_SECS", DEFAULT_JWT_EXPIRY_SECS)?;

        let admin_username = optional("ADMIN_USERNAME");
        let admin_password_hash = optional("ADMIN_PASSWORD_HASH");

        let cloudinary = CloudinaryConfig {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: required("CLOUDINARY_API_SECRET")?,
            folder: env::var("CLOUDINARY_FOLDER")
                .unwrap_or_else(|_| DEFAULT_CLOUDINARY_FOLDER.to_string()),
            api_base: env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_CLOUDINARY_API_BASE.to_string()),
        };

        let blob_timeout_secs = parse_or("BLOB_TIMEOUT_SECS", DEFAULT_BLOB_TIMEOUT_SECS)?;
        let db_timeout_secs = parse_or("DB_TIMEOUT_SECS", DEFAULT_DB_TIMEOUT_SECS)?;

        Ok(Config {
            server_host,
            server_port,
            database_url,
            allowed_origins,
            environment,
            jwt_secret,
            jwt_expiry_secs,
            admin_username,
            admin_password_hash,
            cloudinary,
            blob_timeout_secs,
            db_timeout_secs,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn blob_timeout(&self) -> Duration {
        Duration::from_secs(self.blob_timeout_secs)
    }

    pub fn db_timeout(&self) -> Duration {
        Duration::from_secs(self.db_timeout_secs)
    }
}

fn required(key: &str) -> Result<String, String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("{} must be set", key)),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| format!("Invalid {}", key)),
        Err(_) => Ok(default),
    }
}
