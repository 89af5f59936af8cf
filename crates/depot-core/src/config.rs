//! Configuration module
//!
//! Environment-driven configuration for the gateway, including the storage
//! backend selection, upload limits, and the authentication gate.

use std::env;

use crate::storage_types::StorageBackend;

// Defaults
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 10;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_KEY_PREFIX: &str = "reports";
const DEFAULT_BUCKET: &str = "repo-analyzer";
const DEFAULT_REGION: &str = "eu-central-1";
const DEFAULT_ANALYSIS_QUEUE_DEPTH: usize = 64;

/// Gateway configuration.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Shared secret expected in the `x-api-key` header.
    pub api_key: Option<String>,
    /// Explicit, loud bypass of the auth gate. Never a default; `validate`
    /// rejects it in production.
    pub auth_disabled: bool,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub key_prefix: String,
    pub max_upload_size_bytes: usize,
    pub upload_timeout_secs: u64,
    /// Directory for staging uploads before the backend write. Defaults to the
    /// system temp directory.
    pub upload_staging_dir: Option<String>,
    pub analysis_queue_depth: usize,
}

impl GatewayConfig {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(StorageBackend::S3);

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB);

        let config = GatewayConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            api_key: env::var("API_KEY").ok().filter(|s| !s.is_empty()),
            auth_disabled: env::var("AUTH_DISABLED")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET")
                .or_else(|_| env::var("AWS_S3_BUCKET"))
                .ok()
                .or_else(|| Some(DEFAULT_BUCKET.to_string())),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok()
                .or_else(|| Some(DEFAULT_REGION.to_string())),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            key_prefix: env::var("KEY_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
            upload_staging_dir: env::var("UPLOAD_STAGING_DIR").ok().filter(|s| !s.is_empty()),
            analysis_queue_depth: env::var("ANALYSIS_QUEUE_DEPTH")
                .unwrap_or_else(|_| DEFAULT_ANALYSIS_QUEUE_DEPTH.to_string())
                .parse()
                .unwrap_or(DEFAULT_ANALYSIS_QUEUE_DEPTH),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth_disabled {
            if self.is_production() {
                return Err(anyhow::anyhow!(
                    "AUTH_DISABLED=true is not permitted in production"
                ));
            }
        } else if self.api_key.is_none() {
            return Err(anyhow::anyhow!(
                "API_KEY must be set unless AUTH_DISABLED=true"
            ));
        }

        if self.key_prefix.trim_matches('/').is_empty() {
            return Err(anyhow::anyhow!("KEY_PREFIX must be a non-empty path segment"));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using the S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using the S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using the local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using the local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> GatewayConfig {
        GatewayConfig {
            server_port: 3000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            api_key: Some("secret".to_string()),
            auth_disabled: false,
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/depot".to_string()),
            local_storage_base_url: Some("http://localhost:3000/objects".to_string()),
            key_prefix: "reports".to_string(),
            max_upload_size_bytes: 10 * 1024 * 1024,
            upload_timeout_secs: 30,
            upload_staging_dir: None,
            analysis_queue_depth: 64,
        }
    }

    #[test]
    fn test_validate_accepts_local_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_api_key_without_bypass() {
        let mut config = base_config();
        config.api_key = None;
        assert!(config.validate().is_err());

        config.auth_disabled = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bypass_in_production() {
        let mut config = base_config();
        config.environment = "production".to_string();
        config.auth_disabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_backend_settings() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        config.s3_bucket = None;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("depot".to_string());
        config.s3_region = Some("eu-central-1".to_string());
        assert!(config.validate().is_ok());

        let mut config = base_config();
        config.local_storage_path = None;
        assert!(config.validate().is_err());
    }
}
