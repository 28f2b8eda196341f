//! Configuration module
//!
//! Settings for the import pipeline: database, staging storage, scratch space and the
//! retention policy of the job status store. Everything is read from the environment
//! (after loading `.env`) with documented defaults.

use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_STATUS_TTL_SECS, IMPORT_HISTORY_LIMIT};
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_IMPORT_FILE_SIZE_MB: u64 = 50;
const LOCAL_STORAGE_PATH: &str = "./data/storage";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/files";

#[derive(Clone, Debug)]
pub struct ImportConfig {
    /// Only required by commands that touch the bookmark table.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    /// Directory the executor downloads staged files into.
    pub scratch_dir: PathBuf,
    pub max_file_size_bytes: u64,
    pub status_ttl_secs: i64,
    pub history_limit: usize,
    pub log_format: String,
}

impl ImportConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let (local_storage_path, local_storage_base_url) = match storage_backend {
            StorageBackend::Local => (
                Some(
                    env::var("LOCAL_STORAGE_PATH")
                        .unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
                ),
                Some(
                    env::var("LOCAL_STORAGE_BASE_URL")
                        .unwrap_or_else(|_| LOCAL_STORAGE_BASE_URL.to_string()),
                ),
            ),
            StorageBackend::S3 => (
                env::var("LOCAL_STORAGE_PATH").ok(),
                env::var("LOCAL_STORAGE_BASE_URL").ok(),
            ),
        };

        let scratch_dir = env::var("IMPORT_SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("pinmark-imports"));

        let max_file_size_mb = env::var("IMPORT_MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMPORT_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_IMPORT_FILE_SIZE_MB);

        Ok(ImportConfig {
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            local_storage_path,
            local_storage_base_url,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            scratch_dir,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            status_ttl_secs: env::var("IMPORT_STATUS_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_STATUS_TTL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_STATUS_TTL_SECS),
            history_limit: env::var("IMPORT_HISTORY_LIMIT")
                .unwrap_or_else(|_| IMPORT_HISTORY_LIMIT.to_string())
                .parse()
                .unwrap_or(IMPORT_HISTORY_LIMIT),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("IMPORT_MAX_FILE_SIZE_MB must be positive"));
        }

        if self.status_ttl_secs <= 0 {
            return Err(anyhow::anyhow!("IMPORT_STATUS_TTL_SECS must be positive"));
        }

        if self.history_limit == 0 {
            return Err(anyhow::anyhow!("IMPORT_HISTORY_LIMIT must be positive"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// S3 region, preferring the storage-specific variable.
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ImportConfig {
        ImportConfig {
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Local,
            local_storage_path: Some("/tmp/pinmark".to_string()),
            local_storage_base_url: Some("http://localhost/files".to_string()),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            scratch_dir: PathBuf::from("/tmp/pinmark-scratch"),
            max_file_size_bytes: MAX_IMPORT_FILE_SIZE_MB * 1024 * 1024,
            status_ttl_secs: DEFAULT_STATUS_TTL_SECS,
            history_limit: IMPORT_HISTORY_LIMIT,
            log_format: "text".to_string(),
        }
    }

    #[test]
    fn local_config_is_valid() {
        assert!(local_config().validate().is_ok());
    }

    #[test]
    fn rejects_non_postgres_database_url() {
        let mut config = local_config();
        config.database_url = Some("mysql://localhost/db".to_string());
        assert!(config.validate().is_err());

        config.database_url = Some("postgres://localhost/pinmark".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn s3_requires_bucket_and_region() {
        let mut config = local_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("pinmark-imports".to_string());
        assert!(config.validate().is_err());

        config.aws_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.s3_region(), Some("eu-west-1"));
    }
}
