//! Runtime configuration loaded from layered `.env` files and `ISSUESYNC_*`
//! environment variables. Process environment always wins over files.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost/issuesync".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_page_size() -> u64 {
    100
}

fn default_cron_schedule() -> String {
    "0 */6 * * *".to_string()
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_jitter_factor() -> f64 {
    0.2
}

/// Backoff policy applied to retryable remote failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicyConfig {
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_retry_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            base_delay_ms: default_retry_base_delay_ms(),
            jitter_factor: default_retry_jitter_factor(),
        }
    }
}

impl RetryPolicyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryAttempts {
                value: self.max_attempts,
            });
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(ConfigError::InvalidRetryJitter {
                value: self.jitter_factor,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Decoded 32-byte key for credential encryption. Empty when unset.
    #[serde(default, skip_serializing)]
    pub crypto_key: Vec<u8>,
    /// Page size for remote searches and sub-resource drains.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Cron expression applied to projects without an explicit schedule.
    #[serde(default = "default_cron_schedule")]
    pub default_cron_schedule: String,
    #[serde(default)]
    pub retry: RetryPolicyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            crypto_key: Vec::new(),
            page_size: default_page_size(),
            default_cron_schedule: default_cron_schedule(),
            retry: RetryPolicyConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.crypto_key.is_empty() && self.crypto_key.len() != 32 {
            return Err(ConfigError::InvalidCryptoKeyLength {
                length: self.crypto_key.len(),
            });
        }
        if self.page_size == 0 || self.page_size > 1_000 {
            return Err(ConfigError::InvalidPageSize {
                value: self.page_size,
            });
        }
        self.retry.validate()?;
        Ok(())
    }

    /// JSON representation with secrets omitted, safe to log at startup.
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("crypto key is invalid base64: {error}")]
    InvalidCryptoKeyBase64 { error: String },
    #[error("crypto key must decode to exactly 32 bytes, got {length} bytes")]
    InvalidCryptoKeyLength { length: usize },
    #[error("page size must be between 1 and 1000, got {value}")]
    InvalidPageSize { value: u64 },
    #[error("retry max attempts must be at least 1, got {value}")]
    InvalidRetryAttempts { value: u32 },
    #[error("retry jitter factor must be between 0.0 and 1.0, got {value}")]
    InvalidRetryJitter { value: f64 },
}

/// Loads configuration using layered `.env` files and `ISSUESYNC_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut layered = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("ISSUESYNC_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        Self::from_values(layered)
    }

    fn from_values(mut layered: BTreeMap<String, String>) -> Result<AppConfig, ConfigError> {
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let database_url = layered
            .remove("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let page_size = layered
            .remove("PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_page_size);
        let default_cron = layered
            .remove("DEFAULT_CRON_SCHEDULE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_cron_schedule);

        let crypto_key = if let Some(key_str) = layered.remove("CRYPTO_KEY") {
            use base64::{engine::general_purpose, Engine as _};
            general_purpose::STANDARD.decode(&key_str).map_err(|e| {
                ConfigError::InvalidCryptoKeyBase64 {
                    error: e.to_string(),
                }
            })?
        } else {
            Vec::new()
        };

        let retry = RetryPolicyConfig {
            max_attempts: layered
                .remove("RETRY_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_retry_max_attempts),
            base_delay_ms: layered
                .remove("RETRY_BASE_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_retry_base_delay_ms),
            jitter_factor: layered
                .remove("RETRY_JITTER_FACTOR")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_retry_jitter_factor),
        };

        let config = AppConfig {
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            crypto_key,
            page_size,
            default_cron_schedule: default_cron,
            retry,
        };
        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut values = BTreeMap::new();
        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;
        Ok(values)
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("ISSUESYNC_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = ConfigLoader::from_values(BTreeMap::new()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.page_size, 100);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn values_override_defaults() {
        let config = ConfigLoader::from_values(values(&[
            ("LOG_LEVEL", "debug"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PAGE_SIZE", "50"),
            ("RETRY_MAX_ATTEMPTS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = ConfigLoader::from_values(values(&[("LOG_LEVEL", "")])).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn crypto_key_must_be_valid_base64() {
        let err = ConfigLoader::from_values(values(&[("CRYPTO_KEY", "not base64!!")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidCryptoKeyBase64 { .. }));
    }

    #[test]
    fn crypto_key_must_decode_to_32_bytes() {
        use base64::{engine::general_purpose, Engine as _};
        let short = general_purpose::STANDARD.encode([0u8; 16]);
        let err = ConfigLoader::from_values(values(&[("CRYPTO_KEY", short.as_str())]))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConfigError::InvalidCryptoKeyLength { length: 16 }
        ));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = ConfigLoader::from_values(values(&[("PAGE_SIZE", "0")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidPageSize { value: 0 }));

        let err = ConfigLoader::from_values(values(&[("RETRY_JITTER_FACTOR", "1.5")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidRetryJitter { .. }));
    }

    #[test]
    fn dotenv_files_are_layered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "ISSUESYNC_LOG_LEVEL=warn\nISSUESYNC_PAGE_SIZE=25\nUNPREFIXED=ignored\n",
        )
        .unwrap();
        fs::write(dir.path().join(".env.local"), "ISSUESYNC_LOG_LEVEL=trace\n").unwrap();

        let loader = ConfigLoader::with_base_dir(dir.path().to_path_buf());
        let layered = loader.collect_layered_env().unwrap();
        let config = ConfigLoader::from_values(layered).unwrap();
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn redacted_json_omits_crypto_key() {
        let mut config = AppConfig::default();
        config.crypto_key = vec![7u8; 32];
        let json = config.redacted_json().unwrap();
        assert!(!json.contains("crypto_key"));
    }
}
