//! Configuration module for the telemetry service.
//!
//! This module provides environment-based configuration for the greenhouse
//! telemetry binary: device identity, reading cadence, simulated upload
//! latency, and where the credentials file lives.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default device identifier stamped on generated readings
const DEFAULT_DEVICE_ID: &str = "greenhouse-01";

/// Default reading interval in milliseconds (matches the dashboard's 5s refresh)
const DEFAULT_READING_INTERVAL_MS: u64 = 5_000;

/// Minimum reading interval to keep the log output readable
const MIN_READING_INTERVAL_MS: u64 = 250;

/// Maximum reading interval to ensure the dashboard stays fresh
const MAX_READING_INTERVAL_MS: u64 = 3_600_000;

/// Default simulated upload latency in milliseconds
const DEFAULT_UPLOAD_DELAY_MS: u64 = 100;

/// Maximum simulated upload latency; anything longer would stall the pipeline
const MAX_UPLOAD_DELAY_MS: u64 = 10_000;

/// Default location of the credentials file
const DEFAULT_CREDENTIALS_PATH: &str = "greengrow-credentials.json";

/// Configuration for the telemetry service.
///
/// All settings can be configured via environment variables:
/// - `GREENGROW_DEVICE_ID`: device identifier (default: greenhouse-01)
/// - `GREENGROW_READING_INTERVAL_MS`: milliseconds between readings (default: 5000)
/// - `GREENGROW_UPLOAD_DELAY_MS`: simulated upload latency (default: 100)
/// - `GREENGROW_CREDENTIALS_PATH`: credentials file location (default: greengrow-credentials.json)
#[derive(Debug, Clone)]
pub struct Config {
    /// Device identifier stamped on every generated reading
    pub device_id: String,

    /// Interval between stream deliveries
    pub reading_interval: Duration,

    /// Artificial latency of each simulated upload
    pub upload_delay: Duration,

    /// Where the credential store persists its single record
    pub credentials_path: PathBuf,
}

/// Error type for configuration loading failures
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub env_var: Option<String>,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.env_var {
            Some(var) => write!(f, "Configuration error for {}: {}", var, self.message),
            None => write!(f, "Configuration error: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Returns a new `Config` instance with values from environment
    /// variables, falling back to sensible defaults where appropriate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `GREENGROW_DEVICE_ID` is set but empty
    /// - `GREENGROW_READING_INTERVAL_MS` is not a valid number or exceeds limits
    /// - `GREENGROW_UPLOAD_DELAY_MS` is not a valid number or exceeds limits
    pub fn from_env() -> Result<Self, ConfigError> {
        let device_id = parse_device_id(env::var("GREENGROW_DEVICE_ID").ok())?;

        let reading_interval_ms =
            parse_reading_interval(env::var("GREENGROW_READING_INTERVAL_MS").ok())?;
        let reading_interval = Duration::from_millis(reading_interval_ms);

        let upload_delay_ms = parse_upload_delay(env::var("GREENGROW_UPLOAD_DELAY_MS").ok())?;
        let upload_delay = Duration::from_millis(upload_delay_ms);

        let credentials_path = env::var("GREENGROW_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        Ok(Self {
            device_id,
            reading_interval,
            upload_delay,
            credentials_path,
        })
    }
}

impl Default for Config {
    /// Create a default configuration using default values.
    ///
    /// This is useful for testing or when environment variables are not set.
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID.to_string(),
            reading_interval: Duration::from_millis(DEFAULT_READING_INTERVAL_MS),
            upload_delay: Duration::from_millis(DEFAULT_UPLOAD_DELAY_MS),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }
}

/// Validate the device identifier, falling back to the default when unset.
fn parse_device_id(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(id) => {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(ConfigError {
                    message: "device id must not be empty".to_string(),
                    env_var: Some("GREENGROW_DEVICE_ID".to_string()),
                });
            }
            Ok(id)
        }
        None => Ok(DEFAULT_DEVICE_ID.to_string()),
    }
}

/// Parse the reading interval with validation.
fn parse_reading_interval(value: Option<String>) -> Result<u64, ConfigError> {
    let env_var = "GREENGROW_READING_INTERVAL_MS";

    match value {
        Some(raw) => {
            let interval: u64 = raw.parse().map_err(|_| ConfigError {
                message: format!("'{}' is not a valid number", raw),
                env_var: Some(env_var.to_string()),
            })?;

            if interval < MIN_READING_INTERVAL_MS {
                return Err(ConfigError {
                    message: format!(
                        "reading interval {} is below minimum ({}ms)",
                        interval, MIN_READING_INTERVAL_MS
                    ),
                    env_var: Some(env_var.to_string()),
                });
            }

            if interval > MAX_READING_INTERVAL_MS {
                return Err(ConfigError {
                    message: format!(
                        "reading interval {} exceeds maximum ({}ms)",
                        interval, MAX_READING_INTERVAL_MS
                    ),
                    env_var: Some(env_var.to_string()),
                });
            }

            Ok(interval)
        }
        None => Ok(DEFAULT_READING_INTERVAL_MS),
    }
}

/// Parse the simulated upload delay with validation.
fn parse_upload_delay(value: Option<String>) -> Result<u64, ConfigError> {
    let env_var = "GREENGROW_UPLOAD_DELAY_MS";

    match value {
        Some(raw) => {
            let delay: u64 = raw.parse().map_err(|_| ConfigError {
                message: format!("'{}' is not a valid number", raw),
                env_var: Some(env_var.to_string()),
            })?;

            if delay > MAX_UPLOAD_DELAY_MS {
                return Err(ConfigError {
                    message: format!(
                        "upload delay {} exceeds maximum ({}ms)",
                        delay, MAX_UPLOAD_DELAY_MS
                    ),
                    env_var: Some(env_var.to_string()),
                });
            }

            Ok(delay)
        }
        None => Ok(DEFAULT_UPLOAD_DELAY_MS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvGuard {
        fn remove(key: &str) -> Self {
            let original = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                original,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(val) => env::set_var(&self.key, val),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.device_id, "greenhouse-01");
        assert_eq!(config.reading_interval, Duration::from_millis(5_000));
        assert_eq!(config.upload_delay, Duration::from_millis(100));
        assert_eq!(
            config.credentials_path,
            PathBuf::from("greengrow-credentials.json")
        );
    }

    #[test]
    fn test_config_from_env_with_defaults() {
        let _guard1 = EnvGuard::remove("GREENGROW_DEVICE_ID");
        let _guard2 = EnvGuard::remove("GREENGROW_READING_INTERVAL_MS");
        let _guard3 = EnvGuard::remove("GREENGROW_UPLOAD_DELAY_MS");
        let _guard4 = EnvGuard::remove("GREENGROW_CREDENTIALS_PATH");

        let config = Config::from_env().expect("Should load with defaults");
        assert_eq!(config.device_id, "greenhouse-01");
        assert_eq!(config.reading_interval, Duration::from_millis(5_000));
        assert_eq!(config.upload_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_custom_device_id() {
        let id = parse_device_id(Some("greenhouse-07".to_string())).unwrap();
        assert_eq!(id, "greenhouse-07");
    }

    #[test]
    fn test_empty_device_id_rejected() {
        let result = parse_device_id(Some("   ".to_string()));
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("must not be empty"));
    }

    #[test]
    fn test_reading_interval_bounds() {
        assert_eq!(parse_reading_interval(None).unwrap(), 5_000);
        assert_eq!(
            parse_reading_interval(Some("1000".to_string())).unwrap(),
            1_000
        );

        let err = parse_reading_interval(Some("100".to_string())).unwrap_err();
        assert!(err.message.contains("below minimum"));

        let err = parse_reading_interval(Some("9999999".to_string())).unwrap_err();
        assert!(err.message.contains("exceeds maximum"));
    }

    #[test]
    fn test_invalid_reading_interval() {
        let err = parse_reading_interval(Some("not_a_number".to_string())).unwrap_err();
        assert!(err.message.contains("not a valid number"));
        assert_eq!(
            err.env_var.as_deref(),
            Some("GREENGROW_READING_INTERVAL_MS")
        );
    }

    #[test]
    fn test_upload_delay_bounds() {
        assert_eq!(parse_upload_delay(None).unwrap(), 100);
        // Zero delay is allowed; tests rely on it.
        assert_eq!(parse_upload_delay(Some("0".to_string())).unwrap(), 0);

        let err = parse_upload_delay(Some("99999".to_string())).unwrap_err();
        assert!(err.message.contains("exceeds maximum"));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError {
            message: "test error".to_string(),
            env_var: Some("TEST_VAR".to_string()),
        };
        assert_eq!(
            format!("{}", error),
            "Configuration error for TEST_VAR: test error"
        );

        let error_no_var = ConfigError {
            message: "general error".to_string(),
            env_var: None,
        };
        assert_eq!(
            format!("{}", error_no_var),
            "Configuration error: general error"
        );
    }
}
