//! Simulated cloud upload.
//!
//! The uploader mimics writing sensor readings to a DynamoDB table: it builds
//! a `PutItem`-shaped request, logs it, and sleeps for a fixed artificial
//! delay. No network I/O ever occurs. The contract is "always succeeds when
//! credentials are configured, always fails without them"; the only failure
//! path is a missing configuration.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::credentials::{CredentialStore, StorageBackend};
use crate::generator::SensorReading;

/// Artificial latency for a simulated item write.
pub const DEFAULT_UPLOAD_DELAY_MS: u64 = 100;

/// Artificial latency for a simulated connection test.
pub const DEFAULT_CONNECTION_TEST_DELAY_MS: u64 = 500;

/// A DynamoDB-style tagged attribute value.
///
/// Serializes to the wire shape DynamoDB uses: `{"S": "..."}` for strings,
/// `{"N": "..."}` for numbers (which DynamoDB transports as strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeValue {
    S(String),
    N(String),
}

/// The write request a real integration would send, used here only as a
/// structured log payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemRequest {
    pub table_name: String,

    pub item: BTreeMap<String, AttributeValue>,
}

impl PutItemRequest {
    /// Build the item a reading would be written as.
    pub fn from_reading(table_name: &str, reading: &SensorReading, created_at: DateTime<Utc>) -> Self {
        let mut item = BTreeMap::new();
        item.insert("deviceId".to_string(), AttributeValue::S(reading.device_id.clone()));
        item.insert("timestamp".to_string(), AttributeValue::N(reading.timestamp.to_string()));
        item.insert("temperature".to_string(), AttributeValue::N(reading.temperature.to_string()));
        item.insert("humidity".to_string(), AttributeValue::N(reading.humidity.to_string()));
        item.insert(
            "soilMoisture".to_string(),
            AttributeValue::N(reading.soil_moisture.to_string()),
        );
        item.insert(
            "lightLevel".to_string(),
            AttributeValue::N(reading.light_level.to_string()),
        );
        item.insert(
            "pestDetection".to_string(),
            AttributeValue::S(reading.pest_detection.to_string()),
        );
        item.insert("ph".to_string(), AttributeValue::N(reading.ph.to_string()));
        item.insert("co2Level".to_string(), AttributeValue::N(reading.co2_level.to_string()));
        item.insert(
            "dateCreated".to_string(),
            AttributeValue::S(created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        Self {
            table_name: table_name.to_string(),
            item,
        }
    }
}

/// Counters for simulated upload activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStats {
    /// Readings "written" successfully
    pub readings_sent: u64,

    /// Batch operations completed
    pub batches_sent: u64,

    /// Sends refused because no credentials were configured
    pub skipped_unconfigured: u64,
}

/// Simulated remote-write client for greenhouse readings.
///
/// # Example
///
/// ```no_run
/// use greengrow_telemetry::credentials::{CredentialStore, MemoryBackend};
/// use greengrow_telemetry::generator::ReadingGenerator;
/// use greengrow_telemetry::uploader::CloudUploader;
///
/// #[tokio::main]
/// async fn main() {
///     let uploader = CloudUploader::new(CredentialStore::new(MemoryBackend::new()));
///     let reading = ReadingGenerator::with_defaults().generate();
///
///     if uploader.send_reading(&reading).await {
///         println!("uploaded");
///     } else {
///         println!("not configured");
///     }
/// }
/// ```
pub struct CloudUploader<B: StorageBackend> {
    store: CredentialStore<B>,

    upload_delay: Duration,

    connection_test_delay: Duration,

    stats: RwLock<UploadStats>,
}

impl<B: StorageBackend> CloudUploader<B> {
    /// Create an uploader with the default artificial delays.
    pub fn new(store: CredentialStore<B>) -> Self {
        Self::with_delays(
            store,
            Duration::from_millis(DEFAULT_UPLOAD_DELAY_MS),
            Duration::from_millis(DEFAULT_CONNECTION_TEST_DELAY_MS),
        )
    }

    /// Create an uploader with custom delays (useful for tests).
    pub fn with_delays(
        store: CredentialStore<B>,
        upload_delay: Duration,
        connection_test_delay: Duration,
    ) -> Self {
        Self {
            store,
            upload_delay,
            connection_test_delay,
            stats: RwLock::new(UploadStats::default()),
        }
    }

    /// The credential store this uploader reads its destination from.
    pub fn store(&self) -> &CredentialStore<B> {
        &self.store
    }

    /// Simulate writing one reading to the configured table.
    ///
    /// Returns `false` immediately when no credentials are configured;
    /// otherwise logs the would-be request, waits the fixed delay, and
    /// returns `true`.
    pub async fn send_reading(&self, reading: &SensorReading) -> bool {
        let Some(credentials) = self.store.load().filter(|c| c.is_complete()) else {
            warn!(device_id = %reading.device_id, "Cloud credentials not configured, skipping upload");
            if let Ok(mut stats) = self.stats.write() {
                stats.skipped_unconfigured += 1;
            }
            return false;
        };

        let request = PutItemRequest::from_reading(credentials.table_name(), reading, Utc::now());
        // The "wire" is this log line; no request leaves the process.
        info!(
            table = %request.table_name,
            region = %credentials.region,
            request = %serde_json::to_string(&request).unwrap_or_else(|_| "<unserializable>".to_string()),
            "Simulating DynamoDB PutItem"
        );

        sleep(self.upload_delay).await;

        if let Ok(mut stats) = self.stats.write() {
            stats.readings_sent += 1;
        }
        true
    }

    /// Simulate writing a batch of readings, preserving order.
    ///
    /// Returns the number of successful sends.
    pub async fn send_batch(&self, readings: &[SensorReading]) -> usize {
        let mut successes = 0;
        for reading in readings {
            if self.send_reading(reading).await {
                successes += 1;
            }
        }

        if let Ok(mut stats) = self.stats.write() {
            stats.batches_sent += 1;
        }
        info!(successes, total = readings.len(), "Batch upload complete");
        successes
    }

    /// Simulate probing the configured destination.
    ///
    /// Never reaches any endpoint: `false` if unconfigured, `true` after the
    /// fixed delay otherwise.
    pub async fn test_connection(&self) -> bool {
        if !self.store.is_configured() {
            warn!("Cloud credentials not configured, connection test failed");
            return false;
        }

        debug!("Testing cloud connection");
        sleep(self.connection_test_delay).await;
        info!("Cloud connection test successful");
        true
    }

    /// Snapshot of upload counters.
    pub fn stats(&self) -> UploadStats {
        self.stats.read().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credentials, MemoryBackend};
    use crate::generator::PestRisk;

    fn test_reading() -> SensorReading {
        SensorReading {
            device_id: "greenhouse-01".to_string(),
            timestamp: 1_717_243_200_000,
            temperature: 23.5,
            humidity: 64.0,
            soil_moisture: 58.0,
            light_level: 75.0,
            pest_detection: PestRisk::Low,
            ph: 6.4,
            co2_level: 412.0,
        }
    }

    fn valid_credentials() -> Credentials {
        Credentials {
            access_key_id: "A".repeat(20),
            secret_access_key: "B".repeat(40),
            region: "us-east-1".to_string(),
            dynamo_table_name: None,
        }
    }

    fn instant_uploader() -> CloudUploader<MemoryBackend> {
        CloudUploader::with_delays(
            CredentialStore::new(MemoryBackend::new()),
            Duration::ZERO,
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_send_reading_fails_unconfigured() {
        let uploader = instant_uploader();

        assert!(!uploader.send_reading(&test_reading()).await);
        assert_eq!(uploader.stats().skipped_unconfigured, 1);
        assert_eq!(uploader.stats().readings_sent, 0);
    }

    #[tokio::test]
    async fn test_send_reading_succeeds_after_save() {
        let uploader = instant_uploader();
        assert!(!uploader.send_reading(&test_reading()).await);

        uploader.store().save(&valid_credentials()).unwrap();
        assert!(uploader.send_reading(&test_reading()).await);
        assert_eq!(uploader.stats().readings_sent, 1);
    }

    #[tokio::test]
    async fn test_send_batch_counts_successes() {
        let uploader = instant_uploader();
        uploader.store().save(&valid_credentials()).unwrap();

        let readings = vec![test_reading(), test_reading(), test_reading()];
        assert_eq!(uploader.send_batch(&readings).await, 3);

        let stats = uploader.stats();
        assert_eq!(stats.readings_sent, 3);
        assert_eq!(stats.batches_sent, 1);
    }

    #[tokio::test]
    async fn test_send_batch_unconfigured_sends_nothing() {
        let uploader = instant_uploader();

        let readings = vec![test_reading(), test_reading()];
        assert_eq!(uploader.send_batch(&readings).await, 0);
        assert_eq!(uploader.stats().skipped_unconfigured, 2);
    }

    #[tokio::test]
    async fn test_connection_requires_configuration() {
        let uploader = instant_uploader();
        assert!(!uploader.test_connection().await);

        uploader.store().save(&valid_credentials()).unwrap();
        assert!(uploader.test_connection().await);
    }

    #[tokio::test]
    async fn test_clearing_credentials_disables_uploads() {
        let uploader = instant_uploader();
        uploader.store().save(&valid_credentials()).unwrap();
        assert!(uploader.send_reading(&test_reading()).await);

        uploader.store().clear();
        assert!(!uploader.send_reading(&test_reading()).await);
    }

    #[test]
    fn test_attribute_value_wire_shape() {
        assert_eq!(
            serde_json::to_string(&AttributeValue::S("greenhouse-01".to_string())).unwrap(),
            r#"{"S":"greenhouse-01"}"#
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::N("23.5".to_string())).unwrap(),
            r#"{"N":"23.5"}"#
        );
    }

    #[test]
    fn test_put_item_request_shape() {
        let created_at = DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = PutItemRequest::from_reading("GreenhouseSensorData", &test_reading(), created_at);

        assert_eq!(request.table_name, "GreenhouseSensorData");
        assert_eq!(
            request.item.get("deviceId"),
            Some(&AttributeValue::S("greenhouse-01".to_string()))
        );
        assert_eq!(
            request.item.get("temperature"),
            Some(&AttributeValue::N("23.5".to_string()))
        );
        // Whole-number floats serialize without a trailing ".0".
        assert_eq!(
            request.item.get("humidity"),
            Some(&AttributeValue::N("64".to_string()))
        );
        assert_eq!(
            request.item.get("pestDetection"),
            Some(&AttributeValue::S("Low".to_string()))
        );
        assert_eq!(
            request.item.get("dateCreated"),
            Some(&AttributeValue::S("2024-06-01T12:00:00.000Z".to_string()))
        );

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""TableName":"GreenhouseSensorData""#));
        assert!(json.contains(r#""Item":{"#));
        assert!(json.contains(r#""timestamp":{"N":"1717243200000"}"#));
    }
}
