//! GreenGrow Telemetry - simulated greenhouse sensor service
//!
//! This service fabricates greenhouse sensor readings on a fixed interval,
//! logs them with derived alert conditions, and mirrors each reading to a
//! simulated DynamoDB table when cloud credentials are configured.
//!
//! ## Features
//!
//! - Timed reading stream with immediate first delivery
//! - Threshold alerts (soil moisture, temperature, pests, light)
//! - Stubbed cloud upload that never performs real network I/O
//! - Graceful shutdown on SIGINT
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `GREENGROW_DEVICE_ID`: device identifier (default: greenhouse-01)
//! - `GREENGROW_READING_INTERVAL_MS`: milliseconds between readings (default: 5000)
//! - `GREENGROW_UPLOAD_DELAY_MS`: simulated upload latency (default: 100)
//! - `GREENGROW_CREDENTIALS_PATH`: credentials file location (default: greengrow-credentials.json)
//! - `RUST_LOG`: logging level filter (default: info)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use greengrow_telemetry::alerts::{self, AlertSeverity};
use greengrow_telemetry::config::Config;
use greengrow_telemetry::credentials::{CredentialStore, FileBackend};
use greengrow_telemetry::generator::{GeneratorConfig, IotMessage, ReadingGenerator, SensorReading};
use greengrow_telemetry::stream::ReadingStream;
use greengrow_telemetry::uploader::{CloudUploader, DEFAULT_CONNECTION_TEST_DELAY_MS};

/// Capacity of the reading hand-off channel between stream and uploader
const CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with environment filter
    init_tracing();

    info!("Starting GreenGrow telemetry service...");

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => {
            info!(
                device_id = %config.device_id,
                reading_interval_ms = config.reading_interval.as_millis() as u64,
                upload_delay_ms = config.upload_delay.as_millis() as u64,
                credentials_path = %config.credentials_path.display(),
                "Configuration loaded"
            );
            config
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Credential store backed by a local JSON file
    let store = CredentialStore::new(FileBackend::new(&config.credentials_path));
    if store.is_configured() {
        info!("Cloud credentials configured, readings will be mirrored to DynamoDB (simulated)");
    } else {
        warn!("Cloud credentials not configured, readings will only be logged locally");
    }

    let uploader = Arc::new(CloudUploader::with_delays(
        store,
        config.upload_delay,
        Duration::from_millis(DEFAULT_CONNECTION_TEST_DELAY_MS),
    ));

    let generator = ReadingGenerator::new(GeneratorConfig {
        device_id: config.device_id.clone(),
        ..GeneratorConfig::default()
    });
    info!("Reading generator initialized");

    // Hand readings from the stream callback to the upload loop
    let (tx, mut rx) = mpsc::channel::<SensorReading>(CHANNEL_CAPACITY);

    let stream = ReadingStream::new(generator, config.reading_interval);
    let handle = stream.start(move |reading| {
        if let Err(e) = tx.try_send(reading) {
            warn!(error = %e, "Upload queue full, dropping reading");
        }
    });

    // Spawn upload task - logs each reading, its alerts, and the simulated write
    let uploader_clone = uploader.clone();
    let upload_task = tokio::spawn(async move {
        info!("Upload task started");
        while let Some(reading) = rx.recv().await {
            report_reading(&reading);

            let message = IotMessage::for_reading(reading.clone());
            debug!(
                topic = %message.topic,
                message_id = %message.message_id,
                "Simulated IoT publish"
            );

            uploader_clone.send_reading(&reading).await;
        }
        info!("Upload task completed");
    });

    // Wait for shutdown signal
    info!("GreenGrow telemetry running. Press Ctrl+C to stop.");
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping...");
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
    }

    // Graceful shutdown: stopping the stream drops the channel sender, which
    // lets the upload task drain and exit.
    handle.stop();

    let shutdown_timeout = Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, upload_task).await {
        Ok(Ok(())) => {
            info!("Upload task shut down gracefully");
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Upload task panicked during shutdown");
        }
        Err(_) => {
            warn!("Upload task shutdown timed out after {:?}", shutdown_timeout);
        }
    }

    let stats = uploader.stats();
    info!(
        readings_sent = stats.readings_sent,
        skipped_unconfigured = stats.skipped_unconfigured,
        "GreenGrow telemetry stopped"
    );
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Log a reading and any alert conditions it triggers.
fn report_reading(reading: &SensorReading) {
    info!(
        device_id = %reading.device_id,
        temperature = reading.temperature,
        humidity = reading.humidity,
        soil_moisture = reading.soil_moisture,
        light_level = reading.light_level,
        pest_detection = %reading.pest_detection,
        ph = reading.ph,
        co2_level = reading.co2_level,
        "Sensor reading"
    );

    for alert in alerts::evaluate(reading) {
        match alert.severity {
            AlertSeverity::Critical => error!(title = %alert.title, "{}", alert.message),
            AlertSeverity::Warning => warn!(title = %alert.title, "{}", alert.message),
            AlertSeverity::Info => info!(title = %alert.title, "{}", alert.message),
        }
    }
}
