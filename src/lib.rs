//! GreenGrow Telemetry Library
//!
//! This library provides the simulated sensor pipeline behind the GreenGrow
//! Pro greenhouse dashboard:
//!
//! - **generator**: synthetic sensor readings with coupled day/night cycles
//! - **stream**: timed, cancellable delivery of readings to a subscriber
//! - **credentials**: the single persisted cloud-credential record
//! - **uploader**: simulated DynamoDB writes (logging stubs, no network I/O)
//! - **alerts**: threshold evaluation for statuses and alert conditions
//! - **config**: environment-based configuration for the service binary
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use greengrow_telemetry::credentials::{CredentialStore, MemoryBackend};
//! use greengrow_telemetry::generator::ReadingGenerator;
//! use greengrow_telemetry::stream::ReadingStream;
//! use greengrow_telemetry::uploader::CloudUploader;
//!
//! #[tokio::main]
//! async fn main() {
//!     let uploader = CloudUploader::new(CredentialStore::new(MemoryBackend::new()));
//!
//!     // One-off reading and upload attempt.
//!     let generator = ReadingGenerator::with_defaults();
//!     let reading = generator.generate();
//!     uploader.send_reading(&reading).await;
//!
//!     // Continuous delivery every five seconds.
//!     let stream = ReadingStream::new(generator, Duration::from_secs(5));
//!     let handle = stream.start(|reading| {
//!         println!("{:.1}C / {:.0}%", reading.temperature, reading.humidity);
//!     });
//!
//!     tokio::time::sleep(Duration::from_secs(30)).await;
//!     handle.stop();
//! }
//! ```

// Module declarations
pub mod alerts;
pub mod config;
pub mod credentials;
pub mod generator;
pub mod stream;
pub mod uploader;

// Re-export commonly used types at crate root for convenience
pub use alerts::{Alert, AlertSeverity, SensorStatus};
pub use config::{Config, ConfigError};
pub use credentials::{
    CredentialStore, Credentials, FileBackend, MemoryBackend, StorageBackend, StorageError,
};
pub use generator::{GeneratorConfig, IotMessage, PestRisk, ReadingGenerator, SensorReading};
pub use stream::{ReadingStream, StreamHandle};
pub use uploader::{AttributeValue, CloudUploader, PutItemRequest, UploadStats};
