//! Cloud credential storage.
//!
//! Credentials for the simulated DynamoDB destination are kept as a single
//! JSON record under one well-known key in a pluggable key-value backend.
//! Persistence is best-effort: storage failures are logged and degrade to
//! "not configured" rather than surfacing as errors, so a broken credentials
//! file can never take the telemetry pipeline down.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Storage key for the persisted credentials record.
pub const CREDENTIALS_KEY: &str = "aws_credentials";

/// Table the uploader writes to when none is configured.
pub const DEFAULT_TABLE_NAME: &str = "GreenhouseSensorData";

/// Minimum plausible lengths for credential fields. The region bound is a
/// heuristic: `us-east-1` is exactly 9 characters.
const MIN_ACCESS_KEY_LEN: usize = 16;
const MIN_SECRET_KEY_LEN: usize = 32;
const MIN_REGION_LEN: usize = 9;

/// The structured record describing the simulated external destination.
///
/// Serialized in camelCase, matching the record shape the original dashboard
/// kept in browser storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,

    pub secret_access_key: String,

    pub region: String,

    /// Destination table; `None` means [`DEFAULT_TABLE_NAME`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamo_table_name: Option<String>,
}

impl Credentials {
    /// The destination table name, falling back to the default.
    pub fn table_name(&self) -> &str {
        self.dynamo_table_name.as_deref().unwrap_or(DEFAULT_TABLE_NAME)
    }

    /// Whether all required fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.region.is_empty()
    }

    /// Validate field formats, returning every violation.
    ///
    /// All problems are reported together rather than short-circuiting on the
    /// first, so a form can show the full list at once.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.access_key_id.len() < MIN_ACCESS_KEY_LEN {
            errors.push("Access Key ID must be at least 16 characters".to_string());
        }
        if self.secret_access_key.len() < MIN_SECRET_KEY_LEN {
            errors.push("Secret Access Key must be at least 32 characters".to_string());
        }
        if self.region.len() < MIN_REGION_LEN {
            errors.push("Region must be specified (e.g., us-east-1)".to_string());
        }

        errors
    }
}

/// Error from a storage backend operation.
#[derive(Debug)]
pub struct StorageError {
    pub message: String,
}

impl StorageError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "storage error: {}", self.message)
    }
}

impl std::error::Error for StorageError {}

/// A string key-value store, the seam the credential store persists through.
///
/// Implementations are synchronous; a single logical writer is assumed.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Key-value storage persisted as a JSON object in a single file.
///
/// The file is created on first write; a missing file reads as empty.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::new(format!("failed to read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| StorageError::new(format!("malformed store {}: {}", self.path.display(), e)))
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::new(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        let contents = serde_json::to_string_pretty(map)
            .map_err(|e| StorageError::new(format!("failed to serialize store: {}", e)))?;
        fs::write(&self.path, contents)
            .map_err(|e| StorageError::new(format!("failed to write {}: {}", self.path.display(), e)))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // A malformed file is not worth preserving; start over rather than
        // refusing every future write.
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut map = self.read_map().unwrap_or_default();
        map.remove(key);
        self.write_map(&map)
    }
}

/// In-memory key-value storage for tests.
#[derive(Default)]
pub struct MemoryBackend {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self
            .map
            .lock()
            .map_err(|_| StorageError::new("storage mutex poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| StorageError::new("storage mutex poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| StorageError::new("storage mutex poisoned"))?;
        map.remove(key);
        Ok(())
    }
}

/// Get/set/clear of the single persisted [`Credentials`] record.
///
/// At most one record exists at a time; `save` overwrites wholesale. Read and
/// write failures never propagate: callers observe `None` or `false` and the
/// failure is logged.
pub struct CredentialStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> CredentialStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Validate and persist `credentials`, overwriting any prior record.
    ///
    /// Returns the full list of validation errors if the record is invalid;
    /// nothing is persisted in that case. Storage failures after successful
    /// validation are logged and swallowed.
    pub fn save(&self, credentials: &Credentials) -> Result<(), Vec<String>> {
        let errors = credentials.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        match serde_json::to_string(credentials) {
            Ok(json) => match self.backend.put(CREDENTIALS_KEY, &json) {
                Ok(()) => info!(region = %credentials.region, "Cloud credentials stored"),
                Err(e) => warn!(error = %e, "Failed to store cloud credentials"),
            },
            Err(e) => warn!(error = %e, "Failed to serialize cloud credentials"),
        }

        Ok(())
    }

    /// Load the persisted record, if present and well-formed.
    pub fn load(&self) -> Option<Credentials> {
        match self.backend.get(CREDENTIALS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(credentials) => Some(credentials),
                Err(e) => {
                    warn!(error = %e, "Stored cloud credentials are malformed");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read cloud credentials");
                None
            }
        }
    }

    /// Remove the persisted record unconditionally.
    pub fn clear(&self) {
        match self.backend.remove(CREDENTIALS_KEY) {
            Ok(()) => info!("Cloud credentials cleared"),
            Err(e) => warn!(error = %e, "Failed to clear cloud credentials"),
        }
    }

    /// Whether a persisted record with all required fields exists.
    pub fn is_configured(&self) -> bool {
        self.load().map_or(false, |c| c.is_complete())
    }
}
