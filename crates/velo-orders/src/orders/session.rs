//! Versioned snapshots of an in-progress configurator session.
//!
//! Snapshots written by older releases may carry optionals that no longer exist (or values that
//! were never arrays). Restoring runs them through [`migrate`] so only priced features survive.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{recognized_optionals, CarConfiguration};

pub const SNAPSHOT_VERSION: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguratorSnapshot {
    pub version: u64,
    pub configuration: CarConfiguration,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot version {found} is newer than supported version {}", SNAPSHOT_VERSION)]
    UnsupportedVersion { found: u64 },
}

/// Serialize a configuration under the current schema version.
pub fn save(configuration: &CarConfiguration) -> Result<String, SnapshotError> {
    let snapshot = ConfiguratorSnapshot {
        version: SNAPSHOT_VERSION,
        configuration: configuration.clone(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Load a configuration from any snapshot version up to the current one.
pub fn restore(raw: &str) -> Result<CarConfiguration, SnapshotError> {
    let mut document: Value = serde_json::from_str(raw)?;
    let version = document.get("version").and_then(Value::as_u64).unwrap_or(0);

    if version > SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion { found: version });
    }
    if version < SNAPSHOT_VERSION {
        migrate(&mut document);
    }

    match document.get("configuration") {
        Some(configuration) => Ok(CarConfiguration::deserialize(configuration)?),
        None => Ok(CarConfiguration::default()),
    }
}

/// Replace `configuration.optionals` with its recognized string members.
pub fn migrate(document: &mut Value) {
    if let Some(configuration) = document
        .get_mut("configuration")
        .and_then(Value::as_object_mut)
    {
        let optionals = configuration
            .get("optionals")
            .map(recognized_optionals)
            .unwrap_or_default();
        let codes: Vec<Value> = optionals
            .into_iter()
            .map(|feature| Value::from(feature.code()))
            .collect();
        configuration.insert("optionals".to_string(), Value::Array(codes));
    }
    if let Some(object) = document.as_object_mut() {
        object.insert("version".to_string(), Value::from(SNAPSHOT_VERSION));
    }
}
