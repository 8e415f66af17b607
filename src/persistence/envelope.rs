//! Versioned JSON envelope
//!
//! Every stored record is wrapped as `{"version": N, "payload": ...}` so a
//! future schema change can be detected instead of misread.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PersistenceError;

/// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Wrap and serialize a payload
pub fn encode<T: Serialize>(payload: &T) -> Result<String, PersistenceError> {
    let envelope = Envelope {
        version: SCHEMA_VERSION,
        payload,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse an envelope, rejecting versions this build does not understand
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, PersistenceError> {
    let probe: VersionProbe = serde_json::from_str(json)?;
    if probe.version != SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedVersion(probe.version));
    }
    let envelope: Envelope<T> = serde_json::from_str(json)?;
    Ok(envelope.payload)
}
