//! Versioned binary persistence via `bitcode`.
//!
//! Every save is an envelope: a [`SaveHeader`] with magic and format
//! version, then the payload struct. Validation happens before the payload
//! is trusted, so format drift fails loudly instead of producing garbage
//! state. Payload-level leniency (defaulting a bad enum ordinal, masking
//! unknown bits) is the payload owner's job, not the envelope's.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Magic number identifying a machine save blob.
pub const SAVE_MAGIC: u32 = 0x4D4F_4E4F;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

/// Errors that can occur while encoding a save.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur while decoding a save.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SAVE_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("save from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

/// Header prepended to every save payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SaveHeader {
    pub magic: u32,
    pub version: u32,
}

impl SaveHeader {
    /// Header for the current format version.
    pub fn new() -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.magic != SAVE_MAGIC {
            return Err(DecodeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DecodeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SaveHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T: Serialize> {
    header: SaveHeader,
    payload: &'a T,
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Envelope<T> {
    header: SaveHeader,
    payload: T,
}

/// Encode a payload behind a current-version header.
pub fn encode_with_header<T: Serialize>(payload: &T) -> Result<Vec<u8>, EncodeError> {
    bitcode::serialize(&EnvelopeRef {
        header: SaveHeader::new(),
        payload,
    })
    .map_err(|e| EncodeError::Encode(e.to_string()))
}

/// Decode a payload, validating the header first.
pub fn decode_with_header<T: DeserializeOwned>(data: &[u8]) -> Result<T, DecodeError> {
    let envelope: Envelope<T> =
        bitcode::deserialize(data).map_err(|e| DecodeError::Decode(e.to_string()))?;
    envelope.header.validate()?;
    Ok(envelope.payload)
}

/// Controller state that survives a save/load cycle.
///
/// Matches the logical persisted layout: ability-derived state (keys, tier)
/// is deliberately absent and gets rebuilt on the next formation. The
/// voiding booleans are redundant with the ordinal; restore resolves any
/// disagreement toward the ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSaved {
    pub problems: u8,
    pub initial_maintenance_done: bool,
    pub time_active: i32,
    pub stored_taped: bool,
    pub voiding_items: bool,
    pub voiding_fluids: bool,
    pub voiding_mode: i32,
}
