use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};

use chrono::Utc;
use hex::encode as hex_encode;
use once_cell::sync::OnceCell;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::validation::{is_valid_id, OBJECT_ID_HEX_LENGTH};

/// Raw byte length of an object id.
pub const OBJECT_ID_LEN: usize = 12;

static PROCESS_UNIQUE: OnceCell<[u8; 5]> = OnceCell::new();
static COUNTER: OnceCell<AtomicU32> = OnceCell::new();

/// Errors emitted when an identifier cannot be parsed or minted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    #[error("object id must be exactly {OBJECT_ID_HEX_LENGTH} hex characters")]
    Malformed,
    #[error("failed to gather entropy for object id: {0}")]
    Entropy(String),
}

/// Store-assigned 12-byte identifier, rendered as 24 lowercase hex characters.
///
/// Layout: 4-byte big-endian creation second, 5 bytes unique to the process,
/// 3-byte counter that starts at a random value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn parse(candidate: &str) -> Result<Self, ObjectIdError> {
        if !is_valid_id(candidate) {
            return Err(ObjectIdError::Malformed);
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(candidate, &mut bytes).map_err(|_| ObjectIdError::Malformed)?;
        Ok(Self(bytes))
    }

    /// Mints a fresh identifier.
    pub fn generate() -> Result<Self, ObjectIdError> {
        let process = PROCESS_UNIQUE.get_or_try_init(|| {
            let mut buf = [0u8; 5];
            getrandom::fill(&mut buf).map_err(|err| ObjectIdError::Entropy(err.to_string()))?;
            Ok::<_, ObjectIdError>(buf)
        })?;
        let counter = COUNTER.get_or_try_init(|| {
            let mut buf = [0u8; 4];
            getrandom::fill(&mut buf).map_err(|err| ObjectIdError::Entropy(err.to_string()))?;
            Ok::<_, ObjectIdError>(AtomicU32::new(u32::from_be_bytes(buf) & 0x00ff_ffff))
        })?;

        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let count = counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex_encode(self.0)
    }

    /// Seconds since the Unix epoch at which the id was minted.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
