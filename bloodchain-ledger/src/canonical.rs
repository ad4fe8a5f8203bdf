//! Canonical serialization for hashing
//!
//! Ensures a deterministic byte representation for block hashes and Merkle
//! leaves. Encoding version 1:
//!
//! - The value is first converted to a JSON document with `serde_json`
//! - Objects are written with keys sorted lexicographically (by bytes) at
//!   every depth
//! - No insignificant whitespace
//! - Strings use JSON escaping, integers are decimal, floats use the
//!   shortest representation that round-trips
//!
//! Any verifier that re-encodes a block this way recomputes the same hash.

use crate::Result;
use serde::Serialize;
use serde_json::Value;

/// Encoding version pinned by this module
pub const CANONICAL_ENCODING_VERSION: u32 = 1;

/// Canonical serializer
#[derive(Debug, Default)]
pub struct CanonicalSerializer {
    buffer: String,
}

impl CanonicalSerializer {
    /// Create new serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a JSON value in canonical form
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

                self.buffer.push('{');
                for (i, (key, val)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        self.buffer.push(',');
                    }
                    self.write_string(key)?;
                    self.buffer.push(':');
                    self.write_value(val)?;
                }
                self.buffer.push('}');
            }
            Value::Array(items) => {
                self.buffer.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buffer.push(',');
                    }
                    self.write_value(item)?;
                }
                self.buffer.push(']');
            }
            Value::String(s) => self.write_string(s)?,
            // Null, Bool and Number have a single compact rendering
            scalar => self.buffer.push_str(&serde_json::to_string(scalar)?),
        }
        Ok(())
    }

    /// Write string (JSON-escaped)
    fn write_string(&mut self, s: &str) -> Result<()> {
        self.buffer.push_str(&serde_json::to_string(s)?);
        Ok(())
    }

    /// Finalize and return bytes
    pub fn finalize(self) -> Vec<u8> {
        self.buffer.into_bytes()
    }
}

/// Canonical bytes of any serializable value
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value)?;
    let mut ser = CanonicalSerializer::new();
    ser.write_value(&value)?;
    Ok(ser.finalize())
}

/// SHA-256 hex of a value's canonical bytes
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(crate::crypto::sha256_hex(&to_canonical_bytes(value)?))
}
