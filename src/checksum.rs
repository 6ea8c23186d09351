//! Content checksums used as analysis cache keys

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum of analysis input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a JSON value with object keys sorted at every level
    pub fn from_json(value: &Value) -> Self {
        let mut canonical = String::new();
        write_canonical(value, &mut canonical);
        Self::from_bytes(canonical.as_bytes())
    }

    /// Combine several checksums into one, order-sensitive
    pub fn combine<'a>(parts: impl IntoIterator<Item = &'a Checksum>) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.0.as_bytes());
            hasher.update(b"\n");
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that a JSON value matches this checksum
    pub fn verify_json(&self, value: &Value) -> bool {
        Self::from_json(value) == *self
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_consistency() {
        let value = json!({"users": {"name": "string"}});
        assert_eq!(Checksum::from_json(&value), Checksum::from_json(&value));
    }

    #[test]
    fn test_checksum_different_content() {
        let a = Checksum::from_json(&json!({"users": {"name": "string"}}));
        let b = Checksum::from_json(&json!({"users": {"name": "number"}}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_checksum_verification() {
        let value = json!({"a": [1, 2, {"z": 1, "y": 2}]});
        let checksum = Checksum::from_json(&value);
        assert!(checksum.verify_json(&json!({"a": [1, 2, {"y": 2, "z": 1}]})));
        assert!(!checksum.verify_json(&json!({"a": [2, 1]})));
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        let a = Checksum::from_bytes(b"a");
        let b = Checksum::from_bytes(b"b");
        assert_ne!(Checksum::combine([&a, &b]), Checksum::combine([&b, &a]));
    }
}
