// In: src/config.rs

//! The single source of truth for cloudpack compression configuration.
//!
//! `CompressOptions` is created once at the call boundary (from Rust code or a
//! JSON document) and passed by reference into the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::CloudpackError;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// Selects how the combined delta sequence is turned into payload bytes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CompressionMethod {
    /// Fixed-width big-endian f32 per symbol. No tree, no variable-length codes.
    Hybrid,

    /// **Default:** Huffman entropy coding of the delta symbols.
    #[default]
    Huffman,

    /// Encodes both payloads and keeps the smaller one. Ties go to `Hybrid`,
    /// which is cheaper to decode. Never written into a container.
    Auto,
}

/// Options accepted by `compress` and `check_compression`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CompressOptions {
    #[serde(default)]
    pub method: CompressionMethod,
}

impl CompressOptions {
    pub fn with_method(method: CompressionMethod) -> Self {
        Self { method }
    }

    /// Parses options from a JSON document such as `{"method": "hybrid"}`.
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, CloudpackError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CloudpackError> {
        Ok(serde_json::to_string(self)?)
    }
}

//==================================================================================
// II. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_method_is_huffman() {
        assert_eq!(CompressOptions::default().method, CompressionMethod::Huffman);
    }

    #[test]
    fn test_options_json_roundtrip() {
        let opts = CompressOptions::with_method(CompressionMethod::Hybrid);
        let json = opts.to_json().unwrap();
        assert_eq!(json, r#"{"method":"hybrid"}"#);
        assert_eq!(CompressOptions::from_json(&json).unwrap(), opts);
    }

    #[test]
    fn test_missing_method_uses_default() {
        let opts = CompressOptions::from_json("{}").unwrap();
        assert_eq!(opts.method, CompressionMethod::Huffman);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let result = CompressOptions::from_json(r#"{"method":"lzma"}"#);
        assert!(matches!(result, Err(CloudpackError::SerdeJson(_))));
    }
}
