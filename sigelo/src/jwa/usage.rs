use serde::{Deserialize, Serialize};

/// The intended use for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub enum Usage {
    /// The key is intended for signing and verification
    #[serde(rename = "sig")]
    Signing,

    /// The key is intended for encryption and decryption
    #[serde(rename = "enc")]
    Encryption,
}

/// A single operation a key is permitted to perform
///
/// Mirrors the `key_ops` JWK parameter. A key without a `key_ops` vector
/// permits every operation consistent with its `use` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub enum KeyOperation {
    /// Compute a digital signature or MAC
    Sign,
    /// Verify a digital signature or MAC
    Verify,
    /// Encrypt content
    Encrypt,
    /// Decrypt content
    Decrypt,
    /// Encrypt (wrap) another key
    WrapKey,
    /// Decrypt (unwrap) another key
    UnwrapKey,
    /// Derive bits not to be used directly as a key
    DeriveBits,
    /// Derive another key
    DeriveKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_operations_use_camel_case_names() {
        assert_eq!(
            serde_json::to_string(&KeyOperation::WrapKey).unwrap(),
            "\"wrapKey\""
        );
        assert_eq!(
            serde_json::to_string(&KeyOperation::DeriveBits).unwrap(),
            "\"deriveBits\""
        );
        let op: KeyOperation = serde_json::from_str("\"unwrapKey\"").unwrap();
        assert_eq!(op, KeyOperation::UnwrapKey);
    }
}
