//! The error taxonomy shared by every operation in this crate
//!
//! The set of kinds is closed on purpose. Input-validation failures are
//! reported with their precise kind, while failures discovered during
//! signature verification or decryption are collapsed into
//! [`Error::SignatureInvalid`] and [`Error::DecryptionFailed`] so that a
//! caller relaying errors cannot be used as a padding or MAC oracle.

use std::error::Error as StdError;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Any failure produced while parsing, signing, verifying, encrypting, or
/// decrypting a JOSE artifact
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The input is not a well-formed JOSE artifact: wrong segment count,
    /// invalid base64, invalid JSON, or a field of the wrong type
    #[error("malformed JOSE encoding")]
    MalformedEncoding {
        /// The underlying parse failure, when one exists
        #[source]
        source: Option<BoxError>,
    },

    /// The `alg` header names an algorithm this crate does not implement,
    /// or one that the active policy has disabled
    #[error("unsupported algorithm '{alg}'")]
    UnsupportedAlgorithm {
        /// The offending algorithm identifier
        alg: String,
    },

    /// The `enc` header names a content encryption method this crate does
    /// not implement
    #[error("unsupported encryption method '{enc}'")]
    UnsupportedEncryption {
        /// The offending encryption identifier
        enc: String,
    },

    /// The `crit` header lists a parameter this crate does not understand
    #[error("unrecognized critical header parameter '{name}'")]
    UnsupportedCritical {
        /// The unrecognized parameter name
        name: String,
    },

    /// The key's type, curve, usage, or operations are incompatible with
    /// the requested algorithm
    #[error("key cannot be used with the requested algorithm")]
    KeyTypeMismatch,

    /// The key has the right type but the wrong size: a symmetric key
    /// shorter than the MAC output, an RSA modulus below 2048 bits, or a
    /// wrap/content key of the wrong width
    #[error("key length unsuitable for the requested algorithm")]
    InvalidKeyLength,

    /// Signature verification failed
    #[error("signature verification failed")]
    SignatureInvalid,

    /// Authenticated decryption or key unwrapping failed
    #[error("decryption failed")]
    DecryptionFailed,

    /// The PBES2 salt input is shorter than eight bytes
    #[error("PBES2 salt must be at least 8 bytes")]
    InvalidSalt,

    /// The PBES2 iteration count is not a positive integer
    #[error("PBES2 iteration count must be positive")]
    InvalidIterationCount,

    /// The PBES2 iteration count falls outside the configured bounds
    #[error("PBES2 iteration count outside the configured bounds")]
    IterationPolicyExceeded,

    /// Inflating a compressed payload would exceed the configured bound
    #[error("decompressed payload exceeds the configured limit")]
    CompressionExpansionLimit,

    /// The cryptographic provider failed for a reason not attributable to
    /// the input
    #[error("cryptographic provider failure")]
    ProviderError {
        /// The provider's failure
        #[source]
        source: BoxError,
    },
}

#[inline]
pub(crate) fn malformed() -> Error {
    Error::MalformedEncoding { source: None }
}

#[inline]
pub(crate) fn malformed_with(source: impl Into<BoxError>) -> Error {
    Error::MalformedEncoding {
        source: Some(source.into()),
    }
}

#[inline]
pub(crate) fn unsupported_algorithm(alg: impl Into<String>) -> Error {
    Error::UnsupportedAlgorithm { alg: alg.into() }
}

#[inline]
pub(crate) fn unsupported_encryption(enc: impl Into<String>) -> Error {
    Error::UnsupportedEncryption { enc: enc.into() }
}

#[inline]
pub(crate) fn unsupported_critical(name: impl Into<String>) -> Error {
    Error::UnsupportedCritical { name: name.into() }
}

#[inline]
pub(crate) const fn key_type_mismatch() -> Error {
    Error::KeyTypeMismatch
}

#[inline]
pub(crate) const fn invalid_key_length() -> Error {
    Error::InvalidKeyLength
}

#[inline]
pub(crate) const fn signature_invalid() -> Error {
    Error::SignatureInvalid
}

#[inline]
pub(crate) const fn decryption_failed() -> Error {
    Error::DecryptionFailed
}

#[inline]
pub(crate) fn provider(source: impl Into<BoxError>) -> Error {
    Error::ProviderError {
        source: source.into(),
    }
}

impl From<openssl::error::ErrorStack> for Error {
    fn from(err: openssl::error::ErrorStack) -> Self {
        provider(err)
    }
}

impl From<ring::error::Unspecified> for Error {
    fn from(err: ring::error::Unspecified) -> Self {
        provider(err.to_string())
    }
}

impl From<ring::error::KeyRejected> for Error {
    fn from(err: ring::error::KeyRejected) -> Self {
        provider(err.to_string())
    }
}
