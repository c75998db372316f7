//! JWE key management algorithms and their strategy registry
//!
//! Each algorithm family implements [`KeyManagement`]: producing the
//! content encryption key and the encrypted-key segment on the way out,
//! and recovering the CEK on the way in. [`strategy`] is the registry
//! mapping an `alg` identifier to its capability object.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{jwa::hmac, jwe::enc::Encryption, jwe::Header, Config, Error, Jwk};

pub(crate) mod aes_gcm_kw;
pub(crate) mod aes_kw;
pub(crate) mod direct;
pub(crate) mod ecdh_es;
pub(crate) mod pbes2;
pub(crate) mod rsaes;

/// JWE key management algorithms
///
/// This list may be expanded in the future.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Algorithm {
    /// Direct use of a shared symmetric key as the CEK
    #[serde(rename = "dir")]
    Dir,

    /// RSAES-PKCS1-v1_5 (deprecated, disabled by default)
    #[serde(rename = "RSA1_5")]
    Rsa1_5,

    /// RSAES-OAEP using SHA-1
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,

    /// RSAES-OAEP using SHA-256
    #[serde(rename = "RSA-OAEP-256")]
    RsaOaep256,

    /// AES Key Wrap with a 128-bit key
    #[serde(rename = "A128KW")]
    A128Kw,

    /// AES Key Wrap with a 192-bit key
    #[serde(rename = "A192KW")]
    A192Kw,

    /// AES Key Wrap with a 256-bit key
    #[serde(rename = "A256KW")]
    A256Kw,

    /// Key wrapping with AES GCM using a 128-bit key
    #[serde(rename = "A128GCMKW")]
    A128GcmKw,

    /// Key wrapping with AES GCM using a 192-bit key
    #[serde(rename = "A192GCMKW")]
    A192GcmKw,

    /// Key wrapping with AES GCM using a 256-bit key
    #[serde(rename = "A256GCMKW")]
    A256GcmKw,

    /// ECDH-ES with the derived key used directly as the CEK
    #[serde(rename = "ECDH-ES")]
    EcdhEs,

    /// ECDH-ES with the derived key wrapping the CEK via A128KW
    #[serde(rename = "ECDH-ES+A128KW")]
    EcdhEsA128Kw,

    /// ECDH-ES with the derived key wrapping the CEK via A192KW
    #[serde(rename = "ECDH-ES+A192KW")]
    EcdhEsA192Kw,

    /// ECDH-ES with the derived key wrapping the CEK via A256KW
    #[serde(rename = "ECDH-ES+A256KW")]
    EcdhEsA256Kw,

    /// PBES2 with HMAC-SHA-256 and A128KW
    #[serde(rename = "PBES2-HS256+A128KW")]
    Pbes2Hs256A128Kw,

    /// PBES2 with HMAC-SHA-384 and A192KW
    #[serde(rename = "PBES2-HS384+A192KW")]
    Pbes2Hs384A192Kw,

    /// PBES2 with HMAC-SHA-512 and A256KW
    #[serde(rename = "PBES2-HS512+A256KW")]
    Pbes2Hs512A256Kw,
}

impl Algorithm {
    /// The registered name of this algorithm
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dir => "dir",
            Self::Rsa1_5 => "RSA1_5",
            Self::RsaOaep => "RSA-OAEP",
            Self::RsaOaep256 => "RSA-OAEP-256",
            Self::A128Kw => "A128KW",
            Self::A192Kw => "A192KW",
            Self::A256Kw => "A256KW",
            Self::A128GcmKw => "A128GCMKW",
            Self::A192GcmKw => "A192GCMKW",
            Self::A256GcmKw => "A256GCMKW",
            Self::EcdhEs => "ECDH-ES",
            Self::EcdhEsA128Kw => "ECDH-ES+A128KW",
            Self::EcdhEsA192Kw => "ECDH-ES+A192KW",
            Self::EcdhEsA256Kw => "ECDH-ES+A256KW",
            Self::Pbes2Hs256A128Kw => "PBES2-HS256+A128KW",
            Self::Pbes2Hs384A192Kw => "PBES2-HS384+A192KW",
            Self::Pbes2Hs512A256Kw => "PBES2-HS512+A256KW",
        }
    }

    /// Resolves a registered key management algorithm name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let alg = match name {
            "dir" => Self::Dir,
            "RSA1_5" => Self::Rsa1_5,
            "RSA-OAEP" => Self::RsaOaep,
            "RSA-OAEP-256" => Self::RsaOaep256,
            "A128KW" => Self::A128Kw,
            "A192KW" => Self::A192Kw,
            "A256KW" => Self::A256Kw,
            "A128GCMKW" => Self::A128GcmKw,
            "A192GCMKW" => Self::A192GcmKw,
            "A256GCMKW" => Self::A256GcmKw,
            "ECDH-ES" => Self::EcdhEs,
            "ECDH-ES+A128KW" => Self::EcdhEsA128Kw,
            "ECDH-ES+A192KW" => Self::EcdhEsA192Kw,
            "ECDH-ES+A256KW" => Self::EcdhEsA256Kw,
            "PBES2-HS256+A128KW" => Self::Pbes2Hs256A128Kw,
            "PBES2-HS384+A192KW" => Self::Pbes2Hs384A192Kw,
            "PBES2-HS512+A256KW" => Self::Pbes2Hs512A256Kw,
            _ => return None,
        };
        Some(alg)
    }

    /// The AES key width in bytes for the wrapping step, when this
    /// algorithm has one
    pub(crate) fn wrap_key_len(self) -> Option<usize> {
        match self {
            Self::A128Kw | Self::A128GcmKw | Self::EcdhEsA128Kw | Self::Pbes2Hs256A128Kw => {
                Some(16)
            }
            Self::A192Kw | Self::A192GcmKw | Self::EcdhEsA192Kw | Self::Pbes2Hs384A192Kw => {
                Some(24)
            }
            Self::A256Kw | Self::A256GcmKw | Self::EcdhEsA256Kw | Self::Pbes2Hs512A256Kw => {
                Some(32)
            }
            _ => None,
        }
    }

    /// The PBES2 pseudo-random function for this algorithm
    pub(crate) fn pbes2_prf(self) -> Option<hmac::SigningAlgorithm> {
        match self {
            Self::Pbes2Hs256A128Kw => Some(hmac::SigningAlgorithm::HS256),
            Self::Pbes2Hs384A192Kw => Some(hmac::SigningAlgorithm::HS384),
            Self::Pbes2Hs512A256Kw => Some(hmac::SigningAlgorithm::HS512),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of the key management stage on the sender side
pub(crate) enum WrapOutcome {
    /// The CEK was agreed or taken directly; the encrypted key segment
    /// is empty
    Direct(Zeroizing<Vec<u8>>),

    /// The CEK was wrapped under the recipient's key
    Wrapped {
        cek: Zeroizing<Vec<u8>>,
        encrypted_key: Vec<u8>,
    },
}

impl WrapOutcome {
    pub(crate) fn into_parts(self) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
        match self {
            Self::Direct(cek) => (cek, Vec::new()),
            Self::Wrapped { cek, encrypted_key } => (cek, encrypted_key),
        }
    }
}

/// A key management capability
///
/// One implementation covers one algorithm family; the specific
/// algorithm is passed back in so a family can vary its key widths.
pub(crate) trait KeyManagement: Sync {
    /// Produces the CEK for a new token, wrapping it under the
    /// recipient's key where the algorithm calls for it
    ///
    /// Strategies record their public parameters (`epk`, `iv`, `tag`,
    /// `p2s`, `p2c`) in the header before it is serialized.
    fn wrap(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        header: &mut Header,
        config: &Config,
    ) -> Result<WrapOutcome, Error>;

    /// Recovers the CEK from the encrypted key segment
    fn unwrap_cek(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        header: &Header,
        encrypted_key: &[u8],
        config: &Config,
    ) -> Result<Zeroizing<Vec<u8>>, Error>;
}

/// The registry mapping an algorithm to its key management capability
pub(crate) fn strategy(alg: Algorithm) -> &'static dyn KeyManagement {
    match alg {
        Algorithm::Dir => &direct::Direct,
        Algorithm::Rsa1_5 | Algorithm::RsaOaep | Algorithm::RsaOaep256 => &rsaes::RsaEs,
        Algorithm::A128Kw | Algorithm::A192Kw | Algorithm::A256Kw => &aes_kw::AesKw,
        Algorithm::A128GcmKw | Algorithm::A192GcmKw | Algorithm::A256GcmKw => {
            &aes_gcm_kw::AesGcmKw
        }
        Algorithm::EcdhEs
        | Algorithm::EcdhEsA128Kw
        | Algorithm::EcdhEsA192Kw
        | Algorithm::EcdhEsA256Kw => &ecdh_es::EcdhEs,
        Algorithm::Pbes2Hs256A128Kw
        | Algorithm::Pbes2Hs384A192Kw
        | Algorithm::Pbes2Hs512A256Kw => &pbes2::Pbes2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in [
            "dir",
            "RSA1_5",
            "RSA-OAEP",
            "RSA-OAEP-256",
            "A128KW",
            "A192KW",
            "A256KW",
            "A128GCMKW",
            "A192GCMKW",
            "A256GCMKW",
            "ECDH-ES",
            "ECDH-ES+A128KW",
            "ECDH-ES+A192KW",
            "ECDH-ES+A256KW",
            "PBES2-HS256+A128KW",
            "PBES2-HS384+A192KW",
            "PBES2-HS512+A256KW",
        ] {
            let alg = Algorithm::from_name(name).unwrap();
            assert_eq!(alg.name(), name);
            let json = serde_json::to_string(&alg).unwrap();
            assert_eq!(json, format!("\"{name}\""));
        }
        assert_eq!(Algorithm::from_name("A512KW"), None);
    }

    #[test]
    fn wrap_key_widths() {
        assert_eq!(Algorithm::A128Kw.wrap_key_len(), Some(16));
        assert_eq!(Algorithm::Pbes2Hs384A192Kw.wrap_key_len(), Some(24));
        assert_eq!(Algorithm::EcdhEsA256Kw.wrap_key_len(), Some(32));
        assert_eq!(Algorithm::Dir.wrap_key_len(), None);
        assert_eq!(Algorithm::EcdhEs.wrap_key_len(), None);
    }
}
