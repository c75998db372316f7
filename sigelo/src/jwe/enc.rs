//! JWE content encryption methods
//!
//! The CBC-HMAC composites split the CEK into a MAC half and an
//! encryption half; the GCM methods use the whole CEK as the AEAD key.
//! In both families the additional authenticated data is the ASCII of
//! the base64url-encoded protected header exactly as it appears on the
//! wire.

use std::fmt;

use openssl::symm::Cipher;
use serde::{Deserialize, Serialize};

use crate::{error, jwa::hmac, Error};

pub(crate) mod cbc_hmac;
pub(crate) mod gcm;

/// JWE content encryption methods
///
/// This list may be expanded in the future.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Encryption {
    /// AES-128-CBC with HMAC-SHA-256
    #[serde(rename = "A128CBC-HS256")]
    A128CbcHs256,

    /// AES-192-CBC with HMAC-SHA-384
    #[serde(rename = "A192CBC-HS384")]
    A192CbcHs384,

    /// AES-256-CBC with HMAC-SHA-512
    #[serde(rename = "A256CBC-HS512")]
    A256CbcHs512,

    /// AES-128-GCM
    #[serde(rename = "A128GCM")]
    A128Gcm,

    /// AES-192-GCM
    #[serde(rename = "A192GCM")]
    A192Gcm,

    /// AES-256-GCM
    #[serde(rename = "A256GCM")]
    A256Gcm,
}

impl Encryption {
    /// The CEK width in bytes
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::A128CbcHs256 => 32,
            Self::A192CbcHs384 => 48,
            Self::A256CbcHs512 => 64,
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A256Gcm => 32,
        }
    }

    /// The initialization vector width in bytes
    #[must_use]
    pub const fn iv_len(self) -> usize {
        match self {
            Self::A128CbcHs256 | Self::A192CbcHs384 | Self::A256CbcHs512 => 16,
            Self::A128Gcm | Self::A192Gcm | Self::A256Gcm => 12,
        }
    }

    /// The authentication tag width in bytes
    #[must_use]
    pub const fn tag_len(self) -> usize {
        match self {
            Self::A128CbcHs256 => 16,
            Self::A192CbcHs384 => 24,
            Self::A256CbcHs512 => 32,
            Self::A128Gcm | Self::A192Gcm | Self::A256Gcm => 16,
        }
    }

    /// The registered name of this encryption method
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::A128CbcHs256 => "A128CBC-HS256",
            Self::A192CbcHs384 => "A192CBC-HS384",
            Self::A256CbcHs512 => "A256CBC-HS512",
            Self::A128Gcm => "A128GCM",
            Self::A192Gcm => "A192GCM",
            Self::A256Gcm => "A256GCM",
        }
    }

    /// Resolves a registered content encryption name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let enc = match name {
            "A128CBC-HS256" => Self::A128CbcHs256,
            "A192CBC-HS384" => Self::A192CbcHs384,
            "A256CBC-HS512" => Self::A256CbcHs512,
            "A128GCM" => Self::A128Gcm,
            "A192GCM" => Self::A192Gcm,
            "A256GCM" => Self::A256Gcm,
            _ => return None,
        };
        Some(enc)
    }

    fn cipher(self) -> Cipher {
        match self {
            Self::A128CbcHs256 => Cipher::aes_128_cbc(),
            Self::A192CbcHs384 => Cipher::aes_192_cbc(),
            Self::A256CbcHs512 => Cipher::aes_256_cbc(),
            Self::A128Gcm => Cipher::aes_128_gcm(),
            Self::A192Gcm => Cipher::aes_192_gcm(),
            Self::A256Gcm => Cipher::aes_256_gcm(),
        }
    }

    fn mac(self) -> Option<hmac::SigningAlgorithm> {
        match self {
            Self::A128CbcHs256 => Some(hmac::SigningAlgorithm::HS256),
            Self::A192CbcHs384 => Some(hmac::SigningAlgorithm::HS384),
            Self::A256CbcHs512 => Some(hmac::SigningAlgorithm::HS512),
            _ => None,
        }
    }

    /// Encrypts the plaintext, returning the ciphertext and tag
    pub(crate) fn encrypt(
        self,
        cek: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), Error> {
        if cek.len() != self.key_len() {
            return Err(error::invalid_key_length());
        }

        match self.mac() {
            Some(mac) => cbc_hmac::encrypt(self.cipher(), mac, cek, iv, plaintext, aad),
            None => gcm::encrypt(self.cipher(), cek, iv, plaintext, aad),
        }
    }

    /// Verifies the tag and decrypts the ciphertext
    ///
    /// Every failure, including a CEK of the wrong width, reports as
    /// [`Error::DecryptionFailed`].
    pub(crate) fn decrypt(
        self,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, Error> {
        if cek.len() != self.key_len() {
            return Err(error::decryption_failed());
        }

        match self.mac() {
            Some(mac) => cbc_hmac::decrypt(self.cipher(), mac, cek, iv, ciphertext, tag, aad),
            None => gcm::decrypt(self.cipher(), cek, iv, ciphertext, tag, aad),
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
