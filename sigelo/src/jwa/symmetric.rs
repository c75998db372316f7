//! Octet-sequence (`kty: "oct"`) key material
//!
//! A single symmetric secret backs several roles: HMAC signing keys,
//! direct content encryption keys, AES key-wrapping keys, and PBES2
//! passwords. Which roles a particular key may play is governed by the
//! `use`/`key_ops` parameters on the enclosing JWK.

use std::fmt;

use serde::{Deserialize, Serialize};
use sigelo_base64::Base64Url;
use zeroize::Zeroize;

use crate::{error, jwa::hmac, jws, util, Error};

/// A symmetric secret
///
/// The secret is zeroized when the value is dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Symmetric {
    #[serde(rename = "k")]
    secret: Base64Url,
}

impl fmt::Debug for Symmetric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Symmetric { secret }")
    }
}

impl Drop for Symmetric {
    fn drop(&mut self) {
        self.secret.as_mut_slice().zeroize();
    }
}

impl Symmetric {
    /// A symmetric key over the provided secret
    pub fn new(secret: impl Into<Base64Url>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Generates a fresh secret of `len` bytes
    ///
    /// # Errors
    ///
    /// Fails if the system random number generator fails.
    pub fn generate(len: usize) -> Result<Self, Error> {
        Ok(Self {
            secret: Base64Url::from_raw(util::rand_bytes(len)?),
        })
    }

    /// The secret's length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.secret.as_slice().len()
    }

    /// Whether the secret is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secret.as_slice().is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        self.secret.as_slice()
    }
}

impl jws::Signer for Symmetric {
    type Algorithm = hmac::SigningAlgorithm;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        self.len() >= alg.min_key_size()
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        if self.len() < alg.min_key_size() {
            return Err(error::invalid_key_length());
        }

        Ok(alg.digest(self.as_slice(), data))
    }
}

impl jws::Verifier for Symmetric {
    type Algorithm = hmac::SigningAlgorithm;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        self.len() >= alg.min_key_size()
    }

    fn verify(&self, alg: Self::Algorithm, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        if self.len() < alg.min_key_size() {
            return Err(error::invalid_key_length());
        }
        if signature.len() != alg.signature_size() {
            return Err(error::signature_invalid());
        }

        let expected = alg.digest(self.as_slice(), data);
        if util::constant_time_eq(&expected, signature) {
            Ok(())
        } else {
            Err(error::signature_invalid())
        }
    }
}
