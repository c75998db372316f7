//! Octet key pair (`kty: "OKP"`) implementations for EdDSA
//!
//! Ed25519 per [RFC8037]. The private key is the 32-byte seed carried in
//! the JWK `d` parameter.
//!
//! [RFC8037]: https://tools.ietf.org/html/rfc8037

use std::fmt;

use ring::signature::KeyPair;
use serde::{Deserialize, Serialize};
use sigelo_base64::Base64Url;

use crate::{error, jws, Error};

/// An Edwards-curve octet key pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OkpDto", into = "OkpDto")]
#[must_use]
pub struct Okp {
    curve: Curve,
    public: Base64Url,
    seed: Option<Base64Url>,
}

/// Edwards curves usable for signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Curve {
    /// Ed25519
    Ed25519,
}

/// Edwards-curve signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SigningAlgorithm {
    /// EdDSA signature algorithms
    #[serde(rename = "EdDSA")]
    EdDsa,
}

impl SigningAlgorithm {
    /// The size in bytes of an Ed25519 signature
    #[must_use]
    pub const fn signature_size(self) -> usize {
        64
    }

    pub(crate) fn name(self) -> &'static str {
        "EdDSA"
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "EdDSA" => Some(Self::EdDsa),
            _ => None,
        }
    }
}

impl Okp {
    /// Generates a fresh Ed25519 key pair
    ///
    /// # Errors
    ///
    /// Unable to generate a private key.
    pub fn generate() -> Result<Self, Error> {
        let seed = crate::util::rand_bytes(32)?;
        let pair = ring::signature::Ed25519KeyPair::from_seed_unchecked(&seed)
            .map_err(|e| error::provider(e.to_string()))?;
        let public = pair.public_key().as_ref().to_vec();

        Ok(Self {
            curve: Curve::Ed25519,
            public: Base64Url::from_raw(public),
            seed: Some(Base64Url::from_raw(seed)),
        })
    }

    /// Constructs a key pair from the seed and public point
    ///
    /// # Errors
    ///
    /// The seed and public point are inconsistent or of the wrong length.
    pub fn from_seed_and_public(
        seed: impl Into<Base64Url>,
        public: impl Into<Base64Url>,
    ) -> Result<Self, Error> {
        let seed = seed.into();
        let public = public.into();
        Self::key_pair(&seed, &public)?;

        Ok(Self {
            curve: Curve::Ed25519,
            public,
            seed: Some(seed),
        })
    }

    /// Constructs a verification-only key from the public point
    pub fn from_public(public: impl Into<Base64Url>) -> Self {
        Self {
            curve: Curve::Ed25519,
            public: public.into(),
            seed: None,
        }
    }

    /// Removes the private seed, if any
    pub fn public_only(self) -> Self {
        Self { seed: None, ..self }
    }

    fn key_pair(
        seed: &Base64Url,
        public: &Base64Url,
    ) -> Result<ring::signature::Ed25519KeyPair, Error> {
        ring::signature::Ed25519KeyPair::from_seed_and_public_key(
            seed.as_slice(),
            public.as_slice(),
        )
        .map_err(|_| error::invalid_key_length())
    }
}

impl jws::Signer for Okp {
    type Algorithm = SigningAlgorithm;

    fn can_sign(&self, _alg: Self::Algorithm) -> bool {
        self.seed.is_some()
    }

    fn sign(&self, _alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        let seed = self.seed.as_ref().ok_or_else(error::key_type_mismatch)?;
        let pair = Self::key_pair(seed, &self.public)?;
        Ok(pair.sign(data).as_ref().to_vec())
    }
}

impl jws::Verifier for Okp {
    type Algorithm = SigningAlgorithm;

    fn can_verify(&self, _alg: Self::Algorithm) -> bool {
        true
    }

    fn verify(&self, alg: Self::Algorithm, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        if signature.len() != alg.signature_size() {
            return Err(error::signature_invalid());
        }

        let key = ring::signature::UnparsedPublicKey::new(
            &ring::signature::ED25519,
            self.public.as_slice(),
        );
        key.verify(data, signature)
            .map_err(|_| error::signature_invalid())
    }
}

impl From<SigningAlgorithm> for jws::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        Self::Okp(alg)
    }
}

impl TryFrom<jws::Algorithm> for SigningAlgorithm {
    type Error = Error;

    fn try_from(alg: jws::Algorithm) -> Result<Self, Self::Error> {
        match alg {
            jws::Algorithm::Okp(alg) => Ok(alg),
            _ => Err(error::key_type_mismatch()),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Okp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Okp")
            .field("curve", &self.curve)
            .field("public", &self.public)
            .field("seed", &self.seed.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TryFrom<OkpDto> for Okp {
    type Error = Error;

    fn try_from(dto: OkpDto) -> Result<Self, Self::Error> {
        match dto.seed {
            Some(seed) => Self::from_seed_and_public(seed, dto.public),
            None => Ok(Self::from_public(dto.public)),
        }
    }
}

impl From<Okp> for OkpDto {
    fn from(key: Okp) -> Self {
        Self {
            curve: key.curve,
            public: key.public,
            seed: key.seed,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct OkpDto {
    #[serde(rename = "crv")]
    curve: Curve,

    #[serde(rename = "x")]
    public: Base64Url,

    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    seed: Option<Base64Url>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jws::{Signer, Verifier};

    // RFC 8037 Appendix A.1
    const JWK: &str = r#"{
        "crv": "Ed25519",
        "d": "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A",
        "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
    }"#;

    #[test]
    fn parses_rfc8037_key() {
        let key: Okp = serde_json::from_str(JWK).unwrap();
        assert!(key.can_sign(SigningAlgorithm::EdDsa));
    }

    #[test]
    fn sign_verify_round_trip() {
        let key: Okp = serde_json::from_str(JWK).unwrap();
        let sig = key.sign(SigningAlgorithm::EdDsa, b"payload").unwrap();
        assert_eq!(sig.len(), 64);
        key.verify(SigningAlgorithm::EdDsa, b"payload", &sig)
            .unwrap();

        let mut tampered = sig;
        tampered[10] ^= 0x40;
        assert!(matches!(
            key.verify(SigningAlgorithm::EdDsa, b"payload", &tampered),
            Err(Error::SignatureInvalid)
        ));
    }

    #[test]
    fn generated_keys_interoperate() {
        let key = Okp::generate().unwrap();
        let sig = key.sign(SigningAlgorithm::EdDsa, b"data").unwrap();
        let public = key.public_only();
        public.verify(SigningAlgorithm::EdDsa, b"data", &sig).unwrap();
        assert!(!public.can_sign(SigningAlgorithm::EdDsa));
    }

    #[test]
    fn rejects_inconsistent_seed() {
        let err = Okp::from_seed_and_public(
            Base64Url::from_raw(vec![1u8; 32]),
            Base64Url::from_raw(vec![2u8; 32]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidKeyLength));
    }
}
