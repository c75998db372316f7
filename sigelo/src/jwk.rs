//! Implementations of the JSON Web Keys (JWK) standard
//!
//! The specifications for JSON Web Keys can be found in [RFC7517][].
//!
//! A [`Jwk`] binds key material (`kty` of `oct`, `RSA`, `EC`, or `OKP`)
//! to its intended `use`, its permitted `key_ops`, an optional pinned
//! `alg`, and an optional `kid`. Every engine entry point consumes keys
//! through this type so the capability checks run in one place.
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::{
    error,
    jwa::{self, KeyOperation, Usage},
    jws::{self, Signer, Verifier},
    Error,
};

/// An identifier for a JWK
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct KeyId(String);

impl KeyId {
    /// Wraps a key identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for KeyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An identified JSON Web Key
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "JwkDto")]
#[must_use]
pub struct Jwk {
    key_id: Option<KeyId>,
    usage: Option<Usage>,
    operations: Option<Vec<KeyOperation>>,
    algorithm: Option<jwa::Algorithm>,
    key: Key,
}

impl Jwk {
    /// The key ID
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyId> {
        self.key_id.as_ref()
    }

    /// The intended usage of the key
    #[must_use]
    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// The operations the key may perform
    #[must_use]
    pub fn operations(&self) -> Option<&[KeyOperation]> {
        self.operations.as_deref()
    }

    /// The algorithm this key is pinned to
    #[must_use]
    pub fn algorithm(&self) -> Option<jwa::Algorithm> {
        self.algorithm
    }

    /// Whether the key is compatible with the given algorithm
    #[must_use]
    pub fn is_compatible(&self, alg: jwa::Algorithm) -> bool {
        match alg {
            jwa::Algorithm::Signing(alg) => self.key.can_verify(alg) || self.key.can_sign(alg),
            jwa::Algorithm::KeyManagement(alg) => self.key.compatible_with_key_management(alg),
            jwa::Algorithm::None => false,
        }
    }

    /// Sets the key ID
    pub fn with_key_id(self, kid: impl Into<KeyId>) -> Self {
        Self {
            key_id: Some(kid.into()),
            ..self
        }
    }

    /// Sets the key's usage
    pub fn with_usage(self, usage: Usage) -> Self {
        Self {
            usage: Some(usage),
            ..self
        }
    }

    /// Restricts the key to the given operations
    pub fn with_operations(self, operations: impl Into<Vec<KeyOperation>>) -> Self {
        Self {
            operations: Some(operations.into()),
            ..self
        }
    }

    /// Sets the algorithm and usage consistent with that algorithm
    pub fn with_algorithm(self, alg: impl Into<jwa::Algorithm>) -> Self {
        let alg = alg.into();
        Self {
            algorithm: Some(alg),
            usage: Some(alg.to_usage()),
            ..self
        }
    }

    /// Strips any private key components
    pub fn public_only(self) -> Self {
        Self {
            key: self.key.public_only(),
            ..self
        }
    }

    /// Whether the key's `key_ops` vector permits the operation
    ///
    /// A key without `key_ops` permits everything its `use` allows.
    #[must_use]
    pub fn allows(&self, op: KeyOperation) -> bool {
        match &self.operations {
            Some(ops) => ops.contains(&op),
            None => true,
        }
    }

    pub(crate) fn require_operation(&self, op: KeyOperation) -> Result<(), Error> {
        if self.allows(op) {
            Ok(())
        } else {
            Err(error::key_type_mismatch())
        }
    }

    pub(crate) fn require_any_operation(&self, ops: &[KeyOperation]) -> Result<(), Error> {
        if ops.iter().any(|&op| self.allows(op)) {
            Ok(())
        } else {
            Err(error::key_type_mismatch())
        }
    }

    pub(crate) fn check_usage(&self, expected: Usage) -> Result<(), Error> {
        match self.usage {
            Some(u) if u != expected => Err(error::key_type_mismatch()),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_algorithm(&self, alg: jwa::Algorithm) -> Result<(), Error> {
        match self.algorithm {
            Some(key_alg) if key_alg != alg => Err(error::key_type_mismatch()),
            _ => Ok(()),
        }
    }

    /// The secret length in bytes for `oct` keys
    pub(crate) fn symmetric_len(&self) -> Option<usize> {
        match &self.key {
            Key::Symmetric(k) => Some(k.len()),
            _ => None,
        }
    }

    /// The exact signature width this key produces under `alg`, when the
    /// key material determines one
    pub(crate) fn expected_signature_len(&self, alg: jws::Algorithm) -> Option<usize> {
        match (alg, &self.key) {
            (jws::Algorithm::Hmac(a), _) => Some(a.signature_size()),
            (jws::Algorithm::EllipticCurve(a), _) => Some(a.signature_size()),
            (jws::Algorithm::Okp(a), _) => Some(a.signature_size()),
            (jws::Algorithm::Rsa(_), Key::Rsa(rsa)) => Some(rsa.public_key().modulus_len()),
            (jws::Algorithm::Rsa(_), _) => None,
        }
    }

    pub(crate) fn as_symmetric(&self) -> Result<&jwa::Symmetric, Error> {
        match &self.key {
            Key::Symmetric(k) => Ok(k),
            _ => Err(error::key_type_mismatch()),
        }
    }

    pub(crate) fn as_rsa(&self) -> Result<&jwa::Rsa, Error> {
        match &self.key {
            Key::Rsa(k) => Ok(k),
            _ => Err(error::key_type_mismatch()),
        }
    }

    pub(crate) fn as_elliptic_curve(&self) -> Result<&jwa::EllipticCurve, Error> {
        match &self.key {
            Key::EllipticCurve(k) => Ok(k),
            _ => Err(error::key_type_mismatch()),
        }
    }
}

impl From<jwa::Symmetric> for Jwk {
    fn from(key: jwa::Symmetric) -> Self {
        Self::from(Key::Symmetric(key))
    }
}

impl From<jwa::Rsa> for Jwk {
    fn from(key: jwa::Rsa) -> Self {
        Self::from(Key::Rsa(key))
    }
}

impl From<jwa::EllipticCurve> for Jwk {
    fn from(key: jwa::EllipticCurve) -> Self {
        Self::from(Key::EllipticCurve(key))
    }
}

impl From<jwa::Okp> for Jwk {
    fn from(key: jwa::Okp) -> Self {
        Self::from(Key::Okp(key))
    }
}

impl From<Key> for Jwk {
    fn from(key: Key) -> Self {
        Self {
            key_id: None,
            usage: None,
            operations: None,
            algorithm: None,
            key,
        }
    }
}

impl Verifier for Jwk {
    type Algorithm = jwa::Algorithm;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        match alg {
            jwa::Algorithm::Signing(alg) => self.key.can_verify(alg),
            _ => false,
        }
    }

    fn verify(&self, alg: Self::Algorithm, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        self.check_usage(Usage::Signing)?;
        self.require_operation(KeyOperation::Verify)?;
        self.check_algorithm(alg)?;

        match alg {
            jwa::Algorithm::Signing(alg) => self.key.verify(alg, data, signature),
            _ => Err(error::key_type_mismatch()),
        }
    }
}

impl Signer for Jwk {
    type Algorithm = jwa::Algorithm;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        match alg {
            jwa::Algorithm::Signing(alg) => self.key.can_sign(alg),
            _ => false,
        }
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        self.check_usage(Usage::Signing)?;
        self.require_operation(KeyOperation::Sign)?;
        self.check_algorithm(alg)?;

        match alg {
            jwa::Algorithm::Signing(alg) => self.key.sign(alg, data),
            _ => Err(error::key_type_mismatch()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct JwkDto {
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    key_id: Option<KeyId>,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    usage: Option<Usage>,

    #[serde(rename = "key_ops", default, skip_serializing_if = "Option::is_none")]
    operations: Option<Vec<KeyOperation>>,

    #[serde(rename = "alg", default, skip_serializing_if = "Option::is_none")]
    algorithm: Option<jwa::Algorithm>,

    #[serde(flatten)]
    key: Key,
}

impl TryFrom<JwkDto> for Jwk {
    type Error = Error;

    fn try_from(dto: JwkDto) -> Result<Self, Self::Error> {
        if let Some(alg) = dto.algorithm {
            let jwk = Jwk {
                key_id: None,
                usage: None,
                operations: None,
                algorithm: None,
                key: dto.key,
            };
            if !jwk.is_compatible(alg) {
                return Err(error::key_type_mismatch());
            }
            return Ok(Jwk {
                key_id: dto.key_id,
                usage: dto.usage,
                operations: dto.operations,
                algorithm: Some(alg),
                ..jwk
            });
        }

        Ok(Self {
            key_id: dto.key_id,
            usage: dto.usage,
            operations: dto.operations,
            algorithm: dto.algorithm,
            key: dto.key,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct JwkDtoRef<'a> {
    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    key_id: Option<&'a KeyId>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    usage: Option<Usage>,

    #[serde(rename = "key_ops", skip_serializing_if = "Option::is_none")]
    operations: Option<&'a [KeyOperation]>,

    #[serde(rename = "alg", skip_serializing_if = "Option::is_none")]
    algorithm: Option<jwa::Algorithm>,

    #[serde(flatten)]
    key: &'a Key,
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let dto = JwkDtoRef {
            key_id: self.key_id(),
            usage: self.usage(),
            operations: self.operations(),
            algorithm: self.algorithm(),
            key: &self.key,
        };

        dto.serialize(serializer)
    }
}

/// The key material behind a JWK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kty")]
enum Key {
    /// RSA
    #[serde(rename = "RSA")]
    Rsa(jwa::Rsa),

    /// Elliptic curve cryptography
    #[serde(rename = "EC")]
    EllipticCurve(jwa::EllipticCurve),

    /// Octet sequence (symmetric)
    #[serde(rename = "oct")]
    Symmetric(jwa::Symmetric),

    /// Octet key pair
    #[serde(rename = "OKP")]
    Okp(jwa::Okp),
}

impl Key {
    fn public_only(self) -> Self {
        match self {
            Self::Rsa(k) => Self::Rsa(k.public_only()),
            Self::EllipticCurve(k) => Self::EllipticCurve(k.public_only()),
            Self::Okp(k) => Self::Okp(k.public_only()),
            Self::Symmetric(_) => self,
        }
    }

    fn compatible_with_key_management(&self, alg: crate::jwe::Algorithm) -> bool {
        use crate::jwe::Algorithm as A;
        match alg {
            A::Dir
            | A::A128Kw
            | A::A192Kw
            | A::A256Kw
            | A::A128GcmKw
            | A::A192GcmKw
            | A::A256GcmKw
            | A::Pbes2Hs256A128Kw
            | A::Pbes2Hs384A192Kw
            | A::Pbes2Hs512A256Kw => matches!(self, Self::Symmetric(_)),
            A::Rsa1_5 | A::RsaOaep | A::RsaOaep256 => matches!(self, Self::Rsa(_)),
            A::EcdhEs | A::EcdhEsA128Kw | A::EcdhEsA192Kw | A::EcdhEsA256Kw => {
                matches!(self, Self::EllipticCurve(_))
            }
        }
    }
}

impl Verifier for Key {
    type Algorithm = jws::Algorithm;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        match (self, alg) {
            (Self::Symmetric(k), jws::Algorithm::Hmac(alg)) => k.can_verify(alg),
            (Self::Rsa(k), jws::Algorithm::Rsa(alg)) => k.can_verify(alg),
            (Self::EllipticCurve(k), jws::Algorithm::EllipticCurve(alg)) => k.can_verify(alg),
            (Self::Okp(k), jws::Algorithm::Okp(alg)) => k.can_verify(alg),
            _ => false,
        }
    }

    fn verify(&self, alg: Self::Algorithm, data: &[u8], signature: &[u8]) -> Result<(), Error> {

        match self {
            Self::Symmetric(k) => k.verify(alg.try_into()?, data, signature),
            Self::Rsa(k) => k.verify(alg.try_into()?, data, signature),
            Self::EllipticCurve(k) => k.verify(alg.try_into()?, data, signature),
            Self::Okp(k) => k.verify(alg.try_into()?, data, signature),
        }
    }
}

impl Signer for Key {
    type Algorithm = jws::Algorithm;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        match (self, alg) {
            (Self::Symmetric(k), jws::Algorithm::Hmac(alg)) => k.can_sign(alg),
            (Self::Rsa(k), jws::Algorithm::Rsa(alg)) => k.can_sign(alg),
            (Self::EllipticCurve(k), jws::Algorithm::EllipticCurve(alg)) => k.can_sign(alg),
            (Self::Okp(k), jws::Algorithm::Okp(alg)) => k.can_sign(alg),
            _ => false,
        }
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Error> {

        match self {
            Self::Symmetric(k) => k.sign(alg.try_into()?, data),
            Self::Rsa(k) => k.sign(alg.try_into()?, data),
            Self::EllipticCurve(k) => k.sign(alg.try_into()?, data),
            Self::Okp(k) => k.sign(alg.try_into()?, data),
        }
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::test;

    #[test]
    fn deserializes_oct_key() -> Result<()> {
        let key: Jwk = serde_json::from_str(test::hmac::RFC7515_A1_JWK)?;
        assert!(key.algorithm().is_none());
        assert!(key.as_symmetric().is_ok());
        Ok(())
    }

    #[test]
    fn deserializes_rsa_private_key() -> Result<()> {
        let key: Jwk = serde_json::from_str(test::rsa::RFC7515_A2_JWK)?;
        assert!(key.can_sign(jwa::Algorithm::RS256));
        assert!(key.can_verify(jwa::Algorithm::PS384));
        Ok(())
    }

    #[test]
    fn deserializes_ec_private_key() -> Result<()> {
        let key: Jwk = serde_json::from_str(test::ec::RFC7515_A3_JWK)?;
        assert!(key.can_sign(jwa::Algorithm::ES256));
        assert!(!key.can_sign(jwa::Algorithm::ES384));
        Ok(())
    }

    #[test]
    fn round_trips_through_serde() -> Result<()> {
        let key = Jwk::from(jwa::EllipticCurve::generate(jwa::ec::Curve::P256)?)
            .with_key_id("test-key")
            .with_algorithm(jwa::Algorithm::ES256);
        let json = serde_json::to_string(&key)?;
        let back: Jwk = serde_json::from_str(&json)?;
        assert_eq!(back, key);
        Ok(())
    }

    #[test]
    fn pinned_algorithm_must_match_key_type() {
        let result = serde_json::from_str::<Jwk>(
            r#"{"kty":"oct","k":"AAECAwQFBgcICQoLDA0ODw","alg":"ES256"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn usage_mismatch_is_rejected() -> Result<()> {
        let key = Jwk::from(jwa::Symmetric::generate(32)?).with_usage(Usage::Encryption);
        let err = key.sign(jwa::Algorithm::HS256, b"data").unwrap_err();
        assert!(matches!(err, Error::KeyTypeMismatch));
        Ok(())
    }

    #[test]
    fn key_ops_vector_is_enforced() -> Result<()> {
        let key = Jwk::from(jwa::Symmetric::generate(32)?)
            .with_operations(vec![KeyOperation::Verify]);
        let err = key.sign(jwa::Algorithm::HS256, b"data").unwrap_err();
        assert!(matches!(err, Error::KeyTypeMismatch));

        let signer = Jwk::from(jwa::Symmetric::generate(32)?);
        let sig = signer.sign(jwa::Algorithm::HS256, b"data")?;
        assert!(signer
            .with_operations(vec![KeyOperation::Sign])
            .verify(jwa::Algorithm::HS256, b"data", &sig)
            .is_err());
        Ok(())
    }

    #[test]
    fn pinned_algorithm_rejects_other_algorithms() -> Result<()> {
        let key = Jwk::from(jwa::Symmetric::generate(64)?).with_algorithm(jwa::Algorithm::HS256);
        assert!(key.sign(jwa::Algorithm::HS256, b"data").is_ok());
        let err = key.sign(jwa::Algorithm::HS512, b"data").unwrap_err();
        assert!(matches!(err, Error::KeyTypeMismatch));
        Ok(())
    }
}
