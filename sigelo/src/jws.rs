//! The JSON Web Signature (JWS) engine
//!
//! The specifications for this standard can be found in [RFC7515][].
//!
//! A compact JWS is three base64url segments joined by dots. The signing
//! input is the ASCII of the first two segments joined by a dot, and
//! verification always runs over the exact protected-header bytes that
//! arrived on the wire, never over a re-serialization, so signer-chosen
//! whitespace survives.
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sigelo_base64::Base64Url;

use crate::{
    error,
    header,
    jwa::{self, ec, hmac, okp, rsa},
    jwk::KeyId,
    Config, Error, Jwk,
};

/// JSON Web Signature signing algorithms
///
/// This list may be expanded in the future.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum Algorithm {
    /// HMAC symmetric
    Hmac(hmac::SigningAlgorithm),

    /// RSA public/private key pair
    Rsa(rsa::SigningAlgorithm),

    /// Elliptic curve cryptography
    EllipticCurve(ec::SigningAlgorithm),

    /// Edwards-curve octet key pair
    Okp(okp::SigningAlgorithm),
}

impl Algorithm {
    /// The HS256 signing algorithm
    pub const HS256: Algorithm = Self::Hmac(hmac::SigningAlgorithm::HS256);
    /// The HS384 signing algorithm
    pub const HS384: Algorithm = Self::Hmac(hmac::SigningAlgorithm::HS384);
    /// The HS512 signing algorithm
    pub const HS512: Algorithm = Self::Hmac(hmac::SigningAlgorithm::HS512);
    /// The RS256 signing algorithm
    pub const RS256: Algorithm = Self::Rsa(rsa::SigningAlgorithm::RS256);
    /// The RS384 signing algorithm
    pub const RS384: Algorithm = Self::Rsa(rsa::SigningAlgorithm::RS384);
    /// The RS512 signing algorithm
    pub const RS512: Algorithm = Self::Rsa(rsa::SigningAlgorithm::RS512);
    /// The PS256 signing algorithm
    pub const PS256: Algorithm = Self::Rsa(rsa::SigningAlgorithm::PS256);
    /// The PS384 signing algorithm
    pub const PS384: Algorithm = Self::Rsa(rsa::SigningAlgorithm::PS384);
    /// The PS512 signing algorithm
    pub const PS512: Algorithm = Self::Rsa(rsa::SigningAlgorithm::PS512);
    /// The ES256 signing algorithm
    pub const ES256: Algorithm = Self::EllipticCurve(ec::SigningAlgorithm::ES256);
    /// The ES384 signing algorithm
    pub const ES384: Algorithm = Self::EllipticCurve(ec::SigningAlgorithm::ES384);
    /// The ES512 signing algorithm
    pub const ES512: Algorithm = Self::EllipticCurve(ec::SigningAlgorithm::ES512);
    /// The EdDSA signing algorithm
    pub const EDDSA: Algorithm = Self::Okp(okp::SigningAlgorithm::EdDsa);

    /// The expected size of this algorithm's signatures in bytes
    ///
    /// RSA signatures are as wide as the modulus; the value here is the
    /// width for the smallest accepted modulus.
    #[must_use]
    pub fn signature_size(self) -> usize {
        match self {
            Self::Hmac(alg) => alg.signature_size(),
            Self::Rsa(alg) => alg.min_signature_size(),
            Self::EllipticCurve(alg) => alg.signature_size(),
            Self::Okp(alg) => alg.signature_size(),
        }
    }

    /// Resolves a registered signing algorithm name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        hmac::SigningAlgorithm::from_name(name)
            .map(Self::Hmac)
            .or_else(|| rsa::SigningAlgorithm::from_name(name).map(Self::Rsa))
            .or_else(|| ec::SigningAlgorithm::from_name(name).map(Self::EllipticCurve))
            .or_else(|| okp::SigningAlgorithm::from_name(name).map(Self::Okp))
    }

    /// The registered name of this algorithm
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Hmac(alg) => alg.name(),
            Self::Rsa(alg) => alg.name(),
            Self::EllipticCurve(alg) => alg.name(),
            Self::Okp(alg) => alg.name(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JWS signer
pub trait Signer {
    /// The usable signature algorithms
    type Algorithm;

    /// Whether the specific algorithm provided is compatible
    /// with this signer
    fn can_sign(&self, alg: Self::Algorithm) -> bool;

    /// Attempts to sign the data provided using the specified algorithm
    ///
    /// # Errors
    ///
    /// Returns an error when the key is incompatible with the algorithm
    /// or the provider fails.
    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Error>;
}

/// A JWS verifier
pub trait Verifier {
    /// The verifiable signature algorithms
    type Algorithm;

    /// Whether the specific algorithm provided is compatible
    /// with this verifier
    fn can_verify(&self, alg: Self::Algorithm) -> bool;

    /// Attempts to verify the data against the signature using the
    /// specified algorithm
    ///
    /// # Errors
    ///
    /// Returns an error when the signature does not match or the key is
    /// incompatible with the algorithm.
    fn verify(&self, alg: Self::Algorithm, data: &[u8], signature: &[u8]) -> Result<(), Error>;
}

/// The protected header of a JWS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Header {
    alg: Algorithm,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<KeyId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    jku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    jwk: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    x5u: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    x5c: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    x5t: Option<String>,

    #[serde(rename = "x5t#S256", default, skip_serializing_if = "Option::is_none")]
    x5t_s256: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    crit: Option<Vec<String>>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Header {
    /// A header for the given signing algorithm
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg,
            typ: None,
            cty: None,
            kid: None,
            jku: None,
            jwk: None,
            x5u: None,
            x5c: None,
            x5t: None,
            x5t_s256: None,
            crit: None,
            extra: Map::new(),
        }
    }

    /// The signing algorithm
    #[must_use]
    pub fn alg(&self) -> Algorithm {
        self.alg
    }

    /// The `typ` parameter
    #[must_use]
    pub fn token_type(&self) -> Option<&str> {
        self.typ.as_deref()
    }

    /// The `cty` parameter
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.cty.as_deref()
    }

    /// The ID of the key that protects this token
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyId> {
        self.kid.as_ref()
    }

    /// Any additional header parameter by name
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Sets the `typ` parameter
    pub fn with_token_type(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    /// Sets the `cty` parameter
    pub fn with_content_type(mut self, cty: impl Into<String>) -> Self {
        self.cty = Some(cty.into());
        self
    }

    /// Sets the key ID
    pub fn with_key_id(mut self, kid: impl Into<KeyId>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Adds an additional header parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub(crate) fn set_key_id_if_absent(&mut self, kid: Option<&KeyId>) {
        if self.kid.is_none() {
            self.kid = kid.cloned();
        }
    }

    pub(crate) fn check_crit(&self) -> Result<(), Error> {
        header::check_crit(self.crit.as_ref())
    }
}

/// Produces a compact JWS over the payload, signed with the given key
///
/// When the header does not name a key ID but the key carries one, the
/// key's ID is stamped into the emitted header.
///
/// # Errors
///
/// Returns an error when the key is incompatible with the header's
/// algorithm or the provider fails to sign.
pub fn serialize_compact(payload: &[u8], header: &Header, key: &Jwk) -> Result<String, Error> {
    use std::fmt::Write;

    let mut header = header.clone();
    header.set_key_id_if_absent(key.key_id());

    let alg = header.alg();
    let h_raw = Base64Url::from_raw(serde_json::to_vec(&header).map_err(error::malformed_with)?);
    let p_raw = Base64Url::from_raw(payload.to_vec());

    let expected_len = h_raw.encoded_len()
        + p_raw.encoded_len()
        + Base64Url::calc_encoded_len(alg.signature_size())
        + 2;

    let mut message = String::with_capacity(expected_len);
    write!(message, "{h_raw}.{p_raw}").expect("writes to strings never fail");

    let signature = Base64Url::from_raw(key.sign(jwa::Algorithm::Signing(alg), message.as_bytes())?);

    write!(message, ".{signature}").expect("writes to strings never fail");

    Ok(message)
}

/// Verifies a compact JWS and returns its payload and header
///
/// # Errors
///
/// Returns an error when the token is malformed, names an unusable
/// algorithm, or fails verification.
pub fn deserialize_compact(
    token: &str,
    key: &Jwk,
    config: &Config,
) -> Result<(Vec<u8>, Header), Error> {
    let mut segments = token.split('.');
    let (h_str, p_str, s_str) = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => return Err(error::malformed()),
    };

    let (value, alg) = header::decode_protected(h_str)?;
    let alg = match alg {
        jwa::Algorithm::Signing(alg) => alg,
        jwa::Algorithm::None => return Err(error::unsupported_algorithm("none")),
        jwa::Algorithm::KeyManagement(_) => return Err(error::malformed()),
    };

    let header: Header = serde_json::from_value(value).map_err(error::malformed_with)?;
    header.check_crit()?;

    let payload = Base64Url::from_encoded(p_str).map_err(error::malformed_with)?;
    let signature = Base64Url::from_encoded(s_str).map_err(error::malformed_with)?;

    // The length check precedes any cryptographic work.
    if let Some(expected) = key.expected_signature_len(alg) {
        if signature.as_slice().len() != expected {
            return Err(error::signature_invalid());
        }
    }

    if config.low_s_required() {
        if let Algorithm::EllipticCurve(ec_alg) = alg {
            if !ec::has_low_s(ec_alg, signature.as_slice())? {
                return Err(error::signature_invalid());
            }
        }
    }

    if let Some(len) = key.symmetric_len() {
        config.check_symmetric_key(len)?;
    }

    let message = &token[..h_str.len() + 1 + p_str.len()];
    key.verify(
        jwa::Algorithm::Signing(alg),
        message.as_bytes(),
        signature.as_slice(),
    )?;

    Ok((payload.into_inner(), header))
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::test;

    #[test]
    fn hs256_matches_canonical_example() -> Result<()> {
        // The RFC 7519 §3.1 / jwt.io example: the 19-byte secret padded
        // with zeros to 32 bytes leaves the HMAC unchanged.
        let mut secret = b"your-256-bit-secret".to_vec();
        secret.resize(32, 0);
        let key = Jwk::from(jwa::Symmetric::new(Base64Url::from_raw(secret)));

        let message = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                       eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ";
        let signature = key.sign(jwa::Algorithm::HS256, message.as_bytes())?;
        assert_eq!(
            Base64Url::from_raw(signature).to_string(),
            "SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c"
        );

        let token = format!("{message}.SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c");
        let (payload, header) = deserialize_compact(&token, &key, &Config::default())?;
        assert_eq!(header.alg(), Algorithm::HS256);
        assert_eq!(header.token_type(), Some("JWT"));
        let claims: serde_json::Value = serde_json::from_slice(&payload)?;
        assert_eq!(claims["name"], "John Doe");
        Ok(())
    }

    #[test]
    fn verifies_rfc7515_a1_with_signer_chosen_whitespace() -> Result<()> {
        // The RFC 7515 A.1 header contains a CRLF and a space; only
        // exact-byte verification accepts it.
        let key: Jwk = serde_json::from_str(test::hmac::RFC7515_A1_JWK)?;
        let (payload, _) =
            deserialize_compact(test::hmac::RFC7515_A1_TOKEN, &key, &Config::default())?;
        let claims: serde_json::Value = serde_json::from_slice(&payload)?;
        assert_eq!(claims["iss"], "joe");
        Ok(())
    }

    #[test]
    fn rs256_matches_rfc7515_a2() -> Result<()> {
        let key: Jwk = serde_json::from_str(test::rsa::RFC7515_A2_JWK)?;
        let message = "eyJhbGciOiJSUzI1NiJ9.\
                       eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFt\
                       cGxlLmNvbS9pc19yb290Ijp0cnVlfQ";
        let signature = key.sign(jwa::Algorithm::RS256, message.as_bytes())?;
        assert_eq!(
            Base64Url::from_raw(signature).to_string(),
            test::rsa::RFC7515_A2_SIGNATURE
        );

        let token = format!("{message}.{}", test::rsa::RFC7515_A2_SIGNATURE);
        let _ = deserialize_compact(&token, &key, &Config::default())?;
        Ok(())
    }

    #[test]
    fn es256_verifies_rfc7515_a3() -> Result<()> {
        let key: Jwk = serde_json::from_str(test::ec::RFC7515_A3_JWK)?;
        let _ = deserialize_compact(test::ec::RFC7515_A3_TOKEN, &key, &Config::default())?;
        Ok(())
    }

    #[test]
    fn round_trips_every_signing_algorithm() -> Result<()> {
        let payload = br#"{"sub":"sigelo"}"#;
        for (key, alg) in test::signing_keys()? {
            let header = Header::new(alg);
            let token = serialize_compact(payload, &header, &key)?;
            let (decoded, parsed) = deserialize_compact(&token, &key, &Config::default())?;
            assert_eq!(decoded.as_slice(), payload, "{alg}");
            assert_eq!(parsed.alg(), alg, "{alg}");
        }
        Ok(())
    }

    #[test]
    fn rejects_any_tampered_segment() -> Result<()> {
        let key = Jwk::from(jwa::Symmetric::generate(32)?);
        let token = serialize_compact(b"payload", &Header::new(Algorithm::HS256), &key)?;

        // Flip a payload character and a signature character.
        for index in [token.find('.').unwrap() + 1, token.len() - 1] {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            let err = deserialize_compact(&tampered, &key, &Config::default()).unwrap_err();
            assert!(matches!(err, Error::SignatureInvalid));
        }
        Ok(())
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let key = Jwk::from(jwa::Symmetric::new(Base64Url::from_raw(vec![0u8; 32])));
        for token in ["a.b", "a.b.c.d", "a.b.c.d.e"] {
            let err = deserialize_compact(token, &key, &Config::default()).unwrap_err();
            assert!(matches!(err, Error::MalformedEncoding { .. }), "{token}");
        }
    }

    #[test]
    fn rejects_alg_none() -> Result<()> {
        let key = Jwk::from(jwa::Symmetric::generate(32)?);
        let header = Base64Url::from_raw(br#"{"alg":"none"}"#.to_vec());
        let payload = Base64Url::from_raw(b"{}".to_vec());
        let token = format!("{header}.{payload}.");
        let err = deserialize_compact(&token, &key, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm { alg } if alg == "none"));
        Ok(())
    }

    #[test]
    fn rejects_unknown_critical_parameter() -> Result<()> {
        let key = Jwk::from(jwa::Symmetric::generate(32)?);
        let header = Header::new(Algorithm::HS256)
            .with_parameter("crit", serde_json::json!(["sigil"]))
            .with_parameter("sigil", serde_json::json!(true));
        let token = serialize_compact(b"data", &header, &key)?;
        let err = deserialize_compact(&token, &key, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCritical { name } if name == "sigil"));
        Ok(())
    }

    #[test]
    fn rejects_key_family_mismatch() -> Result<()> {
        let key: Jwk = serde_json::from_str(test::ec::RFC7515_A3_JWK)?;
        let err = key
            .sign(jwa::Algorithm::HS256, b"data")
            .unwrap_err();
        assert!(matches!(err, Error::KeyTypeMismatch));
        Ok(())
    }

    #[test]
    fn low_s_policy_rejects_malleated_signatures() -> Result<()> {
        use openssl::bn::{BigNum, BigNumContext};

        let key: Jwk = serde_json::from_str(test::ec::RFC7515_A3_JWK)?;
        let token = serialize_compact(b"payload", &Header::new(Algorithm::ES256), &key)?;

        // Locate the signature segment and normalize it to the *high*
        // equivalent: (r, n - s) verifies under plain ECDSA but must be
        // rejected by the low-s policy.
        let dot = token.rfind('.').unwrap();
        let sig = Base64Url::from_encoded(&token[dot + 1..])?;
        let (r, s) = sig.as_slice().split_at(32);

        let group = openssl::ec::EcGroup::from_curve_name(openssl::nid::Nid::X9_62_PRIME256V1)?;
        let mut ctx = BigNumContext::new()?;
        let mut order = BigNum::new()?;
        group.order(&mut order, &mut ctx)?;
        let mut half = BigNum::new()?;
        half.rshift1(&order)?;

        let s_num = BigNum::from_slice(s)?;
        let high = if s_num > half {
            s_num
        } else {
            let mut flipped = BigNum::new()?;
            flipped.checked_sub(&order, &s_num)?;
            flipped
        };

        let mut malleated = r.to_vec();
        malleated.extend_from_slice(&high.to_vec_padded(32)?);
        let bad_token = format!(
            "{}.{}",
            &token[..dot],
            Base64Url::from_raw(malleated)
        );

        // Plain ECDSA accepts the malleated form.
        let _ = deserialize_compact(&bad_token, &key, &Config::default())?;
        let err =
            deserialize_compact(&bad_token, &key, &Config::default().require_low_s()).unwrap_err();
        assert!(matches!(err, Error::SignatureInvalid));
        Ok(())
    }
}
