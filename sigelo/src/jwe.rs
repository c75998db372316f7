//! The JSON Web Encryption (JWE) engine
//!
//! The specifications for this standard can be found in [RFC7516][].
//!
//! A compact JWE is five base64url segments joined by dots: protected
//! header, encrypted key, initialization vector, ciphertext, and
//! authentication tag. The pipeline runs in two stages: key management
//! (strategy selected by `alg`, producing the CEK and the encrypted key
//! segment) and content encryption (selected by `enc`, producing the
//! ciphertext and tag with the encoded protected header as AAD).
//!
//! [RFC7516]: https://tools.ietf.org/html/rfc7516

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sigelo_base64::Base64Url;

use crate::{
    error, header,
    jwa::{self, ec, Usage},
    jwk::KeyId,
    Config, Error, Jwk,
};

pub(crate) mod alg;
pub(crate) mod enc;
pub(crate) mod zip;

pub use alg::Algorithm;
pub use enc::Encryption;
pub use zip::CompressionAlgorithm;

/// The ephemeral public key carried in the `epk` header parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct EphemeralKey {
    kty: EphemeralKeyType,

    #[serde(flatten)]
    key: ec::PublicKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum EphemeralKeyType {
    #[serde(rename = "EC")]
    EllipticCurve,
}

impl EphemeralKey {
    pub(crate) fn new(key: ec::PublicKey) -> Self {
        Self {
            kty: EphemeralKeyType::EllipticCurve,
            key,
        }
    }

    pub(crate) fn public_key(&self) -> &ec::PublicKey {
        &self.key
    }
}

/// The protected header of a JWE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Header {
    alg: Algorithm,
    enc: Encryption,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip: Option<CompressionAlgorithm>,

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

    #[serde(default, skip_serializing_if = "Option::is_none")]
    epk: Option<EphemeralKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    apu: Option<Base64Url>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    apv: Option<Base64Url>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    p2s: Option<Base64Url>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    p2c: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    iv: Option<Base64Url>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<Base64Url>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Header {
    /// A header for the given key management and content encryption pair
    pub fn new(alg: Algorithm, enc: Encryption) -> Self {
        Self {
            alg,
            enc,
            zip: None,
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
            epk: None,
            apu: None,
            apv: None,
            p2s: None,
            p2c: None,
            iv: None,
            tag: None,
            extra: Map::new(),
        }
    }

    /// The key management algorithm
    #[must_use]
    pub fn alg(&self) -> Algorithm {
        self.alg
    }

    /// The content encryption method
    #[must_use]
    pub fn enc(&self) -> Encryption {
        self.enc
    }

    /// The compression algorithm, when one applies
    #[must_use]
    pub fn zip(&self) -> Option<CompressionAlgorithm> {
        self.zip
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

    /// The ephemeral public key of an ECDH exchange
    #[must_use]
    pub fn epk(&self) -> Option<&EphemeralKey> {
        self.epk.as_ref()
    }

    /// The agreement PartyUInfo
    #[must_use]
    pub fn apu(&self) -> Option<&[u8]> {
        self.apu.as_deref().map(|b| b.as_slice())
    }

    /// The agreement PartyVInfo
    #[must_use]
    pub fn apv(&self) -> Option<&[u8]> {
        self.apv.as_deref().map(|b| b.as_slice())
    }

    /// The PBES2 salt input
    #[must_use]
    pub fn p2s(&self) -> Option<&[u8]> {
        self.p2s.as_deref().map(|b| b.as_slice())
    }

    /// The PBES2 iteration count
    #[must_use]
    pub fn p2c(&self) -> Option<u32> {
        self.p2c
    }

    /// The key-wrapping initialization vector (GCM key wrapping)
    #[must_use]
    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref().map(|b| b.as_slice())
    }

    /// The key-wrapping authentication tag (GCM key wrapping)
    #[must_use]
    pub fn tag(&self) -> Option<&[u8]> {
        self.tag.as_deref().map(|b| b.as_slice())
    }

    /// Any additional header parameter by name
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Compresses the payload before encryption
    pub fn with_zip(mut self, zip: CompressionAlgorithm) -> Self {
        self.zip = Some(zip);
        self
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

    /// Sets the agreement PartyUInfo
    pub fn with_apu(mut self, apu: impl Into<Vec<u8>>) -> Self {
        self.apu = Some(Base64Url::from_raw(apu.into()));
        self
    }

    /// Sets the agreement PartyVInfo
    pub fn with_apv(mut self, apv: impl Into<Vec<u8>>) -> Self {
        self.apv = Some(Base64Url::from_raw(apv.into()));
        self
    }

    /// Chooses the PBES2 salt input
    pub fn with_p2s(mut self, p2s: impl Into<Vec<u8>>) -> Self {
        self.p2s = Some(Base64Url::from_raw(p2s.into()));
        self
    }

    /// Chooses the PBES2 iteration count
    pub fn with_p2c(mut self, p2c: u32) -> Self {
        self.p2c = Some(p2c);
        self
    }

    /// Adds an additional header parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub(crate) fn set_epk(&mut self, epk: EphemeralKey) {
        self.epk = Some(epk);
    }

    pub(crate) fn set_iv(&mut self, iv: Base64Url) {
        self.iv = Some(iv);
    }

    pub(crate) fn set_tag(&mut self, tag: Base64Url) {
        self.tag = Some(tag);
    }

    pub(crate) fn set_p2s(&mut self, p2s: Base64Url) {
        self.p2s = Some(p2s);
    }

    pub(crate) fn set_p2c(&mut self, p2c: u32) {
        self.p2c = Some(p2c);
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

/// Encrypts the payload into a compact JWE under the given key
///
/// When the header does not name a key ID but the key carries one, the
/// key's ID is stamped into the emitted header.
///
/// # Errors
///
/// Returns an error when the key is incompatible with the header's
/// algorithms, a policy forbids them, or the provider fails.
pub fn serialize_compact(
    payload: &[u8],
    header: &Header,
    key: &Jwk,
    config: &Config,
) -> Result<String, Error> {
    use std::fmt::Write;

    let mut header = header.clone();
    header.set_key_id_if_absent(key.key_id());

    let alg = header.alg();
    let enc = header.enc();

    key.check_usage(Usage::Encryption)?;
    key.check_algorithm(jwa::Algorithm::KeyManagement(alg))?;

    let (cek, encrypted_key) = alg::strategy(alg)
        .wrap(alg, key, enc, &mut header, config)?
        .into_parts();

    let plaintext;
    let plaintext = match header.zip() {
        Some(CompressionAlgorithm::Deflate) => {
            plaintext = zip::compress(payload)?;
            &plaintext[..]
        }
        None => payload,
    };

    let protected =
        Base64Url::from_raw(serde_json::to_vec(&header).map_err(error::malformed_with)?)
            .to_string();

    let iv = crate::util::rand_bytes(enc.iv_len())?;
    let (ciphertext, tag) = enc.encrypt(&cek, &iv, plaintext, protected.as_bytes())?;

    let mut token = protected;
    write!(
        token,
        ".{}.{}.{}.{}",
        Base64Url::from_raw(encrypted_key),
        Base64Url::from_raw(iv),
        Base64Url::from_raw(ciphertext),
        Base64Url::from_raw(tag),
    )
    .expect("writes to strings never fail");

    Ok(token)
}

/// Decrypts a compact JWE and returns its payload and header
///
/// # Errors
///
/// Input-validation failures are reported precisely; every failure
/// inside key unwrapping or authenticated decryption collapses to
/// [`Error::DecryptionFailed`].
pub fn deserialize_compact(
    token: &str,
    key: &Jwk,
    config: &Config,
) -> Result<(Vec<u8>, Header), Error> {
    let mut segments = token.split('.');
    let (h_str, k_str, i_str, c_str, t_str) = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(h), Some(k), Some(i), Some(c), Some(t), None) => (h, k, i, c, t),
        _ => return Err(error::malformed()),
    };

    let (value, alg) = header::decode_protected(h_str)?;
    let alg = match alg {
        jwa::Algorithm::KeyManagement(alg) => alg,
        _ => return Err(error::malformed()),
    };

    let enc_name = value
        .get("enc")
        .and_then(Value::as_str)
        .ok_or_else(error::malformed)?;
    let enc =
        Encryption::from_name(enc_name).ok_or_else(|| error::unsupported_encryption(enc_name))?;

    let parsed: Header = serde_json::from_value(value).map_err(error::malformed_with)?;
    parsed.check_crit()?;

    if alg == Algorithm::Rsa1_5 && !config.rsa1_5_allowed() {
        return Err(error::unsupported_algorithm(alg.name()));
    }

    key.check_usage(Usage::Encryption)?;
    key.check_algorithm(jwa::Algorithm::KeyManagement(alg))?;

    let encrypted_key = Base64Url::from_encoded(k_str).map_err(error::malformed_with)?;
    let iv = Base64Url::from_encoded(i_str).map_err(error::malformed_with)?;
    let ciphertext = Base64Url::from_encoded(c_str).map_err(error::malformed_with)?;
    let tag = Base64Url::from_encoded(t_str).map_err(error::malformed_with)?;

    if iv.as_slice().len() != enc.iv_len() || tag.as_slice().len() != enc.tag_len() {
        return Err(error::malformed());
    }

    let cek = alg::strategy(alg).unwrap_cek(
        alg,
        key,
        enc,
        &parsed,
        encrypted_key.as_slice(),
        config,
    )?;

    let plaintext = enc.decrypt(
        &cek,
        iv.as_slice(),
        ciphertext.as_slice(),
        tag.as_slice(),
        h_str.as_bytes(),
    )?;

    let plaintext = match parsed.zip() {
        Some(CompressionAlgorithm::Deflate) => {
            zip::decompress(&plaintext, config.max_decompressed_size())?
        }
        None => plaintext,
    };

    Ok((plaintext, parsed))
}
