//! The JSON Web Token (JWT) facade
//!
//! The specifications for this standard can be found in [RFC7519][].
//!
//! A compact token is classified by the `alg` of its first segment:
//! `none` yields a [`PlainJwt`], a signing algorithm a [`SignedJwt`],
//! and a key-management algorithm an [`EncryptedJwt`]. The claims of a
//! signed or encrypted token are only reachable through
//! [`SignedJwt::verify`] or [`EncryptedJwt::decrypt`]; a plain token
//! releases its claims only when the policy explicitly permits
//! unsecured tokens.
//!
//! [RFC7519]: https://tools.ietf.org/html/rfc7519

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use sigelo_base64::Base64Url;

use crate::{error, header, jwa, jwe, jws, Config, Error, Jwk};

/// A JSON numeric date: seconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct NumericDate(
    /// Seconds since the Unix epoch
    pub u64,
);

impl From<u64> for NumericDate {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

/// A type representing one or more items, primarily for serialization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single item
    One(T),

    /// Zero or more items, serialized as an array
    Many(Vec<T>),
}

/// A set of zero or more audiences
///
/// A single audience serializes as a bare string, multiple audiences as
/// an array, matching the `aud` claim's wire forms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany<String>", into = "OneOrMany<String>")]
#[repr(transparent)]
#[must_use]
pub struct Audiences(Vec<String>);

impl Audiences {
    /// An empty audience set
    #[inline]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// An audience set with a single audience
    #[inline]
    pub fn single(aud: impl Into<String>) -> Self {
        Self(vec![aud.into()])
    }

    /// Indicates whether the audience set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates through the audiences in the set
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<OneOrMany<String>> for Audiences {
    #[inline]
    fn from(vals: OneOrMany<String>) -> Self {
        match vals {
            OneOrMany::One(x) => Self(vec![x]),
            OneOrMany::Many(v) => Self(v),
        }
    }
}

impl From<Audiences> for OneOrMany<String> {
    #[inline]
    fn from(mut vec: Audiences) -> Self {
        if vec.0.len() == 1 {
            Self::One(vec.0.pop().unwrap())
        } else {
            Self::Many(vec.0)
        }
    }
}

impl From<Vec<String>> for Audiences {
    #[inline]
    fn from(vals: Vec<String>) -> Self {
        Self(vals)
    }
}

/// The claims carried by a JWT
///
/// Registered claims get typed accessors; anything else is preserved
/// verbatim in an open map so a round trip loses nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ClaimsSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,

    #[serde(default, skip_serializing_if = "Audiences::is_empty")]
    aud: Audiences,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<NumericDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    nbf: Option<NumericDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<NumericDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ClaimsSet {
    /// Constructs a new, empty claims set
    pub fn new() -> Self {
        Self::default()
    }

    /// The `iss` claim
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    /// The `sub` claim
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// The `aud` claim
    pub fn audiences(&self) -> &Audiences {
        &self.aud
    }

    /// The `exp` claim
    #[must_use]
    pub fn expiration(&self) -> Option<NumericDate> {
        self.exp
    }

    /// The `nbf` claim
    #[must_use]
    pub fn not_before(&self) -> Option<NumericDate> {
        self.nbf
    }

    /// The `iat` claim
    #[must_use]
    pub fn issued_at(&self) -> Option<NumericDate> {
        self.iat
    }

    /// The `jti` claim
    #[must_use]
    pub fn jwt_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    /// Any other claim by name
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Sets the `iss` claim
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Sets the `sub` claim
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the `aud` claim
    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Audiences::single(aud);
        self
    }

    /// Sets the `aud` claim, where multiple audiences are allowed
    pub fn with_audiences(mut self, aud: impl Into<Audiences>) -> Self {
        self.aud = aud.into();
        self
    }

    /// Sets the `exp` claim
    pub fn with_expiration(mut self, time: impl Into<NumericDate>) -> Self {
        self.exp = Some(time.into());
        self
    }

    /// Sets the `nbf` claim
    pub fn with_not_before(mut self, time: impl Into<NumericDate>) -> Self {
        self.nbf = Some(time.into());
        self
    }

    /// Sets the `iat` claim
    pub fn with_issued_at(mut self, time: impl Into<NumericDate>) -> Self {
        self.iat = Some(time.into());
        self
    }

    /// Sets the `jti` claim
    pub fn with_jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Sets any other claim
    pub fn with_claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Produces a signed JWT over these claims
    ///
    /// # Errors
    ///
    /// Returns an error when the key cannot sign under the header's
    /// algorithm.
    pub fn sign(&self, header: &jws::Header, key: &Jwk) -> Result<SignedJwt, Error> {
        let payload = serde_json::to_vec(self).map_err(error::malformed_with)?;

        let mut header = header.clone();
        header.set_key_id_if_absent(key.key_id());

        let raw = jws::serialize_compact(&payload, &header, key)?;
        Ok(SignedJwt { raw, header })
    }

    /// Produces an encrypted JWT over these claims
    ///
    /// # Errors
    ///
    /// Returns an error when the key cannot encrypt under the header's
    /// algorithms.
    pub fn encrypt(
        &self,
        header: &jwe::Header,
        key: &Jwk,
        config: &Config,
    ) -> Result<EncryptedJwt, Error> {
        let payload = serde_json::to_vec(self).map_err(error::malformed_with)?;
        let raw = jwe::serialize_compact(&payload, header, key, config)?;

        // The wire header gained the strategy's parameters; keep the
        // stored copy in agreement with it.
        let parsed = raw.split('.').next().map(header::decode_protected);
        let header = match parsed {
            Some(Ok((value, _))) => {
                serde_json::from_value(value).map_err(error::malformed_with)?
            }
            _ => header.clone(),
        };

        Ok(EncryptedJwt { raw, header })
    }
}

/// The `none` algorithm marker of an unsecured token header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct NoneAlgorithm;

impl Serialize for NoneAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("none")
    }
}

impl<'de> Deserialize<'de> for NoneAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        if name == "none" {
            Ok(Self)
        } else {
            Err(de::Error::custom("expected algorithm 'none'"))
        }
    }
}

/// The header of an unsecured JWT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct PlainHeader {
    alg: NoneAlgorithm,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    crit: Option<Vec<String>>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl PlainHeader {
    /// A plain header with `typ: JWT`
    pub fn new() -> Self {
        Self {
            typ: Some("JWT".to_owned()),
            ..Self::default()
        }
    }

    /// The `typ` parameter
    #[must_use]
    pub fn token_type(&self) -> Option<&str> {
        self.typ.as_deref()
    }
}

/// An unsecured JWT (`alg: none`)
///
/// Parsing succeeds, but the claims stay sealed behind the policy: an
/// unsecured token asserts nothing, so accepting one must be a caller
/// decision.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct PlainJwt {
    header: PlainHeader,
    claims: ClaimsSet,
}

impl PlainJwt {
    /// Constructs an unsecured token over the given claims
    pub fn new(claims: ClaimsSet) -> Self {
        Self {
            header: PlainHeader::new(),
            claims,
        }
    }

    /// The token's header
    pub fn header(&self) -> &PlainHeader {
        &self.header
    }

    /// The token's claims, if unsecured tokens are permitted
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] unless the configuration
    /// allows `none`.
    pub fn claims(&self, config: &Config) -> Result<&ClaimsSet, Error> {
        if config.none_allowed() {
            Ok(&self.claims)
        } else {
            Err(error::unsupported_algorithm("none"))
        }
    }

    /// Serializes the token into its compact form
    ///
    /// # Errors
    ///
    /// Returns an error when the header or claims cannot be serialized.
    pub fn to_compact(&self) -> Result<String, Error> {
        let header =
            Base64Url::from_raw(serde_json::to_vec(&self.header).map_err(error::malformed_with)?);
        let claims =
            Base64Url::from_raw(serde_json::to_vec(&self.claims).map_err(error::malformed_with)?);
        Ok(format!("{header}.{claims}."))
    }

    fn parse(token: &str, value: Value) -> Result<Self, Error> {
        let mut segments = token.split('.');
        let claims_b64 = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            // The third segment of an unsecured token is empty.
            (Some(_), Some(claims), Some(""), None) => claims,
            _ => return Err(error::malformed()),
        };

        let header: PlainHeader = serde_json::from_value(value).map_err(error::malformed_with)?;
        header::check_crit(header.crit.as_ref())?;

        let raw = Base64Url::from_encoded(claims_b64).map_err(error::malformed_with)?;
        let claims: ClaimsSet =
            serde_json::from_slice(raw.as_slice()).map_err(error::malformed_with)?;

        Ok(Self { header, claims })
    }
}

/// A signed JWT in its parsed, unverified state
///
/// The header is available for key selection; the claims are only
/// released by [`verify`][Self::verify].
#[derive(Clone, PartialEq)]
#[must_use]
pub struct SignedJwt {
    raw: String,
    header: jws::Header,
}

impl SignedJwt {
    /// The untrusted header of the token
    ///
    /// Nothing in this header has been authenticated; use it only to
    /// select a verification key.
    pub fn untrusted_header(&self) -> &jws::Header {
        &self.header
    }

    /// The compact serialization of the token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Verifies the token and releases its claims
    ///
    /// # Errors
    ///
    /// Returns an error when the signature does not verify under the
    /// given key or the payload is not a claims set.
    pub fn verify(&self, key: &Jwk, config: &Config) -> Result<ClaimsSet, Error> {
        let (payload, _) = jws::deserialize_compact(&self.raw, key, config)?;
        serde_json::from_slice(&payload).map_err(error::malformed_with)
    }

    fn parse(token: &str, value: Value) -> Result<Self, Error> {
        if token.split('.').count() != 3 {
            return Err(error::malformed());
        }

        let header: jws::Header = serde_json::from_value(value).map_err(error::malformed_with)?;
        header.check_crit()?;

        Ok(Self {
            raw: token.to_owned(),
            header,
        })
    }
}

impl fmt::Display for SignedJwt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Bearer tokens are credentials; the raw form stays out of debug output.
impl fmt::Debug for SignedJwt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SignedJwt")
            .field("header", &self.header)
            .field("token", &"***JWT***")
            .finish()
    }
}

/// An encrypted JWT in its parsed, undecrypted state
#[derive(Clone, PartialEq)]
#[must_use]
pub struct EncryptedJwt {
    raw: String,
    header: jwe::Header,
}

impl EncryptedJwt {
    /// The untrusted header of the token
    ///
    /// Nothing in this header has been authenticated; use it only to
    /// select a decryption key.
    pub fn untrusted_header(&self) -> &jwe::Header {
        &self.header
    }

    /// The compact serialization of the token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decrypts the token and releases its claims
    ///
    /// # Errors
    ///
    /// Returns an error when decryption fails under the given key or
    /// the plaintext is not a claims set.
    pub fn decrypt(&self, key: &Jwk, config: &Config) -> Result<ClaimsSet, Error> {
        let (payload, _) = jwe::deserialize_compact(&self.raw, key, config)?;
        serde_json::from_slice(&payload).map_err(error::malformed_with)
    }

    fn parse(token: &str, value: Value) -> Result<Self, Error> {
        if token.split('.').count() != 5 {
            return Err(error::malformed());
        }

        let enc_name = value
            .get("enc")
            .and_then(Value::as_str)
            .ok_or_else(error::malformed)?;
        if jwe::Encryption::from_name(enc_name).is_none() {
            return Err(error::unsupported_encryption(enc_name));
        }

        let header: jwe::Header = serde_json::from_value(value).map_err(error::malformed_with)?;
        header.check_crit()?;

        Ok(Self {
            raw: token.to_owned(),
            header,
        })
    }
}

impl fmt::Display for EncryptedJwt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Bearer tokens are credentials; the raw form stays out of debug output.
impl fmt::Debug for EncryptedJwt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EncryptedJwt")
            .field("header", &self.header)
            .field("token", &"***JWT***")
            .finish()
    }
}

/// A parsed JWT, classified by its protected header
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Token {
    /// An unsecured token (`alg: none`)
    Plain(PlainJwt),

    /// A signed token
    Signed(SignedJwt),

    /// An encrypted token
    Encrypted(EncryptedJwt),
}

impl Token {
    /// Parses a compact token, classifying it by the `alg` of its first
    /// segment
    ///
    /// # Errors
    ///
    /// Returns an error when the token is malformed, its algorithm is
    /// unknown, or its segment count disagrees with its variant.
    pub fn parse(token: &str) -> Result<Self, Error> {
        let first_dot = token.find('.').ok_or_else(error::malformed)?;
        let (value, alg) = header::decode_protected(&token[..first_dot])?;

        match alg {
            jwa::Algorithm::None => Ok(Self::Plain(PlainJwt::parse(token, value)?)),
            jwa::Algorithm::Signing(_) => Ok(Self::Signed(SignedJwt::parse(token, value)?)),
            jwa::Algorithm::KeyManagement(_) => {
                Ok(Self::Encrypted(EncryptedJwt::parse(token, value)?))
            }
        }
    }

    /// Parses a compact token and hands the classified result to the
    /// given handler
    ///
    /// # Errors
    ///
    /// Returns an error when parsing fails; handler outcomes are the
    /// handler's own.
    pub fn parse_with_handler<H: TokenHandler>(
        token: &str,
        handler: &H,
    ) -> Result<H::Output, Error> {
        Ok(Self::parse(token)?.dispatch(handler))
    }

    /// Dispatches this token to the handler arm matching its variant
    pub fn dispatch<H: TokenHandler>(&self, handler: &H) -> H::Output {
        match self {
            Self::Plain(jwt) => handler.on_plain(jwt),
            Self::Signed(jwt) => handler.on_signed(jwt),
            Self::Encrypted(jwt) => handler.on_encrypted(jwt),
        }
    }
}

/// A consumer of classified tokens
///
/// Implementations receive the parsed token through the entry point
/// matching its variant.
pub trait TokenHandler {
    /// The value produced for any token
    type Output;

    /// Called for an unsecured token
    fn on_plain(&self, jwt: &PlainJwt) -> Self::Output;

    /// Called for a signed token
    fn on_signed(&self, jwt: &SignedJwt) -> Self::Output;

    /// Called for an encrypted token
    fn on_encrypted(&self, jwt: &EncryptedJwt) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::jwa::Symmetric;

    fn hmac_key() -> Result<Jwk> {
        Ok(Jwk::from(Symmetric::generate(32)?))
    }

    fn sample_claims() -> ClaimsSet {
        ClaimsSet::new()
            .with_issuer("https://issuer.example")
            .with_subject("1234567890")
            .with_audience("my_api")
            .with_expiration(2_000_000_000u64)
            .with_issued_at(1_516_239_022u64)
            .with_claim("name", serde_json::json!("John Doe"))
    }

    #[test]
    fn classifies_the_canonical_hs256_token() -> Result<()> {
        let token = Token::parse(
            "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
             eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
             SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c",
        )?;

        let signed = match &token {
            Token::Signed(signed) => signed,
            other => panic!("expected a signed token, got {other:?}"),
        };
        assert_eq!(signed.untrusted_header().alg(), jws::Algorithm::HS256);

        let mut secret = b"your-256-bit-secret".to_vec();
        secret.resize(32, 0);
        let key = Jwk::from(Symmetric::new(Base64Url::from_raw(secret)));
        let claims = signed.verify(&key, &Config::default())?;
        assert_eq!(claims.subject(), Some("1234567890"));
        assert_eq!(claims.issued_at(), Some(NumericDate(1_516_239_022)));
        assert_eq!(claims.claim("name"), Some(&serde_json::json!("John Doe")));
        Ok(())
    }

    #[test]
    fn signed_round_trip_preserves_claims() -> Result<()> {
        let key = hmac_key()?;
        let claims = sample_claims();
        let jwt = claims.sign(&jws::Header::new(jws::Algorithm::HS256), &key)?;

        let parsed = Token::parse(jwt.as_str())?;
        let verified = match parsed {
            Token::Signed(signed) => signed.verify(&key, &Config::default())?,
            other => panic!("expected a signed token, got {other:?}"),
        };
        assert_eq!(verified, claims);
        Ok(())
    }

    #[test]
    fn encrypted_round_trip_preserves_claims() -> Result<()> {
        let key = Jwk::from(Symmetric::generate(32)?);
        let claims = sample_claims();
        let header = jwe::Header::new(jwe::Algorithm::Dir, jwe::Encryption::A256Gcm);
        let jwt = claims.encrypt(&header, &key, &Config::default())?;

        assert_eq!(jwt.as_str().split('.').count(), 5);

        let parsed = Token::parse(jwt.as_str())?;
        let decrypted = match parsed {
            Token::Encrypted(encrypted) => encrypted.decrypt(&key, &Config::default())?,
            other => panic!("expected an encrypted token, got {other:?}"),
        };
        assert_eq!(decrypted, claims);
        Ok(())
    }

    #[test]
    fn plain_tokens_withhold_claims_by_default() -> Result<()> {
        let jwt = PlainJwt::new(sample_claims());
        let compact = jwt.to_compact()?;
        assert!(compact.ends_with('.'));

        let parsed = match Token::parse(&compact)? {
            Token::Plain(plain) => plain,
            other => panic!("expected a plain token, got {other:?}"),
        };

        let err = parsed.claims(&Config::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm { alg } if alg == "none"));

        let claims = parsed.claims(&Config::default().allow_none())?;
        assert_eq!(claims.subject(), Some("1234567890"));
        Ok(())
    }

    #[test]
    fn plain_tokens_require_an_empty_third_segment() {
        let header = Base64Url::from_raw(br#"{"alg":"none"}"#.to_vec());
        let claims = Base64Url::from_raw(b"{}".to_vec());

        let err = Token::parse(&format!("{header}.{claims}.c2ln")).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding { .. }));

        let err = Token::parse(&format!("{header}.{claims}")).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding { .. }));
    }

    #[test]
    fn segment_count_must_agree_with_the_variant() -> Result<()> {
        // A signing algorithm with five segments is not a JWS.
        let header = Base64Url::from_raw(br#"{"alg":"HS256"}"#.to_vec());
        let err = Token::parse(&format!("{header}.a.b.c.d")).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding { .. }));

        // A key management algorithm with three segments is not a JWE.
        let header = Base64Url::from_raw(br#"{"alg":"dir","enc":"A128GCM"}"#.to_vec());
        let err = Token::parse(&format!("{header}.a.b")).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding { .. }));
        Ok(())
    }

    #[test]
    fn unknown_algorithms_are_rejected() {
        let header = Base64Url::from_raw(br#"{"alg":"HS1024"}"#.to_vec());
        let err = Token::parse(&format!("{header}.e30.c2ln")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm { .. }));
    }

    #[test]
    fn handler_receives_the_matching_variant() -> Result<()> {
        struct Classifier;

        impl TokenHandler for Classifier {
            type Output = &'static str;

            fn on_plain(&self, _jwt: &PlainJwt) -> Self::Output {
                "plain"
            }

            fn on_signed(&self, _jwt: &SignedJwt) -> Self::Output {
                "signed"
            }

            fn on_encrypted(&self, _jwt: &EncryptedJwt) -> Self::Output {
                "encrypted"
            }
        }

        let key = hmac_key()?;
        let signed = sample_claims().sign(&jws::Header::new(jws::Algorithm::HS256), &key)?;
        assert_eq!(
            Token::parse_with_handler(signed.as_str(), &Classifier)?,
            "signed"
        );

        let plain = PlainJwt::new(sample_claims()).to_compact()?;
        assert_eq!(Token::parse_with_handler(&plain, &Classifier)?, "plain");

        let enc_key = Jwk::from(Symmetric::generate(16)?);
        let header = jwe::Header::new(jwe::Algorithm::Dir, jwe::Encryption::A128Gcm);
        let encrypted = sample_claims().encrypt(&header, &enc_key, &Config::default())?;
        assert_eq!(
            Token::parse_with_handler(encrypted.as_str(), &Classifier)?,
            "encrypted"
        );
        Ok(())
    }

    #[test]
    fn audiences_serialize_in_both_wire_forms() -> Result<()> {
        let one = ClaimsSet::new().with_audience("solo");
        let json = serde_json::to_value(&one)?;
        assert_eq!(json["aud"], serde_json::json!("solo"));

        let many = ClaimsSet::new()
            .with_audiences(vec!["first".to_owned(), "second".to_owned()]);
        let json = serde_json::to_value(&many)?;
        assert_eq!(json["aud"], serde_json::json!(["first", "second"]));

        let back: ClaimsSet = serde_json::from_value(json)?;
        assert_eq!(back.audiences().iter().count(), 2);
        Ok(())
    }

    #[test]
    fn unknown_claims_survive_a_round_trip() -> Result<()> {
        let source = r#"{"iss":"me","custom":{"deep":[1,2,3]},"flag":true}"#;
        let claims: ClaimsSet = serde_json::from_str(source)?;
        assert_eq!(claims.issuer(), Some("me"));
        assert_eq!(claims.claim("flag"), Some(&serde_json::json!(true)));

        let out = serde_json::to_value(&claims)?;
        assert_eq!(out, serde_json::from_str::<Value>(source)?);
        Ok(())
    }

    #[test]
    fn debug_output_redacts_the_token() -> Result<()> {
        let key = hmac_key()?;
        let jwt = sample_claims().sign(&jws::Header::new(jws::Algorithm::HS256), &key)?;
        let debugged = format!("{jwt:?}");
        assert!(debugged.contains("***JWT***"));
        assert!(!debugged.contains(jwt.as_str()));
        Ok(())
    }
}
