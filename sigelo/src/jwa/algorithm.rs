use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{jwa, jwe, jws};

/// Any algorithm a JOSE header's `alg` parameter can carry
///
/// The variant decides how the enclosing token is processed: `none`
/// yields an unsecured token, a signing algorithm a JWS, and a
/// key-management algorithm a JWE.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[non_exhaustive]
#[must_use]
pub enum Algorithm {
    /// The `none` algorithm of unsecured tokens
    None,

    /// A signing/verification algorithm
    Signing(jws::Algorithm),

    /// A key-management algorithm
    KeyManagement(jwe::Algorithm),
}

impl Algorithm {
    /// The HS256 signing algorithm
    pub const HS256: Algorithm = Self::Signing(jws::Algorithm::HS256);
    /// The HS384 signing algorithm
    pub const HS384: Algorithm = Self::Signing(jws::Algorithm::HS384);
    /// The HS512 signing algorithm
    pub const HS512: Algorithm = Self::Signing(jws::Algorithm::HS512);
    /// The RS256 signing algorithm
    pub const RS256: Algorithm = Self::Signing(jws::Algorithm::RS256);
    /// The RS384 signing algorithm
    pub const RS384: Algorithm = Self::Signing(jws::Algorithm::RS384);
    /// The RS512 signing algorithm
    pub const RS512: Algorithm = Self::Signing(jws::Algorithm::RS512);
    /// The PS256 signing algorithm
    pub const PS256: Algorithm = Self::Signing(jws::Algorithm::PS256);
    /// The PS384 signing algorithm
    pub const PS384: Algorithm = Self::Signing(jws::Algorithm::PS384);
    /// The PS512 signing algorithm
    pub const PS512: Algorithm = Self::Signing(jws::Algorithm::PS512);
    /// The ES256 signing algorithm
    pub const ES256: Algorithm = Self::Signing(jws::Algorithm::ES256);
    /// The ES384 signing algorithm
    pub const ES384: Algorithm = Self::Signing(jws::Algorithm::ES384);
    /// The ES512 signing algorithm
    pub const ES512: Algorithm = Self::Signing(jws::Algorithm::ES512);
    /// The EdDSA signing algorithm
    pub const EDDSA: Algorithm = Self::Signing(jws::Algorithm::EDDSA);

    /// Resolves a registered algorithm name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "none" {
            Some(Self::None)
        } else if let Some(alg) = jws::Algorithm::from_name(name) {
            Some(Self::Signing(alg))
        } else {
            jwe::Algorithm::from_name(name).map(Self::KeyManagement)
        }
    }

    /// The registered name of this algorithm
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Signing(alg) => alg.name(),
            Self::KeyManagement(alg) => alg.name(),
        }
    }

    /// The key usage implied by this algorithm
    pub fn to_usage(self) -> jwa::Usage {
        match self {
            Self::None | Self::Signing(_) => jwa::Usage::Signing,
            Self::KeyManagement(_) => jwa::Usage::Encryption,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<jws::Algorithm> for Algorithm {
    #[inline]
    fn from(alg: jws::Algorithm) -> Self {
        Self::Signing(alg)
    }
}

impl From<jwe::Algorithm> for Algorithm {
    #[inline]
    fn from(alg: jwe::Algorithm) -> Self {
        Self::KeyManagement(alg)
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown algorithm '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_names() {
        assert_eq!(Algorithm::from_name("none"), Some(Algorithm::None));
        assert_eq!(Algorithm::from_name("HS256"), Some(Algorithm::HS256));
        assert_eq!(
            Algorithm::from_name("ECDH-ES+A128KW"),
            Some(Algorithm::KeyManagement(jwe::Algorithm::EcdhEsA128Kw))
        );
        assert_eq!(Algorithm::from_name("HS128"), None);
    }

    #[test]
    fn names_round_trip_through_serde() {
        for name in [
            "none", "HS256", "HS384", "HS512", "RS256", "RS384", "RS512", "PS256", "PS384",
            "PS512", "ES256", "ES384", "ES512", "EdDSA", "dir", "RSA1_5", "RSA-OAEP",
            "RSA-OAEP-256", "A128KW", "A192KW", "A256KW", "A128GCMKW", "A192GCMKW", "A256GCMKW",
            "ECDH-ES", "ECDH-ES+A128KW", "ECDH-ES+A192KW", "ECDH-ES+A256KW", "PBES2-HS256+A128KW",
            "PBES2-HS384+A192KW", "PBES2-HS512+A256KW",
        ] {
            let alg = Algorithm::from_name(name).unwrap();
            assert_eq!(alg.name(), name);
            let json = serde_json::to_string(&alg).unwrap();
            assert_eq!(json, format!("\"{name}\""));
            let back: Algorithm = serde_json::from_str(&json).unwrap();
            assert_eq!(back, alg);
        }
    }
}
