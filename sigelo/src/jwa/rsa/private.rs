use std::{fmt, sync::Arc};

use openssl::{
    bn::BigNum,
    pkey::{PKey, Private},
    rsa::{Rsa, RsaPrivateKeyBuilder},
};
use serde::{Deserialize, Serialize};
use sigelo_base64::Base64Url;

use super::{PublicKey, SigningAlgorithm};
use crate::{error, jws, Error};

/// RSA private key components
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "PrivateKeyDto", into = "PrivateKeyDto")]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    der: Vec<u8>,
    ring_cache: Arc<ring::signature::RsaKeyPair>,
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Generates a new 2048-bit RSA key pair
    ///
    /// # Errors
    ///
    /// Unable to generate a private key.
    pub fn generate() -> Result<Self, Error> {
        let rsa = Rsa::generate(2048)?;
        Self::from_openssl_key(&rsa)
    }

    /// Imports an RSA key pair from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid RSA private key.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let rsa = Rsa::private_key_from_pem(pem.as_bytes()).map_err(error::provider)?;
        Self::from_openssl_key(&rsa)
    }

    fn from_openssl_key(rsa: &Rsa<Private>) -> Result<Self, Error> {
        let der = rsa.private_key_to_der()?;

        let public_key = PublicKey::from_components(
            Base64Url::from_raw(rsa.n().to_vec()),
            Base64Url::from_raw(rsa.e().to_vec()),
        )?;

        let ring_cache = Arc::new(
            ring::signature::RsaKeyPair::from_der(&der).map_err(|e| error::provider(e.to_string()))?,
        );

        Ok(Self {
            public_key,
            der,
            ring_cache,
        })
    }

    /// Exports the RSA key pair as a PEM file
    ///
    /// # Errors
    ///
    /// The stored key could not be re-encoded.
    pub fn to_pem(&self) -> Result<String, Error> {
        let key = Rsa::private_key_from_der(&self.der)?;
        let pem = key.private_key_to_pem()?;
        String::from_utf8(pem).map_err(error::provider)
    }

    /// Provides access to the public key parameters
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Extracts the public key
    pub fn into_public_key(self) -> PublicKey {
        self.public_key
    }

    pub(crate) fn to_openssl_pkey(&self) -> Result<PKey<Private>, Error> {
        Ok(PKey::from_rsa(Rsa::private_key_from_der(&self.der)?)?)
    }

    pub(crate) fn sign(&self, alg: SigningAlgorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; self.ring_cache.public().modulus_len()];
        self.ring_cache
            .sign(
                alg.into_signing_params(),
                &ring::rand::SystemRandom::new(),
                data,
                &mut buf,
            )
            .map_err(|e| error::provider(e.to_string()))?;
        Ok(buf)
    }
}

impl jws::Signer for PrivateKey {
    type Algorithm = SigningAlgorithm;

    fn can_sign(&self, _alg: Self::Algorithm) -> bool {
        true
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        PrivateKey::sign(self, alg, data)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl From<PrivateKey> for PrivateKeyDto {
    fn from(pk: PrivateKey) -> Self {
        let rsa = Rsa::private_key_from_der(&pk.der).unwrap();

        let factors = match (rsa.p(), rsa.q()) {
            (Some(p), Some(q)) => Some(Factors {
                p: Base64Url::from_raw(p.to_vec()),
                q: Base64Url::from_raw(q.to_vec()),
            }),
            _ => None,
        };

        let crt = match (rsa.dmp1(), rsa.dmq1(), rsa.iqmp()) {
            (Some(dmp1), Some(dmq1), Some(iqmp)) => Some(ChineseRemainderTheorem {
                dmp1: Base64Url::from_raw(dmp1.to_vec()),
                dmq1: Base64Url::from_raw(dmq1.to_vec()),
                iqmp: Base64Url::from_raw(iqmp.to_vec()),
            }),
            _ => None,
        };

        Self {
            key: Base64Url::from_raw(rsa.d().to_vec()),
            public_key: pk.public_key,
            factors,
            crt,
        }
    }
}

impl TryFrom<PrivateKeyDto> for PrivateKey {
    type Error = Error;

    fn try_from(dto: PrivateKeyDto) -> Result<Self, Self::Error> {
        let mut builder = RsaPrivateKeyBuilder::new(
            BigNum::from_slice(dto.public_key.modulus().as_slice())?,
            BigNum::from_slice(dto.public_key.exponent().as_slice())?,
            BigNum::from_slice(dto.key.as_slice())?,
        )?;

        if let Some(f) = &dto.factors {
            builder = builder.set_factors(
                BigNum::from_slice(f.p.as_slice())?,
                BigNum::from_slice(f.q.as_slice())?,
            )?;
        }

        if let Some(crt) = &dto.crt {
            builder = builder.set_crt_params(
                BigNum::from_slice(crt.dmp1.as_slice())?,
                BigNum::from_slice(crt.dmq1.as_slice())?,
                BigNum::from_slice(crt.iqmp.as_slice())?,
            )?;
        }

        let key = builder.build();

        Self::from_openssl_key(&key)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct Factors {
    pub p: Base64Url,
    pub q: Base64Url,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct ChineseRemainderTheorem {
    #[serde(rename = "dp")]
    pub dmp1: Base64Url,
    #[serde(rename = "dq")]
    pub dmq1: Base64Url,
    #[serde(rename = "qi")]
    pub iqmp: Base64Url,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct PrivateKeyDto {
    #[serde(rename = "d")]
    key: Base64Url,

    #[serde(flatten)]
    public_key: PublicKey,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    factors: Option<Factors>,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    crt: Option<ChineseRemainderTheorem>,
}
