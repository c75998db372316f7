
use openssl::{
    bn::BigNum,
    pkey::{PKey, Public},
    rsa::Rsa,
};
use serde::{Deserialize, Serialize};
use sigelo_base64::{Base64Url, Base64UrlRef};

use super::SigningAlgorithm;
use crate::{error, jws, Error};

/// RSA public key components
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyDto")]
pub struct PublicKey {
    /// The public modulus
    #[serde(rename = "n")]
    modulus: Base64Url,

    /// The public exponent
    #[serde(rename = "e")]
    exponent: Base64Url,
}

impl PublicKey {
    /// The public key's modulus
    pub fn modulus(&self) -> &Base64UrlRef {
        &self.modulus
    }

    /// The public key's exponent
    pub fn exponent(&self) -> &Base64UrlRef {
        &self.exponent
    }

    /// Imports an RSA public key from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid RSA public key.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let rsa = Rsa::public_key_from_pem(pem.as_bytes())?;
        Self::from_components(
            Base64Url::from_raw(rsa.n().to_vec()),
            Base64Url::from_raw(rsa.e().to_vec()),
        )
    }

    /// Exports the RSA public key as a PEM file
    ///
    /// # Errors
    ///
    /// The components could not be rebuilt into a key.
    pub fn to_pem(&self) -> Result<String, Error> {
        let pem = self.to_openssl_rsa()?.public_key_to_pem()?;
        String::from_utf8(pem).map_err(error::provider)
    }

    /// Constructs a public key from the modulus and exponent
    ///
    /// # Errors
    ///
    /// Returns an error if the modulus is below 2048 bits.
    pub fn from_components(
        modulus: impl Into<Base64Url>,
        exponent: impl Into<Base64Url>,
    ) -> Result<Self, Error> {
        let modulus = modulus.into();
        let exponent = exponent.into();
        if modulus.as_slice().len() < 256 {
            return Err(error::invalid_key_length());
        }

        Ok(Self { modulus, exponent })
    }

    /// The modulus width in bytes, which is also the signature width
    pub(crate) fn modulus_len(&self) -> usize {
        self.modulus.as_slice().len()
    }

    fn to_openssl_rsa(&self) -> Result<Rsa<Public>, Error> {
        let n = BigNum::from_slice(self.modulus.as_slice())?;
        let e = BigNum::from_slice(self.exponent.as_slice())?;
        Ok(Rsa::from_public_components(n, e)?)
    }

    pub(crate) fn to_openssl_pkey(&self) -> Result<PKey<Public>, Error> {
        Ok(PKey::from_rsa(self.to_openssl_rsa()?)?)
    }
}

impl jws::Verifier for PublicKey {
    type Algorithm = SigningAlgorithm;

    fn can_verify(&self, _alg: Self::Algorithm) -> bool {
        true
    }

    fn verify(&self, alg: Self::Algorithm, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        if signature.len() != self.modulus_len() {
            return Err(error::signature_invalid());
        }

        let pk = ring::signature::RsaPublicKeyComponents {
            n: self.modulus.as_slice(),
            e: self.exponent.as_slice(),
        };

        pk.verify(alg.into_verification_params(), data, signature)
            .map_err(|_| error::signature_invalid())
    }
}

impl TryFrom<PublicKeyDto> for PublicKey {
    type Error = Error;

    fn try_from(dto: PublicKeyDto) -> Result<Self, Self::Error> {
        Self::from_components(dto.modulus, dto.exponent)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct PublicKeyDto {
    #[serde(rename = "n")]
    modulus: Base64Url,

    #[serde(rename = "e")]
    exponent: Base64Url,
}
