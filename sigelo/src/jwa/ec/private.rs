use std::{fmt, sync::Arc};

use openssl::{
    bn::BigNum,
    ec::EcKey,
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    pkey::{PKey, Private},
};
use serde::{Deserialize, Serialize};
use sigelo_base64::{Base64, Base64Url};

use super::{public::PublicKeyDto, Curve, PublicKey, SigningAlgorithm};
use crate::{error, jws, Error};

/// ECC private key parameters
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "PrivateKeyDto", into = "PrivateKeyDto")]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    pkcs8: Base64,
    ring_cache: Option<Arc<ring::signature::EcdsaKeyPair>>,
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.pkcs8 == other.pkcs8
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Generates a new ECC key pair using the specified curve
    ///
    /// # Errors
    ///
    /// Unable to generate a private key.
    pub fn generate(curve: Curve) -> Result<Self, Error> {
        let key = EcKey::generate(curve.to_group())?;
        Self::from_openssl_eckey(key)
    }

    /// Constructs an ECC key pair from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid ECC private key.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let key = PKey::private_key_from_pem(pem.as_bytes()).map_err(error::provider)?;
        Self::from_openssl_eckey(key.ec_key().map_err(error::provider)?)
    }

    fn from_openssl_eckey(key: EcKey<Private>) -> Result<Self, Error> {
        let public_key = PublicKey::from_openssl_eckey(&*key)?;

        let pkey = PKey::from_ec_key(key)?;
        let pkcs8 = Base64::from_raw(pkey.private_key_to_pkcs8()?);

        // ring carries no P-521 implementation, so `ES512` signing stays
        // on the OpenSSL path.
        let ring_cache = match public_key.curve() {
            Curve::P256 | Curve::P384 => Some(Arc::new(
                ring::signature::EcdsaKeyPair::from_pkcs8(
                    ring_signing_algorithm(public_key.curve()),
                    pkcs8.as_slice(),
                    &ring::rand::SystemRandom::new(),
                )
                .map_err(|e| error::provider(e.to_string()))?,
            )),
            Curve::P521 => None,
        };

        Ok(Self {
            public_key,
            pkcs8,
            ring_cache,
        })
    }

    /// Exports the key pair as a PKCS#8 PEM file
    ///
    /// # Errors
    ///
    /// The stored key could not be re-encoded.
    pub fn to_pem(&self) -> Result<String, Error> {
        let pem = PKey::private_key_from_pkcs8(self.pkcs8.as_slice())?
            .private_key_to_pem_pkcs8()?;
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
        Ok(PKey::private_key_from_pkcs8(self.pkcs8.as_slice())?)
    }

    pub(crate) fn can_sign(&self, alg: SigningAlgorithm) -> bool {
        self.public_key.curve() == Curve::from(alg)
    }

    pub(crate) fn sign(&self, alg: SigningAlgorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        if !self.can_sign(alg) {
            return Err(error::key_type_mismatch());
        }

        match &self.ring_cache {
            Some(pair) => {
                let signature = pair
                    .sign(&ring::rand::SystemRandom::new(), data)
                    .map_err(|e| error::provider(e.to_string()))?;
                Ok(signature.as_ref().to_vec())
            }
            None => self.sign_p521(data),
        }
    }

    /// Signs via OpenSSL and transcodes the big-number signature into the
    /// fixed-width `R ‖ S` form.
    fn sign_p521(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let digest = hash(MessageDigest::sha512(), data)?;
        let key = self.to_openssl_pkey()?.ec_key()?;
        let sig = EcdsaSig::sign(&digest, &key)?;

        let width = Curve::P521.coordinate_size() as i32;
        let mut out = sig.r().to_vec_padded(width)?;
        out.extend_from_slice(&sig.s().to_vec_padded(width)?);
        Ok(out)
    }
}

impl jws::Signer for PrivateKey {
    type Algorithm = SigningAlgorithm;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        PrivateKey::can_sign(self, alg)
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

fn ring_signing_algorithm(curve: Curve) -> &'static ring::signature::EcdsaSigningAlgorithm {
    match curve {
        Curve::P256 => &ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING,
        Curve::P384 => &ring::signature::ECDSA_P384_SHA384_FIXED_SIGNING,
        Curve::P521 => unreachable!("no ring algorithm for P-521"),
    }
}

impl From<PrivateKey> for PrivateKeyDto {
    fn from(pk: PrivateKey) -> Self {
        let key = PKey::private_key_from_pkcs8(pk.pkcs8.as_slice())
            .unwrap()
            .ec_key()
            .unwrap();
        let width = pk.public_key.curve().coordinate_size() as i32;

        Self {
            key: Base64Url::from_raw(key.private_key().to_vec_padded(width).unwrap()),
            public_key: PublicKeyDto::from(pk.into_public_key()),
        }
    }
}

impl TryFrom<PrivateKeyDto> for PrivateKey {
    type Error = Error;

    fn try_from(dto: PrivateKeyDto) -> Result<Self, Self::Error> {
        let group = dto.public_key.curve.to_group();
        let public = EcKey::from_public_key_affine_coordinates(
            group,
            &*BigNum::from_slice(dto.public_key.x.as_slice())?,
            &*BigNum::from_slice(dto.public_key.y.as_slice())?,
        )
        .map_err(|_| error::key_type_mismatch())?;

        let private_number = BigNum::from_slice(dto.key.as_slice())?;
        let key = EcKey::from_private_components(group, &private_number, public.public_key())
            .map_err(|_| error::key_type_mismatch())?;

        Self::from_openssl_eckey(key)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct PrivateKeyDto {
    #[serde(rename = "d")]
    key: Base64Url,

    #[serde(flatten)]
    public_key: PublicKeyDto,
}
