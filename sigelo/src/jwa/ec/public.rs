
use openssl::{
    bn::{BigNum, BigNumContext},
    ec::{EcKey, EcKeyRef},
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    pkey::{HasPublic, Public},
};
use serde::{Deserialize, Serialize};
use sigelo_base64::Base64Url;

use super::{Curve, SigningAlgorithm};
use crate::{error, jws, Error};

/// ECC public key parameters
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyDto", into = "PublicKeyDto")]
pub struct PublicKey {
    curve: Curve,
    x: Base64Url,
    y: Base64Url,
}

impl PublicKey {
    /// The curve this point lives on
    #[must_use]
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Constructs a public key from affine coordinates
    ///
    /// # Errors
    ///
    /// The coordinates do not name a point on the curve.
    pub fn from_affine_coordinates(
        curve: Curve,
        x: impl Into<Base64Url>,
        y: impl Into<Base64Url>,
    ) -> Result<Self, Error> {
        let key = Self {
            curve,
            x: x.into(),
            y: y.into(),
        };

        // Validates the point.
        key.to_openssl_eckey()?;
        Ok(key)
    }

    /// Extracts the public point from an OpenSSL key
    pub(crate) fn from_openssl_eckey<T: HasPublic>(key: &EcKeyRef<T>) -> Result<Self, Error> {
        let group = key.group();
        let curve = Curve::from_group(group).ok_or_else(error::key_type_mismatch)?;

        let mut ctx = BigNumContext::new()?;
        let mut x = BigNum::new()?;
        let mut y = BigNum::new()?;
        key.public_key()
            .affine_coordinates_gfp(group, &mut x, &mut y, &mut ctx)?;

        let width = curve.coordinate_size() as i32;
        Ok(Self {
            curve,
            x: Base64Url::from_raw(x.to_vec_padded(width)?),
            y: Base64Url::from_raw(y.to_vec_padded(width)?),
        })
    }

    pub(crate) fn to_openssl_eckey(&self) -> Result<EcKey<Public>, Error> {
        let group = self.curve.to_group();
        let x = BigNum::from_slice(self.x.as_slice())?;
        let y = BigNum::from_slice(self.y.as_slice())?;
        EcKey::from_public_key_affine_coordinates(group, &x, &y)
            .map_err(|_| error::key_type_mismatch())
    }

    /// The uncompressed SEC1 point, `0x04 || X || Y`, with fixed-width
    /// coordinates
    fn uncompressed_point(&self) -> Vec<u8> {
        let width = self.curve.coordinate_size();
        let mut point = Vec::with_capacity(1 + 2 * width);
        point.push(0x04);
        pad_coordinate(&mut point, self.x.as_slice(), width);
        pad_coordinate(&mut point, self.y.as_slice(), width);
        point
    }

    pub(crate) fn can_verify(&self, alg: SigningAlgorithm) -> bool {
        Curve::from(alg) == self.curve
    }

    pub(crate) fn verify(
        &self,
        alg: SigningAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        if Curve::from(alg) != self.curve {
            return Err(error::key_type_mismatch());
        }
        if signature.len() != alg.signature_size() {
            return Err(error::signature_invalid());
        }

        match alg {
            SigningAlgorithm::ES256 => self.verify_fixed(
                &ring::signature::ECDSA_P256_SHA256_FIXED,
                data,
                signature,
            ),
            SigningAlgorithm::ES384 => self.verify_fixed(
                &ring::signature::ECDSA_P384_SHA384_FIXED,
                data,
                signature,
            ),
            SigningAlgorithm::ES512 => self.verify_p521(data, signature),
        }
    }

    fn verify_fixed(
        &self,
        alg: &'static ring::signature::EcdsaVerificationAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        let key = ring::signature::UnparsedPublicKey::new(alg, self.uncompressed_point());
        key.verify(data, signature)
            .map_err(|_| error::signature_invalid())
    }

    /// ring has no P-521 support, so `ES512` verification rebuilds the
    /// provider's big-number signature from the fixed-width halves.
    fn verify_p521(&self, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        let coord = Curve::P521.coordinate_size();
        let (r, s) = signature.split_at(coord);
        let key = self
            .to_openssl_eckey()
            .map_err(|_| error::signature_invalid())?;

        let verified = || -> Result<bool, openssl::error::ErrorStack> {
            let digest = hash(MessageDigest::sha512(), data)?;
            let sig =
                EcdsaSig::from_private_components(BigNum::from_slice(r)?, BigNum::from_slice(s)?)?;
            sig.verify(&digest, &key)
        }();

        match verified {
            Ok(true) => Ok(()),
            _ => Err(error::signature_invalid()),
        }
    }
}

fn pad_coordinate(out: &mut Vec<u8>, raw: &[u8], width: usize) {
    if raw.len() < width {
        out.extend(std::iter::repeat(0u8).take(width - raw.len()));
    }
    out.extend_from_slice(raw);
}

impl TryFrom<PublicKeyDto> for PublicKey {
    type Error = Error;

    fn try_from(dto: PublicKeyDto) -> Result<Self, Self::Error> {
        Self::from_affine_coordinates(dto.curve, dto.x, dto.y)
    }
}

impl From<PublicKey> for PublicKeyDto {
    fn from(key: PublicKey) -> Self {
        Self {
            curve: key.curve,
            x: key.x,
            y: key.y,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct PublicKeyDto {
    #[serde(rename = "crv")]
    pub curve: Curve,
    pub x: Base64Url,
    pub y: Base64Url,
}
