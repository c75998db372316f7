//! AES Key Wrap (RFC 3394) key management (`A128KW`/`A192KW`/`A256KW`)
//!
//! The wrap and unwrap helpers are shared with the ECDH-ES and PBES2
//! families, which both terminate in an AES key wrap of the CEK.

use openssl::aes::{self, AesKey};
use zeroize::Zeroizing;

use super::{Algorithm, KeyManagement, WrapOutcome};
use crate::{
    error,
    jwa::KeyOperation,
    jwe::{enc::Encryption, Header},
    util, Config, Error, Jwk,
};

pub(crate) struct AesKw;

/// Wraps `cek` under `kek` per RFC 3394 with the default IV
pub(crate) fn wrap(kek: &[u8], cek: &[u8]) -> Result<Vec<u8>, Error> {
    let key = AesKey::new_encrypt(kek).map_err(|_| error::invalid_key_length())?;
    let mut out = vec![0u8; cek.len() + 8];
    aes::wrap_key(&key, None, &mut out, cek)
        .map_err(|_| error::provider("AES key wrap failure"))?;
    Ok(out)
}

/// Unwraps an RFC 3394 wrapped key, verifying the integrity value
pub(crate) fn unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
    if wrapped.len() < 24 || wrapped.len() % 8 != 0 {
        return Err(error::decryption_failed());
    }

    let key = AesKey::new_decrypt(kek).map_err(|_| error::invalid_key_length())?;
    let mut out = Zeroizing::new(vec![0u8; wrapped.len() - 8]);
    aes::unwrap_key(&key, None, &mut out, wrapped).map_err(|_| error::decryption_failed())?;
    Ok(out)
}

fn wrapping_key<'a>(
    key: &'a Jwk,
    alg: Algorithm,
    config: &Config,
) -> Result<&'a [u8], Error> {
    let secret = key.as_symmetric()?;
    config.check_symmetric_key(secret.len())?;
    if Some(secret.len()) != alg.wrap_key_len() {
        return Err(error::invalid_key_length());
    }
    Ok(secret.as_slice())
}

impl KeyManagement for AesKw {
    fn wrap(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        _header: &mut Header,
        config: &Config,
    ) -> Result<WrapOutcome, Error> {
        key.require_operation(KeyOperation::WrapKey)?;
        let kek = wrapping_key(key, alg, config)?;

        let cek = Zeroizing::new(util::rand_bytes(enc.key_len())?);
        let encrypted_key = wrap(kek, &cek)?;

        Ok(WrapOutcome::Wrapped { cek, encrypted_key })
    }

    fn unwrap_cek(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        _header: &Header,
        encrypted_key: &[u8],
        config: &Config,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        key.require_operation(KeyOperation::UnwrapKey)?;
        let kek = wrapping_key(key, alg, config)?;

        let cek = unwrap(kek, encrypted_key)?;
        if cek.len() != enc.key_len() {
            return Err(error::decryption_failed());
        }
        Ok(cek)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_rfc3394_128_bit_vector() {
        let kek: Vec<u8> = (0x00u8..=0x0F).collect();
        let data: Vec<u8> = vec![
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ];

        let wrapped = wrap(&kek, &data).unwrap();
        assert_eq!(
            wrapped,
            vec![
                0x1F, 0xA6, 0x8B, 0x0A, 0x81, 0x12, 0xB4, 0x47, 0xAE, 0xF3, 0x4B, 0xD8, 0xFB,
                0x5A, 0x7B, 0x82, 0x9D, 0x3E, 0x86, 0x23, 0x71, 0xD2, 0xCF, 0xE5,
            ]
        );

        let unwrapped = unwrap(&kek, &wrapped).unwrap();
        assert_eq!(unwrapped.as_slice(), data.as_slice());
    }

    #[test]
    fn unwrap_rejects_corrupted_wrapping() {
        let kek = vec![0u8; 16];
        let mut wrapped = wrap(&kek, &[0x42; 16]).unwrap();
        wrapped[3] ^= 0x01;
        assert!(matches!(
            unwrap(&kek, &wrapped),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn unwrap_rejects_impossible_lengths() {
        let kek = vec![0u8; 16];
        assert!(matches!(
            unwrap(&kek, &[0u8; 9]),
            Err(Error::DecryptionFailed)
        ));
        assert!(matches!(
            unwrap(&kek, &[0u8; 16]),
            Err(Error::DecryptionFailed)
        ));
    }
}
