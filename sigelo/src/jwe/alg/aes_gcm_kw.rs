//! AES-GCM key wrapping (`A128GCMKW`/`A192GCMKW`/`A256GCMKW`)
//!
//! The CEK is sealed with AES-GCM under the shared key; the GCM nonce
//! and tag travel in the header's `iv` and `tag` parameters.

use openssl::symm::Cipher;
use sigelo_base64::Base64Url;
use zeroize::Zeroizing;

use super::{Algorithm, KeyManagement, WrapOutcome};
use crate::{
    error,
    jwa::KeyOperation,
    jwe::{enc::gcm, enc::Encryption, Header},
    util, Config, Error, Jwk,
};

pub(crate) struct AesGcmKw;

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

fn cipher(alg: Algorithm) -> Cipher {
    match alg {
        Algorithm::A128GcmKw => Cipher::aes_128_gcm(),
        Algorithm::A192GcmKw => Cipher::aes_192_gcm(),
        _ => Cipher::aes_256_gcm(),
    }
}

fn wrapping_key<'a>(key: &'a Jwk, alg: Algorithm, config: &Config) -> Result<&'a [u8], Error> {
    let secret = key.as_symmetric()?;
    config.check_symmetric_key(secret.len())?;
    if Some(secret.len()) != alg.wrap_key_len() {
        return Err(error::invalid_key_length());
    }
    Ok(secret.as_slice())
}

impl KeyManagement for AesGcmKw {
    fn wrap(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        header: &mut Header,
        config: &Config,
    ) -> Result<WrapOutcome, Error> {
        key.require_operation(KeyOperation::WrapKey)?;
        let kek = wrapping_key(key, alg, config)?;

        let cek = Zeroizing::new(util::rand_bytes(enc.key_len())?);
        let iv = util::rand_bytes(IV_LEN)?;
        let (encrypted_key, tag) = gcm::encrypt(cipher(alg), kek, &iv, &cek, &[])?;

        header.set_iv(Base64Url::from_raw(iv));
        header.set_tag(Base64Url::from_raw(tag));

        Ok(WrapOutcome::Wrapped { cek, encrypted_key })
    }

    fn unwrap_cek(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        header: &Header,
        encrypted_key: &[u8],
        config: &Config,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        key.require_operation(KeyOperation::UnwrapKey)?;
        let kek = wrapping_key(key, alg, config)?;

        let iv = header.iv().ok_or_else(error::malformed)?;
        let tag = header.tag().ok_or_else(error::malformed)?;
        if iv.len() != IV_LEN || tag.len() != TAG_LEN {
            return Err(error::malformed());
        }

        let cek = Zeroizing::new(gcm::decrypt(
            cipher(alg),
            kek,
            iv,
            encrypted_key,
            tag,
            &[],
        )?);
        if cek.len() != enc.key_len() {
            return Err(error::decryption_failed());
        }
        Ok(cek)
    }
}
