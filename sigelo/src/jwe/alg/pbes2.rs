//! PBES2 password-based key management
//! (`PBES2-HS256+A128KW`/`-HS384+A192KW`/`-HS512+A256KW`)
//!
//! PBKDF2 turns the password into a KEK that AES-wraps a random CEK.
//! `p2s` carries the raw salt and `p2c` the iteration count; the count
//! is validated against the policy bounds on decryption to keep an
//! attacker-chosen header from dictating unbounded work.

use sigelo_base64::Base64Url;
use zeroize::Zeroizing;

use super::{aes_kw, Algorithm, KeyManagement, WrapOutcome};
use crate::{
    error,
    jwa::KeyOperation,
    jwe::{enc::Encryption, Header},
    kdf::pbkdf2,
    util, Config, Error, Jwk,
};

pub(crate) struct Pbes2;

/// Iterations applied when the caller does not choose a count
const DEFAULT_ITERATIONS: u32 = 8192;

/// Salt bytes generated when the caller does not supply `p2s`
const SALT_LEN: usize = 16;

fn derive_kek(
    alg: Algorithm,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let prf = alg
        .pbes2_prf()
        .ok_or_else(|| error::unsupported_algorithm(alg.name()))?;
    let kek_len = alg
        .wrap_key_len()
        .ok_or_else(|| error::unsupported_algorithm(alg.name()))?;

    let formatted = pbkdf2::format_salt(alg, salt)?;
    pbkdf2::derive(password, &formatted, iterations, kek_len, prf)
}

impl KeyManagement for Pbes2 {
    fn wrap(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        header: &mut Header,
        _config: &Config,
    ) -> Result<WrapOutcome, Error> {
        key.require_any_operation(&[KeyOperation::DeriveBits, KeyOperation::DeriveKey])?;
        let password = key.as_symmetric()?;

        let iterations = header.p2c().unwrap_or(DEFAULT_ITERATIONS);
        if iterations == 0 {
            return Err(Error::InvalidIterationCount);
        }
        let salt = match header.p2s() {
            Some(salt) => salt.to_vec(),
            None => util::rand_bytes(SALT_LEN)?,
        };

        let kek = derive_kek(alg, password.as_slice(), &salt, iterations)?;

        header.set_p2s(Base64Url::from_raw(salt));
        header.set_p2c(iterations);

        let cek = Zeroizing::new(util::rand_bytes(enc.key_len())?);
        let encrypted_key = aes_kw::wrap(&kek, &cek)?;

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
        key.require_any_operation(&[KeyOperation::DeriveBits, KeyOperation::DeriveKey])?;
        let password = key.as_symmetric()?;

        let salt = header.p2s().ok_or_else(error::malformed)?;
        let iterations = header.p2c().ok_or_else(error::malformed)?;
        config.check_pbes2_iterations(iterations)?;

        let kek = derive_kek(alg, password.as_slice(), salt, iterations)?;

        let cek = aes_kw::unwrap(&kek, encrypted_key)?;
        if cek.len() != enc.key_len() {
            return Err(error::decryption_failed());
        }
        Ok(cek)
    }
}
