//! Direct use of a shared symmetric key (`dir`)
//!
//! The provided key *is* the CEK, so the encrypted key segment is empty
//! and the key must be exactly as wide as the content encryption method
//! demands.

use zeroize::Zeroizing;

use super::{Algorithm, KeyManagement, WrapOutcome};
use crate::{
    error,
    jwa::KeyOperation,
    jwe::{enc::Encryption, Header},
    Config, Error, Jwk,
};

pub(crate) struct Direct;

impl Direct {
    fn content_key(key: &Jwk, enc: Encryption, config: &Config) -> Result<Zeroizing<Vec<u8>>, Error> {
        let secret = key.as_symmetric()?;
        config.check_symmetric_key(secret.len())?;
        if secret.len() != enc.key_len() {
            return Err(error::invalid_key_length());
        }

        Ok(Zeroizing::new(secret.as_slice().to_vec()))
    }
}

impl KeyManagement for Direct {
    fn wrap(
        &self,
        _alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        _header: &mut Header,
        config: &Config,
    ) -> Result<WrapOutcome, Error> {
        key.require_operation(KeyOperation::Encrypt)?;
        Ok(WrapOutcome::Direct(Self::content_key(key, enc, config)?))
    }

    fn unwrap_cek(
        &self,
        _alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        _header: &Header,
        encrypted_key: &[u8],
        config: &Config,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        key.require_operation(KeyOperation::Decrypt)?;

        // RFC 7516 §4.1.1: direct key agreement carries no encrypted key.
        if !encrypted_key.is_empty() {
            return Err(error::malformed());
        }

        Self::content_key(key, enc, config)
    }
}
