//! RSAES key management (`RSA-OAEP`, `RSA-OAEP-256`, `RSA1_5`)
//!
//! `RSA1_5` is kept for interoperability behind a policy switch and its
//! unwrap path substitutes a random CEK on any failure, so a padding
//! oracle sees the authenticated-decryption failure either way.

use openssl::{
    encrypt::{Decrypter, Encrypter},
    hash::MessageDigest,
    rsa::Padding,
};
use zeroize::{Zeroize, Zeroizing};

use super::{Algorithm, KeyManagement, WrapOutcome};
use crate::{
    error,
    jwa::KeyOperation,
    jwe::{enc::Encryption, Header},
    util, Config, Error, Jwk,
};

pub(crate) struct RsaEs;

fn check_policy(alg: Algorithm, config: &Config) -> Result<(), Error> {
    if alg == Algorithm::Rsa1_5 && !config.rsa1_5_allowed() {
        return Err(error::unsupported_algorithm(alg.name()));
    }
    Ok(())
}

fn configure_encrypter(alg: Algorithm, encrypter: &mut Encrypter) -> Result<(), Error> {
    match alg {
        Algorithm::Rsa1_5 => encrypter.set_rsa_padding(Padding::PKCS1)?,
        Algorithm::RsaOaep => encrypter.set_rsa_padding(Padding::PKCS1_OAEP)?,
        Algorithm::RsaOaep256 => {
            encrypter.set_rsa_padding(Padding::PKCS1_OAEP)?;
            encrypter.set_rsa_oaep_md(MessageDigest::sha256())?;
            encrypter.set_rsa_mgf1_md(MessageDigest::sha256())?;
        }
        _ => return Err(error::unsupported_algorithm(alg.name())),
    }
    Ok(())
}

fn configure_decrypter(alg: Algorithm, decrypter: &mut Decrypter) -> Result<(), Error> {
    match alg {
        Algorithm::Rsa1_5 => decrypter.set_rsa_padding(Padding::PKCS1)?,
        Algorithm::RsaOaep => decrypter.set_rsa_padding(Padding::PKCS1_OAEP)?,
        Algorithm::RsaOaep256 => {
            decrypter.set_rsa_padding(Padding::PKCS1_OAEP)?;
            decrypter.set_rsa_oaep_md(MessageDigest::sha256())?;
            decrypter.set_rsa_mgf1_md(MessageDigest::sha256())?;
        }
        _ => return Err(error::unsupported_algorithm(alg.name())),
    }
    Ok(())
}

impl KeyManagement for RsaEs {
    fn wrap(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        _header: &mut Header,
        config: &Config,
    ) -> Result<WrapOutcome, Error> {
        check_policy(alg, config)?;
        key.require_any_operation(&[KeyOperation::WrapKey, KeyOperation::Encrypt])?;

        let pkey = key.as_rsa()?.public_key().to_openssl_pkey()?;
        let mut encrypter = Encrypter::new(&pkey)?;
        configure_encrypter(alg, &mut encrypter)?;

        let cek = Zeroizing::new(util::rand_bytes(enc.key_len())?);
        let mut encrypted_key = vec![0u8; encrypter.encrypt_len(&cek)?];
        let written = encrypter.encrypt(&cek, &mut encrypted_key)?;
        encrypted_key.truncate(written);

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
        check_policy(alg, config)?;
        key.require_any_operation(&[KeyOperation::UnwrapKey, KeyOperation::Decrypt])?;

        let rsa = key.as_rsa()?;
        let private = rsa.private_key().ok_or_else(error::key_type_mismatch)?;
        let pkey = private.to_openssl_pkey()?;

        let mut decrypter = Decrypter::new(&pkey)?;
        configure_decrypter(alg, &mut decrypter)?;

        // Generated up front so the substitution adds no observable work
        // to the failure path.
        let fallback = Zeroizing::new(util::rand_bytes(enc.key_len())?);

        let mut buf = vec![0u8; pkey.size()];
        let outcome = decrypter.decrypt(encrypted_key, &mut buf);

        let cek = match outcome {
            Ok(len) if len == enc.key_len() => Zeroizing::new(buf[..len].to_vec()),
            _ if alg == Algorithm::Rsa1_5 => fallback,
            _ => {
                buf.zeroize();
                return Err(error::decryption_failed());
            }
        };
        buf.zeroize();

        Ok(cek)
    }
}
