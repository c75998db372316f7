//! ECDH-ES key agreement (`ECDH-ES`, `ECDH-ES+A128KW`/`+A192KW`/`+A256KW`)
//!
//! The sender generates an ephemeral key on the recipient's curve,
//! agrees on a shared secret, and feeds it through the Concat KDF. In
//! direct mode the derived bits are the CEK; in key-wrapping mode they
//! are a KEK that AES-wraps a random CEK. The ephemeral public key
//! travels in the header's `epk` parameter.

use openssl::{derive::Deriver, pkey::PKey};
use zeroize::Zeroizing;

use super::{aes_kw, Algorithm, KeyManagement, WrapOutcome};
use crate::{
    error,
    jwa::{ec, KeyOperation},
    jwe::{enc::Encryption, EphemeralKey, Header},
    kdf::concat,
    util, Config, Error, Jwk,
};

pub(crate) struct EcdhEs;

/// Runs the raw ECDH agreement between a private key and a peer point
fn agree(private: &ec::PrivateKey, peer: &ec::PublicKey) -> Result<Zeroizing<Vec<u8>>, Error> {
    let own = private.to_openssl_pkey()?;
    let peer = PKey::from_ec_key(peer.to_openssl_eckey()?)?;

    let mut deriver = Deriver::new(&own)?;
    deriver.set_peer(&peer)?;
    Ok(Zeroizing::new(deriver.derive_to_vec()?))
}

/// The Concat KDF parameters for this algorithm: the AlgorithmID and the
/// derived key width in bits
fn kdf_parameters(alg: Algorithm, enc: Encryption) -> (&'static str, usize) {
    match alg.wrap_key_len() {
        // Key agreement with key wrapping binds the wrap algorithm.
        Some(kek_len) => (alg.name(), kek_len),
        // Direct key agreement binds the content encryption method.
        None => (enc.name(), enc.key_len()),
    }
}

fn derive_shared(
    alg: Algorithm,
    enc: Encryption,
    z: &[u8],
    header: &Header,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let (algorithm_id, len) = kdf_parameters(alg, enc);
    concat::derive(z, algorithm_id, header.apu(), header.apv(), (len * 8) as u32)
}

impl KeyManagement for EcdhEs {
    fn wrap(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        header: &mut Header,
        _config: &Config,
    ) -> Result<WrapOutcome, Error> {
        key.require_any_operation(&[KeyOperation::DeriveBits, KeyOperation::DeriveKey])?;

        let recipient = key.as_elliptic_curve()?.public_key();
        let ephemeral = ec::PrivateKey::generate(recipient.curve())?;

        let z = agree(&ephemeral, recipient)?;
        header.set_epk(EphemeralKey::new(ephemeral.public_key().clone()));
        let derived = derive_shared(alg, enc, &z, header)?;

        match alg {
            Algorithm::EcdhEs => Ok(WrapOutcome::Direct(derived)),
            _ => {
                let cek = Zeroizing::new(util::rand_bytes(enc.key_len())?);
                let encrypted_key = aes_kw::wrap(&derived, &cek)?;
                Ok(WrapOutcome::Wrapped { cek, encrypted_key })
            }
        }
    }

    fn unwrap_cek(
        &self,
        alg: Algorithm,
        key: &Jwk,
        enc: Encryption,
        header: &Header,
        encrypted_key: &[u8],
        _config: &Config,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        key.require_any_operation(&[KeyOperation::DeriveBits, KeyOperation::DeriveKey])?;

        let ecdh = key.as_elliptic_curve()?;
        let private = ecdh.private_key().ok_or_else(error::key_type_mismatch)?;

        let epk = header.epk().ok_or_else(error::malformed)?;
        if epk.public_key().curve() != ecdh.curve() {
            return Err(error::key_type_mismatch());
        }

        let z = agree(private, epk.public_key()).map_err(|_| error::decryption_failed())?;
        let derived = derive_shared(alg, enc, &z, header)?;

        match alg {
            Algorithm::EcdhEs => {
                // Direct key agreement carries no encrypted key.
                if !encrypted_key.is_empty() {
                    return Err(error::malformed());
                }
                Ok(derived)
            }
            _ => {
                let cek = aes_kw::unwrap(&derived, encrypted_key)?;
                if cek.len() != enc.key_len() {
                    return Err(error::decryption_failed());
                }
                Ok(cek)
            }
        }
    }
}
