//! The AES-GCM content encryption methods (RFC 7518 §5.3)

use openssl::symm::{self, Cipher};

use crate::{error, Error};

const TAG_LEN: usize = 16;

pub(crate) fn encrypt(
    cipher: Cipher,
    cek: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let mut tag = vec![0u8; TAG_LEN];
    let ciphertext = symm::encrypt_aead(cipher, cek, Some(iv), aad, plaintext, &mut tag)?;
    Ok((ciphertext, tag))
}

pub(crate) fn decrypt(
    cipher: Cipher,
    cek: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, Error> {
    symm::decrypt_aead(cipher, cek, Some(iv), aad, ciphertext, tag)
        .map_err(|_| error::decryption_failed())
}
