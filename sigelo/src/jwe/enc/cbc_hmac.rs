//! The AES-CBC + HMAC-SHA2 composite methods (RFC 7518 §5.2)
//!
//! The CEK splits in half: MAC key first, encryption key second. The
//! tag is the first half of `HMAC(MAC_KEY, AAD || IV || C || AL)` where
//! `AL` is the AAD bit length as a 64-bit big-endian integer. The MAC
//! is verified, in constant time, before any padding is touched.

use openssl::symm::{self, Cipher};

use crate::{error, jwa::hmac, util, Error};

pub(crate) fn encrypt(
    cipher: Cipher,
    mac: hmac::SigningAlgorithm,
    cek: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);

    let ciphertext = symm::encrypt(cipher, enc_key, Some(iv), plaintext)?;
    let tag = compute_tag(mac, mac_key, aad, iv, &ciphertext);

    Ok((ciphertext, tag))
}

pub(crate) fn decrypt(
    cipher: Cipher,
    mac: hmac::SigningAlgorithm,
    cek: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, Error> {
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);

    let expected = compute_tag(mac, mac_key, aad, iv, ciphertext);
    if !util::constant_time_eq(&expected, tag) {
        return Err(error::decryption_failed());
    }

    symm::decrypt(cipher, enc_key, Some(iv), ciphertext).map_err(|_| error::decryption_failed())
}

fn compute_tag(
    mac: hmac::SigningAlgorithm,
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Vec<u8> {
    let al = util::u64_be(aad.len() as u64 * 8);
    let input = util::concat(&[aad, iv, ciphertext, &al]);

    let mut tag = mac.digest(mac_key, &input);
    tag.truncate(mac.digest_size() / 2);
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7518 Appendix B.1
    const K: [u8; 32] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d,
        0x1e, 0x1f,
    ];
    const P: &[u8] = b"Live long and prosper.";
    const IV: [u8; 16] = [
        0x1a, 0xf3, 0x8c, 0x2d, 0xc2, 0xb9, 0x6f, 0xfd, 0xd8, 0x66, 0x94, 0x09, 0x23, 0x41, 0xbc,
        0x04,
    ];
    const A: &[u8] = b"The second principle of Auguste Kerckhoffs";
    const E: [u8; 32] = [
        0xc8, 0x0e, 0xdf, 0xa3, 0x2d, 0xdf, 0x39, 0xd5, 0xef, 0x00, 0xc0, 0xb4, 0x68, 0x83, 0x42,
        0x79, 0xa2, 0xe4, 0x6a, 0x1b, 0x80, 0x49, 0xf7, 0x92, 0xf7, 0x6b, 0xfe, 0x54, 0xb9, 0x03,
        0xa9, 0xc9,
    ];
    const T: [u8; 16] = [
        0x65, 0x2c, 0x3f, 0xa3, 0x6b, 0x0a, 0x7c, 0x5b, 0x32, 0x19, 0xfa, 0xb3, 0xa3, 0x0b, 0xc1,
        0xc4,
    ];

    #[test]
    fn matches_rfc7518_appendix_b1() {
        let (ciphertext, tag) = encrypt(
            Cipher::aes_128_cbc(),
            hmac::SigningAlgorithm::HS256,
            &K,
            &IV,
            P,
            A,
        )
        .unwrap();

        assert_eq!(ciphertext, E);
        assert_eq!(tag, T);
    }

    #[test]
    fn decrypts_rfc7518_appendix_b1() {
        let plaintext = decrypt(
            Cipher::aes_128_cbc(),
            hmac::SigningAlgorithm::HS256,
            &K,
            &IV,
            &E,
            &T,
            A,
        )
        .unwrap();
        assert_eq!(plaintext, P);
    }

    #[test]
    fn rejects_tampered_tag_before_decryption() {
        let mut tag = T;
        tag[0] ^= 0x80;
        let err = decrypt(
            Cipher::aes_128_cbc(),
            hmac::SigningAlgorithm::HS256,
            &K,
            &IV,
            &E,
            &tag,
            A,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed));
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let mut ciphertext = E;
        ciphertext[5] ^= 0x01;
        let err = decrypt(
            Cipher::aes_128_cbc(),
            hmac::SigningAlgorithm::HS256,
            &K,
            &IV,
            &ciphertext,
            &T,
            A,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed));
    }
}
