//! The Concat KDF (NIST SP 800-56A §5.8.1) used by ECDH-ES
//!
//! Each datum in OtherInfo is length-prefixed with a 32-bit big-endian
//! count; an absent `apu`/`apv` contributes a zero-length datum, prefix
//! included. SuppPubInfo is the derived key length in bits and
//! SuppPrivInfo is empty.

use ring::digest;
use zeroize::Zeroizing;

use crate::{util, Error};

/// Derives `keydata_bits / 8` bytes from the shared secret `z`
///
/// `algorithm_id` is the `enc` name in direct key agreement and the
/// `alg` name in key-agreement-with-key-wrapping.
pub(crate) fn derive(
    z: &[u8],
    algorithm_id: &str,
    apu: Option<&[u8]>,
    apv: Option<&[u8]>,
    keydata_bits: u32,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let other_info = util::concat(&[
        &framed(algorithm_id.as_bytes()),
        &framed(apu.unwrap_or_default()),
        &framed(apv.unwrap_or_default()),
        &util::u32_be(keydata_bits),
    ]);

    const H_LEN: usize = 32;

    let keydata_len = (keydata_bits as usize + 7) / 8;
    let reps = (keydata_len + H_LEN - 1) / H_LEN;

    let mut derived = Zeroizing::new(Vec::with_capacity(reps * H_LEN));
    for counter in 1..=reps as u32 {
        let round = util::concat(&[&util::u32_be(counter), z, &other_info]);
        derived.extend_from_slice(digest::digest(&digest::SHA256, &round).as_ref());
    }
    derived.truncate(keydata_len);

    Ok(derived)
}

/// A length-prefixed OtherInfo datum
fn framed(data: &[u8]) -> Vec<u8> {
    util::concat(&[&util::u32_be(data.len() as u32), data])
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7518 Appendix C: the ECDH shared secret Z for the example keys.
    const Z: [u8; 32] = [
        158, 86, 217, 29, 129, 113, 53, 211, 114, 131, 66, 131, 191, 132, 38, 156, 251, 49, 110,
        163, 218, 128, 106, 72, 246, 218, 167, 121, 140, 254, 144, 196,
    ];

    #[test]
    fn matches_rfc7518_appendix_c() {
        let derived = derive(&Z, "A128GCM", Some(b"Alice"), Some(b"Bob"), 128).unwrap();
        assert_eq!(
            derived.as_slice(),
            &[86, 170, 141, 234, 248, 35, 109, 32, 92, 34, 40, 205, 113, 167, 16, 26][..]
        );
    }

    #[test]
    fn absent_party_info_is_a_zero_length_datum() {
        // Absent and empty party info must derive identically: both are
        // a zero-length datum behind a 00000000 prefix.
        let absent = derive(&Z, "A128GCM", None, None, 128).unwrap();
        let empty = derive(&Z, "A128GCM", Some(b""), Some(b""), 128).unwrap();
        assert_eq!(absent.as_slice(), empty.as_slice());
        assert_ne!(
            absent.as_slice(),
            derive(&Z, "A128GCM", Some(b"Alice"), Some(b"Bob"), 128)
                .unwrap()
                .as_slice()
        );
    }

    #[test]
    fn wider_keys_span_multiple_rounds() {
        let derived = derive(&Z, "ECDH-ES+A256KW", None, None, 384).unwrap();
        assert_eq!(derived.len(), 48);

        // The first round is a prefix of the wider derivation.
        let narrow = derive(&Z, "ECDH-ES+A256KW", None, None, 256).unwrap();
        assert_eq!(&derived.as_slice()[..32], narrow.as_slice());
    }

    #[test]
    fn algorithm_id_separates_derivations() {
        let a = derive(&Z, "A128GCM", None, None, 128).unwrap();
        let b = derive(&Z, "A128KW", None, None, 128).unwrap();
        assert_ne!(a.as_slice(), b.as_slice());
    }
}
