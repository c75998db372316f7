//! Password-Based Key Derivation Function 2 (RFC 8018 §5.2)
//!
//! PBES2 derives its key-encryption keys here. The salt handed to the
//! PRF is not the raw `p2s` value: it is framed as
//! `UTF8(alg) || 0x00 || p2s`, binding the derived key to the PBES2
//! variant in use.

use zeroize::Zeroizing;

use crate::{jwa::hmac, jwe, util, Error};

/// The minimum raw salt length in bytes
const MIN_SALT_LENGTH: usize = 8;

/// The largest derivable key, `(2³² − 1) · hLen`, as a block count
const MAX_BLOCK_COUNT: u64 = u32::MAX as u64;

/// Formats the raw `p2s` salt for use in PBKDF2
///
/// # Errors
///
/// Returns [`Error::InvalidSalt`] when the raw salt is shorter than
/// eight bytes.
pub(crate) fn format_salt(alg: jwe::Algorithm, salt: &[u8]) -> Result<Vec<u8>, Error> {
    if salt.len() < MIN_SALT_LENGTH {
        return Err(Error::InvalidSalt);
    }

    Ok(util::concat(&[alg.name().as_bytes(), &[0u8], salt]))
}

/// Derives `dk_len` bytes from the password and formatted salt
///
/// # Errors
///
/// Returns [`Error::InvalidIterationCount`] for a zero iteration count
/// and [`Error::InvalidKeyLength`] when `dk_len` exceeds the RFC 8018
/// bound.
pub(crate) fn derive(
    password: &[u8],
    formatted_salt: &[u8],
    iterations: u32,
    dk_len: usize,
    prf: hmac::SigningAlgorithm,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    if iterations == 0 {
        return Err(Error::InvalidIterationCount);
    }

    let h_len = prf.digest_size();
    let blocks = (dk_len + h_len - 1) / h_len;
    if blocks as u64 > MAX_BLOCK_COUNT {
        return Err(crate::error::invalid_key_length());
    }

    let mut derived = Zeroizing::new(Vec::with_capacity(blocks * h_len));
    for block_index in 1..=blocks as u32 {
        let block = extract_block(password, formatted_salt, iterations, block_index, prf);
        derived.extend_from_slice(&block);
    }
    derived.truncate(dk_len);

    Ok(derived)
}

/// One block of the derived key:
/// `F(P, S, c, i) = U₁ ⊕ U₂ ⊕ … ⊕ U_c` with
/// `U₁ = PRF(P, S || INT32BE(i))` and `Uⱼ = PRF(P, Uⱼ₋₁)`.
fn extract_block(
    password: &[u8],
    formatted_salt: &[u8],
    iterations: u32,
    block_index: u32,
    prf: hmac::SigningAlgorithm,
) -> Zeroizing<Vec<u8>> {
    let first = util::concat(&[formatted_salt, &util::u32_be(block_index)]);

    let mut current = Zeroizing::new(prf.digest(password, &first));
    let mut folded = current.clone();

    for _ in 1..iterations {
        current = Zeroizing::new(prf.digest(password, &current));
        for (acc, u) in folded.iter_mut().zip(current.iter()) {
            *acc ^= u;
        }
    }

    folded
}
