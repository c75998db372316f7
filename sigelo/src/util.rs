//! Byte-level helpers shared by the engines

use lazy_static::lazy_static;
use ring::rand::{SecureRandom, SystemRandom};

use crate::{error, Error};

lazy_static! {
    static ref RNG: SystemRandom = SystemRandom::new();
}

/// Fills the buffer from the shared CSPRNG
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), Error> {
    RNG.fill(buf)
        .map_err(|_| error::provider("random number generator failure"))
}

/// Returns `len` bytes from the shared CSPRNG
pub(crate) fn rand_bytes(len: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; len];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Concatenates the given segments, skipping empty ones
pub(crate) fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(len);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Big-endian encoding of a 32-bit integer
pub(crate) fn u32_be(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Big-endian encoding of a 64-bit integer
pub(crate) fn u64_be(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Constant-time equality over byte slices
///
/// Differing lengths compare unequal without inspecting contents.
#[must_use]
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    ring::constant_time::verify_slices_are_equal(a, b).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_joins_in_order() {
        assert_eq!(concat(&[&[1, 2], &[3, 4]]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn concat_skips_empty_segments() {
        assert_eq!(concat(&[&[1, 2], &[], &[3, 4]]), vec![1, 2, 3, 4]);
        assert_eq!(concat(&[]), Vec::<u8>::new());
    }

    #[test]
    fn big_endian_encodings() {
        assert_eq!(u32_be(1), [0, 0, 0, 1]);
        assert_eq!(u32_be(0x0102_0304), [1, 2, 3, 4]);
        // 336 bits, the RFC 7518 B.1 AL value
        assert_eq!(u64_be(336), [0, 0, 0, 0, 0, 0, 1, 0x50]);
    }

    #[test]
    fn constant_time_eq_checks_length_and_content() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn rand_bytes_produces_requested_length() {
        let a = rand_bytes(16).unwrap();
        let b = rand_bytes(16).unwrap();
        assert_eq!(a.len(), 16);
        // Colliding 128-bit draws would indicate a broken RNG hookup.
        assert_ne!(a, b);
    }
}
