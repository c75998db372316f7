//! Policy knobs recognized by the engines
//!
//! A [`Config`] is an inert value passed into the verification and
//! decryption entry points. It carries no global state; two callers with
//! different policies can share every other object in this crate.

use crate::{error, Error};

/// Policy options for token processing
///
/// The defaults reject `alg: none` and `RSA1_5`, bound PBES2 iteration
/// counts to `1000..=1_000_000`, and cap decompressed payloads at 250 000
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Config {
    allow_none: bool,
    allow_rsa1_5: bool,
    min_pbes2_iterations: u32,
    max_pbes2_iterations: u32,
    max_decompressed_size: usize,
    max_symmetric_key_bits: Option<usize>,
    ecdsa_require_low_s: bool,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            allow_none: false,
            allow_rsa1_5: false,
            min_pbes2_iterations: 1000,
            max_pbes2_iterations: 1_000_000,
            max_decompressed_size: 250_000,
            max_symmetric_key_bits: None,
            ecdsa_require_low_s: false,
        }
    }
}

impl Config {
    /// A configuration with the default policy
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permits `alg: none` tokens to release their claims
    #[inline]
    pub fn allow_none(self) -> Self {
        Self {
            allow_none: true,
            ..self
        }
    }

    /// Permits the deprecated `RSA1_5` key management algorithm
    #[inline]
    pub fn allow_rsa1_5(self) -> Self {
        Self {
            allow_rsa1_5: true,
            ..self
        }
    }

    /// Bounds the PBES2 `p2c` iteration count accepted during decryption
    #[inline]
    pub fn with_pbes2_iteration_bounds(self, min: u32, max: u32) -> Self {
        Self {
            min_pbes2_iterations: min,
            max_pbes2_iterations: max,
            ..self
        }
    }

    /// Bounds the size a compressed payload may inflate to
    #[inline]
    pub fn with_max_decompressed_size(self, bytes: usize) -> Self {
        Self {
            max_decompressed_size: bytes,
            ..self
        }
    }

    /// Rejects symmetric keys larger than the given bit count
    #[inline]
    pub fn with_max_symmetric_key_bits(self, bits: usize) -> Self {
        Self {
            max_symmetric_key_bits: Some(bits),
            ..self
        }
    }

    /// Requires ECDSA signatures to carry a low `s` component
    #[inline]
    pub fn require_low_s(self) -> Self {
        Self {
            ecdsa_require_low_s: true,
            ..self
        }
    }

    /// Whether `alg: none` tokens may release their claims
    #[must_use]
    pub fn none_allowed(&self) -> bool {
        self.allow_none
    }

    /// Whether `RSA1_5` is permitted
    #[must_use]
    pub fn rsa1_5_allowed(&self) -> bool {
        self.allow_rsa1_5
    }

    /// The bound on inflated payload size
    #[must_use]
    pub fn max_decompressed_size(&self) -> usize {
        self.max_decompressed_size
    }

    /// Whether ECDSA signatures must carry a low `s` component
    #[must_use]
    pub fn low_s_required(&self) -> bool {
        self.ecdsa_require_low_s
    }

    pub(crate) fn check_pbes2_iterations(&self, p2c: u32) -> Result<(), Error> {
        if p2c == 0 {
            return Err(Error::InvalidIterationCount);
        }
        if p2c < self.min_pbes2_iterations || p2c > self.max_pbes2_iterations {
            return Err(Error::IterationPolicyExceeded);
        }
        Ok(())
    }

    pub(crate) fn check_symmetric_key(&self, len_bytes: usize) -> Result<(), Error> {
        match self.max_symmetric_key_bits {
            Some(max) if len_bytes * 8 > max => Err(error::invalid_key_length()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = Config::default();
        assert!(!config.none_allowed());
        assert!(!config.rsa1_5_allowed());
        assert_eq!(config.max_decompressed_size(), 250_000);
        assert!(config.check_pbes2_iterations(1000).is_ok());
        assert!(config.check_pbes2_iterations(1_000_000).is_ok());
        assert!(matches!(
            config.check_pbes2_iterations(999),
            Err(Error::IterationPolicyExceeded)
        ));
        assert!(matches!(
            config.check_pbes2_iterations(10_000_000),
            Err(Error::IterationPolicyExceeded)
        ));
        assert!(matches!(
            config.check_pbes2_iterations(0),
            Err(Error::InvalidIterationCount)
        ));
    }

    #[test]
    fn symmetric_key_bound_is_enforced() {
        let config = Config::default().with_max_symmetric_key_bits(256);
        assert!(config.check_symmetric_key(32).is_ok());
        assert!(matches!(
            config.check_symmetric_key(33),
            Err(Error::InvalidKeyLength)
        ));
    }
}
