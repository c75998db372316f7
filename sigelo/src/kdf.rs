//! Key derivation functions used by the JWE key-management strategies
//!
//! [`pbkdf2`] backs the PBES2 family; [`concat`] is the NIST SP 800-56A
//! single-step KDF used by ECDH-ES. Both are implemented over the HMAC
//! and digest primitives because their block structure (formatted salts,
//! counters, OtherInfo framing) is part of the JOSE contract.

pub(crate) mod concat;
pub(crate) mod pbkdf2;
