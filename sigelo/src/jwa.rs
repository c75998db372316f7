//! Implementations of the JSON Web Algorithms (JWA) standard
//!
//! The specifications for these algorithms can be found in [RFC7518][]
//! and, for Ed25519, [RFC8037][].
//!
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC8037]: https://tools.ietf.org/html/rfc8037

pub mod ec;
pub mod hmac;
pub mod okp;
pub mod rsa;
pub mod symmetric;

mod algorithm;
mod usage;

#[doc(inline)]
pub use ec::EllipticCurve;
#[doc(inline)]
pub use okp::Okp;
#[doc(inline)]
pub use rsa::Rsa;
#[doc(inline)]
pub use symmetric::Symmetric;

pub use algorithm::Algorithm;
pub use usage::{KeyOperation, Usage};
