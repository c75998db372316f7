//! This crate implements the Javascript/JSON Object Signing and
//! Encryption (JOSE) standards, including:
//!
//! * JSON Web Signature (JWS): [RFC7515][]
//! * JSON Web Encryption (JWE): [RFC7516][]
//! * JSON Web Key (JWK): [RFC7517][]
//! * JSON Web Algorithms (JWA): [RFC7518][]
//! * JSON Web Token (JWT): [RFC7519][]
//!
//! Only the compact serializations are implemented; the JSON
//! serializations are an extension point.
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515
//! [RFC7516]: https://tools.ietf.org/html/rfc7516
//! [RFC7517]: https://tools.ietf.org/html/rfc7517
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! # Example
//!
//! ```
//! use sigelo::{jwa, jws, jwt, Config, Jwk, Token};
//!
//! # fn main() -> Result<(), sigelo::Error> {
//! let key = Jwk::from(jwa::Symmetric::generate(32)?).with_key_id("demo");
//!
//! let claims = jwt::ClaimsSet::new()
//!     .with_issuer("authority")
//!     .with_subject("sigelo");
//! let token = claims.sign(&jws::Header::new(jws::Algorithm::HS256), &key)?;
//!
//! match Token::parse(token.as_str())? {
//!     Token::Signed(signed) => {
//!         let verified = signed.verify(&key, &Config::default())?;
//!         assert_eq!(verified.subject(), Some("sigelo"));
//!         assert_eq!(signed.untrusted_header().key_id().map(|k| k.as_str()), Some("demo"));
//!     }
//!     _ => unreachable!("an HS256 token parses as signed"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The engines hold no state of their own: a [`Jwk`] and a [`Config`]
//! may be shared freely across threads, and no operation suspends or
//! performs I/O.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod config;
pub mod error;
mod header;
pub mod jwa;
pub mod jwe;
pub mod jwk;
mod jwks;
pub mod jws;
pub mod jwt;
mod kdf;
mod util;

#[cfg(test)]
pub(crate) mod test;

pub use config::Config;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use jwk::Jwk;
#[doc(inline)]
pub use jwks::Jwks;
#[doc(inline)]
pub use jwt::Token;
