//! # sigelo_base64
//!
//! Byte buffers that live in memory as raw bytes and travel as base64.
//!
//! The compact JOSE serializations are built out of unpadded base64url
//! segments, so the cost of moving between the raw and encoded forms is
//! paid constantly. The types in this crate hold the raw bytes and only
//! produce the encoded form on demand: serialization, `Display`, and
//! `Debug` render base64, while `from_encoded` is the single place a
//! string is decoded and validated.
//!
//! ```
//! use sigelo_base64::Base64Url;
//!
//! let data = Base64Url::from_raw(b"hello, world!".to_vec());
//! assert_eq!(data.to_string(), "aGVsbG8sIHdvcmxkIQ");
//!
//! let decoded = Base64Url::from_encoded("aGVsbG8sIHdvcmxkIQ").unwrap();
//! assert_eq!(decoded.as_slice(), b"hello, world!");
//! ```
//!
//! Decoding is strict: padding characters, characters outside the
//! alphabet, and impossible lengths (≡ 1 mod 4) are rejected, so that
//! `encode(decode(s)) == s` holds for every accepted `s`.
//!
//! With the `serde` feature enabled, the types serialize as their encoded
//! string form and deserialize back through the same strict decoder.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

use std::{error::Error, fmt};

/// The string was not valid base64 data in the expected alphabet
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidBase64Data {
    source: ::base64::DecodeError,
}

impl From<::base64::DecodeError> for InvalidBase64Data {
    fn from(err: ::base64::DecodeError) -> Self {
        Self { source: err }
    }
}

impl fmt::Display for InvalidBase64Data {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid base64 data")
    }
}

impl Error for InvalidBase64Data {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

macro_rules! b64_pair {
    {
        $(#[$meta:meta])*
        $v:vis struct $ty:ident ($config:expr, $is_padded:expr);

        $(#[$meta_ref:meta])*
        $v_ref:vis struct $ty_ref:ident;
    } => {
        $(#[$meta])*
        ///
        /// The buffer holds raw bytes; conversion to the base64 form
        /// happens on display and serialization, conversion from it in
        /// `from_encoded`.
        #[derive(Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        $v struct $ty(Vec<u8>);

        impl $ty {
            /// Wraps an owned byte buffer
            ///
            /// To decode an already encoded value, use [`Self::from_encoded`].
            #[inline]
            pub fn from_raw<T: Into<Vec<u8>>>(raw: T) -> Self {
                Self(raw.into())
            }

            /// Decodes an encoded value into a new buffer
            ///
            /// # Errors
            ///
            /// Returns an error if the input contains characters outside
            /// the alphabet, unexpected padding, or has an impossible
            /// length.
            pub fn from_encoded<T: AsRef<[u8]>>(enc: T) -> Result<Self, InvalidBase64Data> {
                let data = ::base64::decode_config(enc, $config)?;
                Ok(Self(data))
            }

            /// Unwraps the underlying buffer
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> Vec<u8> {
                self.0
            }

            /// The length of the encoding of a buffer of `len` raw bytes
            #[inline]
            #[must_use]
            pub fn calc_encoded_len(len: usize) -> usize {
                if $is_padded {
                    (len + 2) / 3 * 4
                } else {
                    let whole = len / 3 * 4;
                    match len % 3 {
                        0 => whole,
                        r => whole + r + 1,
                    }
                }
            }
        }

        impl From<Vec<u8>> for $ty {
            #[inline]
            fn from(buf: Vec<u8>) -> Self {
                Self(buf)
            }
        }

        impl From<&'_ [u8]> for $ty {
            #[inline]
            fn from(slice: &[u8]) -> Self {
                Self::from_raw(slice.to_vec())
            }
        }

        impl From<&'_ $ty_ref> for $ty {
            #[inline]
            fn from(val: &$ty_ref) -> Self {
                Self::from(val.as_slice())
            }
        }

        impl From<$ty> for Vec<u8> {
            #[inline]
            fn from(val: $ty) -> Self {
                val.0
            }
        }

        impl<'a> From<&'a [u8]> for &'a $ty_ref {
            #[inline]
            fn from(slice: &'a [u8]) -> Self {
                $ty_ref::from_slice(slice)
            }
        }

        impl ::std::borrow::Borrow<$ty_ref> for $ty {
            #[inline]
            fn borrow(&self) -> &$ty_ref {
                self
            }
        }

        impl ::std::ops::Deref for $ty {
            type Target = $ty_ref;

            #[inline]
            fn deref(&self) -> &Self::Target {
                $ty_ref::from_slice(self.0.as_slice())
            }
        }

        impl ::std::ops::DerefMut for $ty {
            #[inline]
            fn deref_mut(&mut self) -> &mut $ty_ref {
                $ty_ref::from_mut_slice(self.0.as_mut_slice())
            }
        }

        impl AsRef<$ty_ref> for $ty {
            #[inline]
            fn as_ref(&self) -> &$ty_ref {
                self
            }
        }

        impl ::std::fmt::Display for $ty {
            #[inline]
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&**self, f)
            }
        }

        impl ::std::fmt::Debug for $ty {
            #[inline]
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&**self, f)
            }
        }

        #[cfg(feature = "serde")]
        impl ::serde::Serialize for $ty {
            #[inline]
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.as_ref().serialize(serializer)
            }
        }

        /// Decodes a base64 string into a raw byte buffer
        #[cfg(feature = "serde")]
        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let enc: ::std::borrow::Cow<'de, str> =
                    ::serde::Deserialize::deserialize(deserializer)?;
                let data = ::base64::decode_config(enc.as_bytes(), $config)
                    .map_err(::serde::de::Error::custom)?;
                Ok(Self(data))
            }
        }

        $(#[$meta_ref])*
        ///
        /// The slice holds raw bytes; conversion to the base64 form
        /// happens on display and serialization.
        #[derive(Hash, PartialEq, Eq)]
        #[repr(transparent)]
        $v_ref struct $ty_ref([u8]);

        impl $ty_ref {
            /// Reinterprets the slice as the raw form of this encoding
            #[allow(unsafe_code)]
            #[inline]
            #[must_use]
            pub fn from_slice(raw: &[u8]) -> &Self {
                let ptr: *const [u8] = raw;

                // Safe due to the transparent representation over `[u8]`.
                unsafe { &*(ptr as *const Self) }
            }

            /// Reinterprets the mutable slice as the raw form of this encoding
            #[allow(unsafe_code)]
            #[inline]
            #[must_use]
            pub fn from_mut_slice(raw: &mut [u8]) -> &mut Self {
                let ptr: *mut [u8] = raw;

                // Safe due to the transparent representation over `[u8]`.
                unsafe { &mut *(ptr as *mut Self) }
            }

            /// The length of this buffer's encoding
            #[inline]
            #[must_use]
            pub fn encoded_len(&self) -> usize {
                $ty::calc_encoded_len(self.0.len())
            }

            /// Provides access to the underlying slice
            #[inline]
            #[must_use]
            pub const fn as_slice(&self) -> &[u8] {
                &self.0
            }

            /// Provides mutable access to the underlying slice
            #[inline]
            pub fn as_mut_slice(&mut self) -> &mut [u8] {
                &mut self.0
            }
        }

        impl ToOwned for $ty_ref {
            type Owned = $ty;

            #[inline]
            fn to_owned(&self) -> Self::Owned {
                $ty(self.0.to_owned())
            }
        }

        impl PartialEq<$ty_ref> for $ty {
            #[inline]
            fn eq(&self, other: &$ty_ref) -> bool {
                self.0 == &other.0
            }
        }

        impl PartialEq<$ty> for $ty_ref {
            #[inline]
            fn eq(&self, other: &$ty) -> bool {
                &self.0 == other.0.as_slice()
            }
        }

        impl ::std::fmt::Display for $ty_ref {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(&::base64::encode_config(&self.0, $config))
            }
        }

        impl ::std::fmt::Debug for $ty_ref {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "`{}`", ::base64::encode_config(&self.0, $config))
            }
        }

        #[cfg(feature = "serde")]
        impl ::serde::Serialize for $ty_ref {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&::base64::encode_config(&self.0, $config))
            }
        }
    }
}

b64_pair! {
    /// Owned bytes rendered as standard base64 with padding
    ///
    /// Alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `+`, `/`; padded with `=`
    pub struct Base64(base64::STANDARD, true);

    /// Borrowed bytes rendered as standard base64 with padding
    ///
    /// Alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `+`, `/`; padded with `=`
    pub struct Base64Ref;
}

b64_pair! {
    /// Owned bytes rendered as unpadded URL-safe base64
    ///
    /// Alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `-`, `_`
    pub struct Base64Url(base64::URL_SAFE_NO_PAD, false);

    /// Borrowed bytes rendered as unpadded URL-safe base64
    ///
    /// Alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `-`, `_`
    pub struct Base64UrlRef;
}
