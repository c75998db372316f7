//! The `zip` header parameter: raw DEFLATE payload compression
//!
//! Inflation is bounded so a small token cannot be inflated into an
//! arbitrarily large plaintext.

use std::io::{Read, Write};

use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};
use serde::{Deserialize, Serialize};

use crate::{error, Error};

/// Payload compression algorithms
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CompressionAlgorithm {
    /// Raw DEFLATE (RFC 1951)
    #[serde(rename = "DEF")]
    Deflate,
}

pub(crate) fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(error::provider)?;
    encoder.finish().map_err(error::provider)
}

pub(crate) fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let decoder = DeflateDecoder::new(data);

    decoder
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(error::malformed_with)?;

    if out.len() > limit {
        return Err(Error::CompressionExpansionLimit);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let data = b"a payload that deflates and inflates unchanged".repeat(4);
        let compressed = compress(&data).unwrap();
        let inflated = decompress(&compressed, 10_000).unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn bounds_expansion() {
        // Highly compressible input: a few hundred bytes of DEFLATE
        // inflating to a megabyte.
        let bomb = compress(&vec![0u8; 1 << 20]).unwrap();
        assert!(bomb.len() < 4096);

        let err = decompress(&bomb, 250_000).unwrap_err();
        assert!(matches!(err, Error::CompressionExpansionLimit));

        // A generous limit lets the same data through.
        assert_eq!(decompress(&bomb, 1 << 21).unwrap().len(), 1 << 20);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            decompress(b"\xff\xff\xff\xff", 1024),
            Err(Error::MalformedEncoding { .. })
        ));
    }
}
