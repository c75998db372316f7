//! Shared machinery for parsing protected JOSE headers
//!
//! Both compact engines and the JWT facade classify a token by decoding
//! its first segment and inspecting `alg` before committing to a typed
//! header, so the error kinds stay distinct: broken base64/JSON is a
//! malformed token, while a well-formed header naming an algorithm this
//! crate does not implement is unsupported.

use serde_json::Value;
use sigelo_base64::Base64Url;

use crate::{error, jwa, Error};

/// Header parameter names this implementation understands
///
/// A `crit` entry naming anything else rejects the token.
pub(crate) const RECOGNIZED_PARAMS: &[&str] = &[
    "alg",
    "enc",
    "zip",
    "typ",
    "cty",
    "kid",
    "jku",
    "jwk",
    "x5u",
    "x5c",
    "x5t",
    "x5t#S256",
    "crit",
    "epk",
    "apu",
    "apv",
    "p2s",
    "p2c",
    "iv",
    "tag",
];

/// Decodes a protected header segment and classifies its `alg`
pub(crate) fn decode_protected(segment: &str) -> Result<(Value, jwa::Algorithm), Error> {
    let raw = Base64Url::from_encoded(segment).map_err(error::malformed_with)?;
    let value: Value = serde_json::from_slice(raw.as_slice()).map_err(error::malformed_with)?;

    if !value.is_object() {
        return Err(error::malformed());
    }

    let name = value
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(error::malformed)?;

    let alg = jwa::Algorithm::from_name(name)
        .ok_or_else(|| error::unsupported_algorithm(name))?;

    Ok((value, alg))
}

/// Rejects `crit` entries naming parameters this crate does not recognize
pub(crate) fn check_crit(crit: Option<&Vec<String>>) -> Result<(), Error> {
    if let Some(entries) = crit {
        for name in entries {
            if !RECOGNIZED_PARAMS.contains(&name.as_str()) {
                return Err(error::unsupported_critical(name));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        Base64Url::from_raw(json.as_bytes().to_vec()).to_string()
    }

    #[test]
    fn classifies_signing_header() {
        let (_, alg) = decode_protected(&encode(r#"{"alg":"HS256"}"#)).unwrap();
        assert_eq!(alg, jwa::Algorithm::HS256);
    }

    #[test]
    fn classifies_none_header() {
        let (_, alg) = decode_protected(&encode(r#"{"alg":"none"}"#)).unwrap();
        assert_eq!(alg, jwa::Algorithm::None);
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let err = decode_protected(&encode(r#"{"alg":"XS256"}"#)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm { alg } if alg == "XS256"));
    }

    #[test]
    fn rejects_missing_algorithm() {
        let err = decode_protected(&encode(r#"{"typ":"JWT"}"#)).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding { .. }));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_protected("not~base64").unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding { .. }));
    }

    #[test]
    fn rejects_non_object_header() {
        let err = decode_protected(&encode("[1,2]")).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding { .. }));
    }

    #[test]
    fn crit_accepts_recognized_names() {
        let crit = vec!["p2c".to_string(), "zip".to_string()];
        check_crit(Some(&crit)).unwrap();
        check_crit(None).unwrap();
    }

    #[test]
    fn crit_rejects_unknown_names() {
        let crit = vec!["exp".to_string()];
        let err = check_crit(Some(&crit)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCritical { name } if name == "exp"));
    }
}
