use serde::{Deserialize, Serialize};

use crate::{jwa, jwk::KeyId, Jwk};

/// A JSON Web Key Set (JWKS)
///
/// A local collection of keys with best-match selection. Keys that fail
/// to parse (unknown `kty` or algorithm) are skipped rather than failing
/// the whole set, since published sets routinely carry entries for
/// algorithms a consumer does not implement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Jwks {
    #[serde(deserialize_with = "deserialize_keys")]
    keys: Vec<Jwk>,
}

impl Jwks {
    /// Adds a key to the set
    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    /// A view of the keys in this set
    #[must_use]
    pub fn keys(&self) -> &[Jwk] {
        &self.keys
    }

    /// Gets the best key based on the algorithm requested
    #[must_use]
    pub fn get_key<A: Into<jwa::Algorithm>>(&self, alg: A) -> Option<&Jwk> {
        get_key_impl(self.keys(), None, alg.into())
    }

    /// Gets the best key based on the key ID and algorithm requested
    #[must_use]
    pub fn get_key_by_id<A: Into<jwa::Algorithm>>(&self, kid: &KeyId, alg: A) -> Option<&Jwk> {
        get_key_impl(self.keys(), Some(kid), alg.into())
    }

    /// Gets the best key based on the key ID (if any) and algorithm
    #[must_use]
    pub fn get_key_by_opt<A: Into<jwa::Algorithm>>(
        &self,
        kid: Option<&KeyId>,
        alg: A,
    ) -> Option<&Jwk> {
        get_key_impl(self.keys(), kid, alg.into())
    }
}

fn get_key_impl<'a>(keys: &'a [Jwk], kid: Option<&KeyId>, alg: jwa::Algorithm) -> Option<&'a Jwk> {
    let alg_usage = alg.to_usage();

    let best = keys.iter().fold(None, move |best, k| {
        let mut score = 0;

        if !k.is_compatible(alg) {
            return best;
        }

        match (kid, k.key_id()) {
            (Some(wanted), Some(key_id)) if wanted == key_id => score += 4,
            (Some(_), Some(_)) => return best,
            _ => {}
        }

        if let Some(algorithm) = k.algorithm() {
            if algorithm == alg {
                score += 2;
            } else {
                return best;
            }
        }

        if let Some(key_usage) = k.usage() {
            if key_usage == alg_usage {
                score += 1;
            } else {
                return best;
            }
        }

        match best {
            Some((_, best_score)) if best_score < score => Some((k, score)),
            None => Some((k, score)),
            _ => best,
        }
    });

    best.map(|(b, _)| b)
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<Jwk>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct MaybeJwksVisitor;

    impl<'de> serde::de::Visitor<'de> for MaybeJwksVisitor {
        type Value = Vec<Jwk>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a list of JWK objects")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());

            while let Some(value) = seq.next_element()? {
                if let MaybeJwk::Jwk(jwk) = value {
                    values.push(jwk);
                }
            }

            Ok(values)
        }
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MaybeJwk {
        Jwk(Jwk),
        Unknown(serde::de::IgnoredAny),
    }

    deserializer.deserialize_seq(MaybeJwksVisitor)
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::jwa::{Symmetric, Usage};

    const JWKS_WITH_UNKNOWN_ALG: &str = r#"
        {
            "keys": [
                {
                    "kid": "1",
                    "use": "enc",
                    "alg": "X25519-KW"
                }
            ]
        }
    "#;

    #[test]
    fn skips_keys_it_cannot_represent() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(JWKS_WITH_UNKNOWN_ALG)?;
        assert!(jwks.keys().is_empty());

        let jwks: Jwks = serde_json::from_str(r#"{"keys":[{}]}"#)?;
        assert!(jwks.keys().is_empty());
        Ok(())
    }

    #[test]
    fn selects_by_key_id() -> Result<()> {
        let mut jwks = Jwks::default();
        jwks.add_key(Jwk::from(Symmetric::generate(32)?).with_key_id("a"));
        jwks.add_key(
            Jwk::from(Symmetric::generate(32)?)
                .with_key_id("b")
                .with_algorithm(jwa::Algorithm::HS256),
        );

        let found = jwks
            .get_key_by_id(&KeyId::new("b"), jwa::Algorithm::HS256)
            .unwrap();
        assert_eq!(found.key_id().map(KeyId::as_str), Some("b"));
        Ok(())
    }

    #[test]
    fn prefers_usage_and_algorithm_matches() -> Result<()> {
        let mut jwks = Jwks::default();
        jwks.add_key(Jwk::from(Symmetric::generate(32)?).with_usage(Usage::Encryption));
        jwks.add_key(Jwk::from(Symmetric::generate(32)?).with_usage(Usage::Signing));

        let found = jwks.get_key(jwa::Algorithm::HS256).unwrap();
        assert_eq!(found.usage(), Some(Usage::Signing));
        Ok(())
    }

    #[test]
    fn returns_none_when_nothing_is_compatible() -> Result<()> {
        let mut jwks = Jwks::default();
        jwks.add_key(Jwk::from(Symmetric::generate(32)?));
        assert!(jwks.get_key(jwa::Algorithm::ES256).is_none());
        Ok(())
    }
}
