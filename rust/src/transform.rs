//! Recursive encrypt-and-keep-shape walk over a `ConfigTree`.

use thiserror::Error;
use tracing::debug;

use crate::crypto::{CipherError, EncryptionKey, LeafCipher, Scheme};
use crate::tree::{ConfigNode, ConfigTree, SealedNode, SealedTree};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("leaf `{key_path}` cannot be encoded as text: {source}")]
    Encoding {
        key_path: String,
        source: serde_json::Error,
    },
    #[error("leaf `{key_path}` could not be encrypted: {source}")]
    Crypto {
        key_path: String,
        source: CipherError,
    },
}

/// Encrypts every non-null leaf of `tree` with `cipher`.
///
/// Nested maps keep their key even when they end up empty; null leaves are
/// dropped from the output. The first failing leaf aborts the whole walk.
pub fn encrypt_config(tree: ConfigTree, cipher: &dyn LeafCipher) -> Result<SealedTree, TransformError> {
    seal_level(tree, cipher, "")
}

/// Builds the cipher for `scheme` from `key` and runs [`encrypt_config`].
pub fn encrypt_with_key(
    tree: ConfigTree,
    key: &EncryptionKey,
    scheme: Scheme,
) -> Result<SealedTree, TransformError> {
    let cipher = scheme.cipher(key);
    encrypt_config(tree, cipher.as_ref())
}

fn seal_level(tree: ConfigTree, cipher: &dyn LeafCipher, prefix: &str) -> Result<SealedTree, TransformError> {
    let mut sealed = SealedTree::new();
    for (key, node) in tree {
        let key_path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match node {
            ConfigNode::Map(subtree) => {
                let nested = seal_level(subtree, cipher, &key_path)?;
                sealed.push(key, SealedNode::Map(nested));
            }
            ConfigNode::Null => {
                debug!(key = %key_path, "dropping null leaf");
            }
            ConfigNode::Scalar(scalar) => {
                let plaintext = match scalar.to_plaintext() {
                    Ok(text) => text,
                    Err(source) => return Err(TransformError::Encoding { key_path, source }),
                };
                let token = match cipher.seal(plaintext.as_bytes()) {
                    Ok(token) => token,
                    Err(source) => return Err(TransformError::Crypto { key_path, source }),
                };
                debug!(key = %key_path, scheme = cipher.scheme().as_str(), "sealed leaf");
                sealed.push(key, SealedNode::Token(token));
            }
        }
    }
    Ok(sealed)
}

#[cfg(test)]
mod tests {
    use super::{encrypt_config, encrypt_with_key, TransformError};
    use crate::crypto::{CipherError, EncryptionKey, LeafCipher, Scheme};
    use crate::tree::{ConfigTree, SealedNode, SealedTree};
    use serde_json::json;

    /// Deterministic stand-in so structure can be asserted exactly.
    struct Tagging;

    impl LeafCipher for Tagging {
        fn scheme(&self) -> Scheme {
            Scheme::Fernet
        }

        fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
            Ok(format!("enc({})", String::from_utf8_lossy(plaintext)))
        }

        fn open(&self, token: &str) -> Result<Vec<u8>, CipherError> {
            token
                .strip_prefix("enc(")
                .and_then(|rest| rest.strip_suffix(')'))
                .map(|inner| inner.as_bytes().to_vec())
                .ok_or_else(|| CipherError::MalformedToken(token.to_string()))
        }
    }

    /// Fails on one specific plaintext.
    struct FailingOn(&'static str);

    impl LeafCipher for FailingOn {
        fn scheme(&self) -> Scheme {
            Scheme::Fernet
        }

        fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
            if plaintext == self.0.as_bytes() {
                return Err(CipherError::EncryptionFailed("refused".to_string()));
            }
            Tagging.seal(plaintext)
        }

        fn open(&self, token: &str) -> Result<Vec<u8>, CipherError> {
            Tagging.open(token)
        }
    }

    fn tree(value: serde_json::Value) -> ConfigTree {
        ConfigTree::from_json(value).expect("object input")
    }

    fn nested<'a>(tree: &'a SealedTree, key: &str) -> &'a SealedTree {
        match tree.get(key) {
            Some(SealedNode::Map(inner)) => inner,
            other => panic!("expected map at `{key}`, got {other:?}"),
        }
    }

    fn token<'a>(tree: &'a SealedTree, key: &str) -> &'a str {
        match tree.get(key) {
            Some(SealedNode::Token(token)) => token,
            other => panic!("expected token at `{key}`, got {other:?}"),
        }
    }

    #[test]
    fn preserves_keys_and_order_without_nulls() {
        let sealed = encrypt_config(
            tree(json!({"z": "1", "a": {"y": 2, "b": {"q": true}}, "m": "3"})),
            &Tagging,
        )
        .expect("transform should succeed");

        assert_eq!(sealed.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
        let a = nested(&sealed, "a");
        assert_eq!(a.keys().collect::<Vec<_>>(), ["y", "b"]);
        assert_eq!(nested(a, "b").keys().collect::<Vec<_>>(), ["q"]);
        assert_eq!(token(a, "y"), "enc(2)");
        assert_eq!(token(nested(a, "b"), "q"), "enc(True)");
    }

    #[test]
    fn drops_null_leaves_at_every_level() {
        let sealed = encrypt_config(
            tree(json!({"a": "x", "b": {"c": null, "d": 5}, "e": null})),
            &Tagging,
        )
        .expect("transform should succeed");

        assert_eq!(sealed.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert!(sealed.get("e").is_none());
        let b = nested(&sealed, "b");
        assert_eq!(b.keys().collect::<Vec<_>>(), ["d"]);
        assert_eq!(token(b, "d"), "enc(5)");
    }

    #[test]
    fn keeps_maps_that_become_empty() {
        let sealed = encrypt_config(tree(json!({"only_nulls": {"x": null}, "empty": {}})), &Tagging)
            .expect("transform should succeed");
        assert_eq!(sealed.keys().collect::<Vec<_>>(), ["only_nulls", "empty"]);
        assert!(nested(&sealed, "only_nulls").is_empty());
        assert!(nested(&sealed, "empty").is_empty());
        assert_eq!(serde_json::to_string(&sealed).unwrap(), r#"{"only_nulls":{},"empty":{}}"#);
    }

    #[test]
    fn tokens_decrypt_to_the_leaf_text() {
        let key = EncryptionKey::embedded();
        for scheme in [Scheme::Fernet, Scheme::ChaCha20Poly1305] {
            let sealed = encrypt_with_key(
                tree(json!({"url": "https://api.example", "retries": 3, "ratio": 0.5, "debug": false, "tags": ["a", "b"], "nested": {"name": "ünïcode"}})),
                &key,
                scheme,
            )
            .expect("transform should succeed");

            let cipher = scheme.cipher(&key);
            let open = |token: &str| String::from_utf8(cipher.open(token).expect("open should succeed")).unwrap();
            assert_eq!(open(token(&sealed, "url")), "https://api.example");
            assert_eq!(open(token(&sealed, "retries")), "3");
            assert_eq!(open(token(&sealed, "ratio")), "0.5");
            assert_eq!(open(token(&sealed, "debug")), "False");
            assert_eq!(open(token(&sealed, "tags")), r#"["a","b"]"#);
            assert_eq!(open(token(nested(&sealed, "nested"), "name")), "ünïcode");
        }
    }

    #[test]
    fn repeated_runs_share_structure_but_not_ciphertext() {
        let key = EncryptionKey::embedded();
        let input = json!({"a": "x", "b": {"d": 5}});
        let first = encrypt_with_key(tree(input.clone()), &key, Scheme::Fernet).expect("first run");
        let second = encrypt_with_key(tree(input), &key, Scheme::Fernet).expect("second run");

        assert_eq!(first.keys().collect::<Vec<_>>(), second.keys().collect::<Vec<_>>());
        assert_eq!(
            nested(&first, "b").keys().collect::<Vec<_>>(),
            nested(&second, "b").keys().collect::<Vec<_>>()
        );
        assert_ne!(token(&first, "a"), token(&second, "a"));
    }

    #[test]
    fn reports_the_failing_leaf_path() {
        let err = encrypt_config(tree(json!({"ok": "1", "outer": {"inner": "boom"}})), &FailingOn("boom"))
            .unwrap_err();
        match err {
            TransformError::Crypto { key_path, .. } => assert_eq!(key_path, "outer.inner"),
            other => panic!("expected crypto error, got {other:?}"),
        }
    }
}
