//! Value trees flowing through the sealer: the plaintext `ConfigTree` read
//! from disk and the `SealedTree` produced by the transformer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("config file unreadable at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config must be a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
}

/// A non-null, non-map leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
    /// Arrays are carried as opaque leaves and coerced to compact JSON.
    List(Vec<Value>),
}

impl Scalar {
    /// String form that gets encrypted. Booleans are spelled `True`/`False`
    /// and numbers keep their source text. Lists become compact JSON.
    pub fn to_plaintext(&self) -> Result<String, serde_json::Error> {
        match self {
            Scalar::String(text) => Ok(text.clone()),
            Scalar::Number(number) => Ok(number.to_string()),
            Scalar::Bool(true) => Ok("True".to_string()),
            Scalar::Bool(false) => Ok("False".to_string()),
            Scalar::List(items) => serde_json::to_string(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Null,
    Scalar(Scalar),
    Map(ConfigTree),
}

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigNode::Null,
            Value::Bool(flag) => ConfigNode::Scalar(Scalar::Bool(flag)),
            Value::Number(number) => ConfigNode::Scalar(Scalar::Number(number)),
            Value::String(text) => ConfigNode::Scalar(Scalar::String(text)),
            Value::Array(items) => ConfigNode::Scalar(Scalar::List(items)),
            Value::Object(map) => ConfigNode::Map(ConfigTree::from(map)),
        }
    }
}

/// Ordered plaintext configuration. Entry order is the document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    entries: Vec<(String, ConfigNode)>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the JSON document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(value)
    }

    pub fn from_json(value: Value) -> Result<Self, InputError> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            Value::Null => Err(InputError::NotAnObject("null")),
            Value::Bool(_) => Err(InputError::NotAnObject("a boolean")),
            Value::Number(_) => Err(InputError::NotAnObject("a number")),
            Value::String(_) => Err(InputError::NotAnObject("a string")),
            Value::Array(_) => Err(InputError::NotAnObject("an array")),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, node)| node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of null leaves at every depth.
    pub fn null_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| match node {
                ConfigNode::Null => 1,
                ConfigNode::Scalar(_) => 0,
                ConfigNode::Map(tree) => tree.null_count(),
            })
            .sum()
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, value)| (key, ConfigNode::from(value)))
                .collect(),
        }
    }
}

impl IntoIterator for ConfigTree {
    type Item = (String, ConfigNode);
    type IntoIter = std::vec::IntoIter<(String, ConfigNode)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SealedNode {
    Token(String),
    Map(SealedTree),
}

/// Encrypted configuration: the shape of a `ConfigTree` minus its null
/// leaves, with every other leaf replaced by a ciphertext token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SealedTree {
    entries: Vec<(String, SealedNode)>,
}

impl SealedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: String, node: SealedNode) {
        self.entries.push((key, node));
    }

    pub fn get(&self, key: &str) -> Option<&SealedNode> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, node)| node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SealedNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tokens at every depth.
    pub fn leaf_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| match node {
                SealedNode::Token(_) => 1,
                SealedNode::Map(tree) => tree.leaf_count(),
            })
            .sum()
    }
}

impl Serialize for SealedTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl Serialize for SealedNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SealedNode::Token(token) => serializer.serialize_str(token),
            SealedNode::Map(tree) => tree.serialize(serializer),
        }
    }
}
