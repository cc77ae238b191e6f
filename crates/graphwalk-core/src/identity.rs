//! Ready-made node hash functions for JSON document nodes.
//!
//! A traversal identifies nodes only through the hash function it is given.
//! For `serde_json::Value` nodes two schemes cover most documents:
//!
//! - [`NodeIdentity::Field`]: the value of a named field (`"id"`, `"name"`).
//! - [`NodeIdentity::Content`]: a BLAKE3 digest of the node's canonical JSON
//!   (keys sorted, no whitespace), formatted as `blake3:<hex>`. Structurally
//!   equal nodes share a hash and are visited once.

use anyhow::bail;
use serde_json::Value;

/// How JSON nodes are identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeIdentity {
    /// Use the value of this field.
    Field(String),
    /// Hash the node's canonical JSON.
    Content,
}

impl NodeIdentity {
    /// `Field(name)` when a field is configured, `Content` otherwise.
    #[must_use]
    pub fn from_field(field: Option<&str>) -> Self {
        field.map_or(Self::Content, |name| Self::Field(name.to_string()))
    }

    /// Hash of `node` under this scheme.
    ///
    /// # Errors
    ///
    /// With [`NodeIdentity::Field`], fails when the node has no such field or
    /// the field holds an object, array or null.
    pub fn hash(&self, node: &Value) -> anyhow::Result<String> {
        match self {
            Self::Field(name) => field_value(node, name),
            Self::Content => Ok(content_hash(node)),
        }
    }
}

fn field_value(node: &Value, name: &str) -> anyhow::Result<String> {
    match node.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(scalar.to_string()),
        Some(other) => bail!("identity field `{name}` must be a string, number or bool, got {other}"),
        None => bail!("node has no identity field `{name}`: {}", canonical_json(node)),
    }
}

/// BLAKE3 digest of the canonical form of `node`, as `blake3:<hex>`.
#[must_use]
pub fn content_hash(node: &Value) -> String {
    let hash = blake3::hash(canonical_json(node).as_bytes());
    format!("blake3:{}", hash.to_hex())
}

/// Serialize `value` with object keys sorted and no insignificant whitespace.
///
/// ```
/// use graphwalk_core::identity::canonical_json;
/// use serde_json::json;
///
/// let val = json!({"z": 1, "a": {"c": 3, "b": 2}});
/// assert_eq!(canonical_json(&val), r#"{"a":{"b":2,"c":3},"z":1}"#);
/// ```
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut buf = String::new();
    write_canonical(value, &mut buf);
    buf
}

fn write_canonical(value: &Value, buf: &mut String) {
    match value {
        Value::Array(items) => {
            buf.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                write_canonical(item, buf);
            }
            buf.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            buf.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                // Value's Display escapes strings exactly like serde_json.
                buf.push_str(&Value::String(key.clone()).to_string());
                buf.push(':');
                if let Some(item) = map.get(key) {
                    write_canonical(item, buf);
                }
            }
            buf.push('}');
        }
        scalar => {
            buf.push_str(&scalar.to_string());
        }
    }
}
