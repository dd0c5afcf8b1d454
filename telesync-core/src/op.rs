//! Diff wire model.
//!
//! Wire format:
//! ```text
//! {"d": [op, op, ...]}
//!
//! set          {"k": "card field 0", "v": value}
//! add card     {"k": "card", "d": {props}, "b": [buffers]}   "b" only if any
//! delete card  {"k": "card"}
//! drop page    {}
//! ```
//!
//! Ops are replayed by the server in order; later ops may overwrite the
//! targets of earlier ones.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single tracked mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Op {
    /// Assign a value at a path
    Set { k: String, v: Value },
    /// Insert or overwrite a card
    AddCard {
        k: String,
        d: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        b: Option<Vec<Value>>,
    },
    /// Remove a card
    DeleteCard { k: String },
    /// Delete the whole page
    DropPage {},
}

impl Op {
    pub fn set(path: impl Into<String>, value: Value) -> Self {
        Op::Set {
            k: path.into(),
            v: value,
        }
    }

    pub fn add_card(key: impl Into<String>, props: Map<String, Value>, buffers: Vec<Value>) -> Self {
        Op::AddCard {
            k: key.into(),
            d: props,
            b: if buffers.is_empty() { None } else { Some(buffers) },
        }
    }

    pub fn delete_card(key: impl Into<String>) -> Self {
        Op::DeleteCard { k: key.into() }
    }

    pub fn drop_page() -> Self {
        Op::DropPage {}
    }

    /// Target key or path, if the op has one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Op::Set { k, .. } | Op::AddCard { k, .. } | Op::DeleteCard { k } => Some(k),
            Op::DropPage {} => None,
        }
    }
}

/// The ordered ops accumulated between two flushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    pub d: Vec<Op>,
}

impl Diff {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_op_shapes() {
        let ops = vec![
            Op::set("c field", json!(5)),
            Op::add_card("c", Map::new(), Vec::new()),
            Op::add_card("p", Map::new(), vec![json!({"m": {"f": ["a"]}})]),
            Op::delete_card("c"),
            Op::drop_page(),
        ];
        let encoded = Diff { d: ops }.encode().unwrap();
        assert_eq!(
            encoded,
            r#"{"d":[{"k":"c field","v":5},{"k":"c","d":{}},{"k":"p","d":{},"b":[{"m":{"f":["a"]}}]},{"k":"c"},{}]}"#
        );
    }

    #[test]
    fn test_diff_decode_restores_variants() {
        let s = r#"{"d":[{"k":"a b","v":[1]},{"k":"a","d":{"x":1}},{"k":"a"},{}]}"#;
        let diff = Diff::decode(s).unwrap();
        assert_eq!(diff.d[0], Op::set("a b", json!([1])));
        assert!(matches!(diff.d[1], Op::AddCard { b: None, .. }));
        assert_eq!(diff.d[2], Op::delete_card("a"));
        assert_eq!(diff.d[3], Op::drop_page());
        assert_eq!(diff.encode().unwrap(), s);
    }

    #[test]
    fn test_op_key() {
        assert_eq!(Op::set("a b", json!(1)).key(), Some("a b"));
        assert_eq!(Op::delete_card("a").key(), Some("a"));
        assert_eq!(Op::drop_page().key(), None);
    }
}
