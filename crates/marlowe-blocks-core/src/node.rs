//! Block node payloads.
//!
//! A [`BlockNode`] is the weight stored on each graph node: its kind, its
//! scalar fields, and the editor's own block id (kept so errors can be
//! mapped back to the block the user sees). Slots and chain links are edges,
//! see [`crate::edge`].

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::kind::BlockKind;

/// A scalar field value as the editor stores it.
///
/// Number fields usually arrive as JSON numbers and text fields as strings,
/// but either representation may appear in either field; interpretation is
/// left to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// The value rendered as text. Numbers use their JSON spelling.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Interprets the value as an integer.
    ///
    /// Accepts integral JSON numbers and text that parses to an integral
    /// number (surrounding whitespace ignored). Empty text, fractions,
    /// non-finite values and anything outside the `i64` range yield `None`;
    /// nothing is coerced to zero.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
            }
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; the exclusive bound is 2^63.
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        Some(value as i64)
    } else {
        None
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

/// The weight of a node in the block graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub kind: BlockKind,
    /// Scalar fields in the order they were set.
    #[serde(default)]
    pub fields: IndexMap<String, FieldValue>,
    /// Block id assigned by the editor, if the block came from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
}

impl BlockNode {
    pub fn new(kind: BlockKind) -> Self {
        BlockNode {
            kind,
            fields: IndexMap::new(),
            block_id: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
