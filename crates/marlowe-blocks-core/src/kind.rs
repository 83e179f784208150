//! Block kinds and grammar categories.
//!
//! Every block kind belongs to exactly one [`Category`]. The kinds are
//! grouped into one closed enum per category ([`ContractKind`],
//! [`ValueKind`], ...) and wrapped by [`BlockKind`], so a translator for a
//! category can match its own kinds exhaustively and there is no catch-all
//! "unsupported block" arm.
//!
//! On the wire (Blockly workspace JSON, error payloads) a kind is its block
//! tag, e.g. `"contract_when"`. The tag table lives in [`crate::grammar`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::grammar;

/// Grammar classification constraining which kinds may fill a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Carried only by `contract_root`; no slot declares it.
    Root,
    Contract,
    Case,
    Action,
    Bound,
    ChoiceId,
    Party,
    Payee,
    Token,
    Value,
    Observation,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 11] = [
        Category::Root,
        Category::Contract,
        Category::Case,
        Category::Action,
        Category::Bound,
        Category::ChoiceId,
        Category::Party,
        Category::Payee,
        Category::Token,
        Category::Value,
        Category::Observation,
    ];

    /// Category name as the editor spells it in connection checks.
    pub fn name(self) -> &'static str {
        match self {
            Category::Root => "Root",
            Category::Contract => "Contract",
            Category::Case => "Case",
            Category::Action => "Action",
            Category::Bound => "Bound",
            Category::ChoiceId => "ChoiceId",
            Category::Party => "Party",
            Category::Payee => "Payee",
            Category::Token => "Token",
            Category::Value => "Value",
            Category::Observation => "Observation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    Close,
    Pay,
    If,
    When,
    Let,
    Assert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Deposit,
    Choice,
    Notify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyKind {
    Role,
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayeeKind {
    Party,
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Constant,
    AvailableMoney,
    Add,
    Sub,
    Mul,
    Div,
    Negate,
    ChoiceValue,
    TimeIntervalStart,
    TimeIntervalEnd,
    UseValue,
    Cond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationKind {
    True,
    False,
    And,
    Or,
    Not,
    ChoseSomething,
    Ge,
    Gt,
    Lt,
    Le,
    Eq,
}

/// The kind of a block in the graph.
///
/// Categories with a single kind (`Case`, `Bound`, `ChoiceId`, `Token`) are
/// unit variants; the rest carry their per-category kind enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Root,
    Contract(ContractKind),
    Case,
    Action(ActionKind),
    Bound,
    ChoiceId,
    Party(PartyKind),
    Payee(PayeeKind),
    Token,
    Value(ValueKind),
    Observation(ObservationKind),
}

impl BlockKind {
    /// The category this kind produces.
    pub fn category(self) -> Category {
        match self {
            BlockKind::Root => Category::Root,
            BlockKind::Contract(_) => Category::Contract,
            BlockKind::Case => Category::Case,
            BlockKind::Action(_) => Category::Action,
            BlockKind::Bound => Category::Bound,
            BlockKind::ChoiceId => Category::ChoiceId,
            BlockKind::Party(_) => Category::Party,
            BlockKind::Payee(_) => Category::Payee,
            BlockKind::Token => Category::Token,
            BlockKind::Value(_) => Category::Value,
            BlockKind::Observation(_) => Category::Observation,
        }
    }

    /// The editor's block tag for this kind.
    pub fn tag(self) -> &'static str {
        self.spec().tag
    }

    /// Looks a kind up by its block tag.
    pub fn from_tag(tag: &str) -> Option<BlockKind> {
        grammar::GRAMMAR
            .iter()
            .find(|spec| spec.tag == tag)
            .map(|spec| spec.kind)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BlockKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::from_tag(s).ok_or_else(|| CoreError::UnknownKind { tag: s.to_string() })
    }
}

impl Serialize for BlockKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_roundtrip() {
        for spec in grammar::GRAMMAR.iter() {
            assert_eq!(BlockKind::from_tag(spec.tag), Some(spec.kind));
            assert_eq!(spec.kind.tag(), spec.tag);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(BlockKind::from_tag("controls_if").is_none());
        let err = "controls_if".parse::<BlockKind>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownKind { ref tag } if tag == "controls_if"));
    }

    #[test]
    fn kinds_serialize_as_tags() {
        let kind = BlockKind::Value(ValueKind::Sub);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"value_sub\"");
        let back: BlockKind = serde_json::from_str("\"obs_ge\"").unwrap();
        assert_eq!(back, BlockKind::Observation(ObservationKind::Ge));
    }

    #[test]
    fn category_follows_variant() {
        assert_eq!(BlockKind::Root.category(), Category::Root);
        assert_eq!(BlockKind::Case.category(), Category::Case);
        assert_eq!(
            BlockKind::Payee(PayeeKind::Account).category(),
            Category::Payee
        );
        assert_eq!(
            BlockKind::Observation(ObservationKind::ChoseSomething).category(),
            Category::Observation
        );
    }
}
