//! The grammar table: one [`KindSpec`] per block kind.
//!
//! For every kind the table records its editor tag, its slots (name,
//! expected category, whether the slot must be filled), its scalar fields,
//! and its role in an ordered chain. The table is static data; nothing in
//! the workspace mutates it.
//!
//! Chains come in two halves. A *holder* kind (`contract_when`,
//! `action_choice`) owns a slot whose child is the first element of the
//! chain; a *link* kind (`case_block`, `bound_block`) carries a `next`
//! reference to the following element.

use serde::Serialize;

use crate::kind::{
    ActionKind, BlockKind, Category, ContractKind, ObservationKind, PartyKind, PayeeKind,
    ValueKind,
};

/// Stored representation of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Text,
    Number,
}

/// A named scalar field on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

/// A named child slot on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotSpec {
    pub name: &'static str,
    /// Category every child plugged into this slot must produce.
    pub category: Category,
    /// Whether an empty slot is a structural error. Chain holder slots are
    /// the only optional slots: empty means an empty sequence.
    pub required: bool,
}

/// How a kind participates in an ordered chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainRole {
    None,
    /// The kind owns `slot`, whose child starts a chain of `inner` blocks.
    Holder {
        slot: &'static str,
        inner: Category,
    },
    /// The kind may carry a `next` reference to a sibling of its category.
    Link,
}

/// Grammar entry for one block kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KindSpec {
    pub kind: BlockKind,
    pub tag: &'static str,
    pub slots: &'static [SlotSpec],
    pub fields: &'static [FieldSpec],
    pub chain: ChainRole,
}

impl KindSpec {
    /// Looks up a declared slot by name.
    pub fn slot(&self, name: &str) -> Option<&'static SlotSpec> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_chain_link(&self) -> bool {
        self.chain == ChainRole::Link
    }
}

macro_rules! slot {
    ($name:literal, $category:ident) => {
        SlotSpec {
            name: $name,
            category: Category::$category,
            required: true,
        }
    };
}

macro_rules! chain_slot {
    ($name:literal, $category:ident) => {
        SlotSpec {
            name: $name,
            category: Category::$category,
            required: false,
        }
    };
}

macro_rules! text {
    ($name:literal) => {
        FieldSpec {
            name: $name,
            ty: FieldType::Text,
        }
    };
}

macro_rules! number {
    ($name:literal) => {
        FieldSpec {
            name: $name,
            ty: FieldType::Number,
        }
    };
}

const fn spec(
    kind: BlockKind,
    tag: &'static str,
    slots: &'static [SlotSpec],
    fields: &'static [FieldSpec],
) -> KindSpec {
    KindSpec {
        kind,
        tag,
        slots,
        fields,
        chain: ChainRole::None,
    }
}

const NO_SLOTS: &[SlotSpec] = &[];
const NO_FIELDS: &[FieldSpec] = &[];
const BINARY_VALUE: &[SlotSpec] = &[slot!("LHS", Value), slot!("RHS", Value)];
const BINARY_OBSERVATION: &[SlotSpec] = &[
    slot!("LHS", Observation),
    slot!("RHS", Observation),
];

// ---------------------------------------------------------------------------
// Root and contracts
// ---------------------------------------------------------------------------

static ROOT: KindSpec = spec(
    BlockKind::Root,
    "contract_root",
    &[slot!("CONTRACT", Contract)],
    NO_FIELDS,
);

static CLOSE: KindSpec = spec(
    BlockKind::Contract(ContractKind::Close),
    "contract_close",
    NO_SLOTS,
    NO_FIELDS,
);

static PAY: KindSpec = spec(
    BlockKind::Contract(ContractKind::Pay),
    "contract_pay",
    &[
        slot!("FROM", Party),
        slot!("TO", Payee),
        slot!("TOKEN", Token),
        slot!("VALUE", Value),
        slot!("THEN", Contract),
    ],
    NO_FIELDS,
);

static IF: KindSpec = spec(
    BlockKind::Contract(ContractKind::If),
    "contract_if",
    &[
        slot!("COND", Observation),
        slot!("THEN", Contract),
        slot!("ELSE", Contract),
    ],
    NO_FIELDS,
);

static WHEN: KindSpec = KindSpec {
    kind: BlockKind::Contract(ContractKind::When),
    tag: "contract_when",
    slots: &[
        chain_slot!("CASES", Case),
        slot!("TIMEOUT_CONT", Contract),
    ],
    fields: &[number!("TIMEOUT")],
    chain: ChainRole::Holder {
        slot: "CASES",
        inner: Category::Case,
    },
};

static LET: KindSpec = spec(
    BlockKind::Contract(ContractKind::Let),
    "contract_let",
    &[slot!("VALUE", Value), slot!("THEN", Contract)],
    &[text!("NAME")],
);

static ASSERT: KindSpec = spec(
    BlockKind::Contract(ContractKind::Assert),
    "contract_assert",
    &[
        slot!("OBS", Observation),
        slot!("THEN", Contract),
    ],
    NO_FIELDS,
);

// ---------------------------------------------------------------------------
// Cases, actions, bounds, choice ids
// ---------------------------------------------------------------------------

static CASE: KindSpec = KindSpec {
    kind: BlockKind::Case,
    tag: "case_block",
    slots: &[slot!("ACTION", Action), slot!("THEN", Contract)],
    fields: NO_FIELDS,
    chain: ChainRole::Link,
};

static DEPOSIT: KindSpec = spec(
    BlockKind::Action(ActionKind::Deposit),
    "action_deposit",
    &[
        slot!("PARTY", Party),
        slot!("INTO", Party),
        slot!("TOKEN", Token),
        slot!("AMOUNT", Value),
    ],
    NO_FIELDS,
);

static CHOICE: KindSpec = KindSpec {
    kind: BlockKind::Action(ActionKind::Choice),
    tag: "action_choice",
    slots: &[
        slot!("CHOICE", ChoiceId),
        chain_slot!("BOUNDS", Bound),
    ],
    fields: NO_FIELDS,
    chain: ChainRole::Holder {
        slot: "BOUNDS",
        inner: Category::Bound,
    },
};

static NOTIFY: KindSpec = spec(
    BlockKind::Action(ActionKind::Notify),
    "action_notify",
    &[slot!("OBS", Observation)],
    NO_FIELDS,
);

static BOUND: KindSpec = KindSpec {
    kind: BlockKind::Bound,
    tag: "bound_block",
    slots: NO_SLOTS,
    fields: &[number!("FROM"), number!("TO")],
    chain: ChainRole::Link,
};

static CHOICE_ID: KindSpec = spec(
    BlockKind::ChoiceId,
    "choice_id",
    &[slot!("OWNER", Party)],
    &[text!("NAME")],
);

// ---------------------------------------------------------------------------
// Parties, payees, tokens
// ---------------------------------------------------------------------------

static PARTY_ROLE: KindSpec = spec(
    BlockKind::Party(PartyKind::Role),
    "party_role",
    NO_SLOTS,
    &[text!("ROLE")],
);

static PARTY_ADDRESS: KindSpec = spec(
    BlockKind::Party(PartyKind::Address),
    "party_address",
    NO_SLOTS,
    &[text!("ADDRESS")],
);

static PAYEE_PARTY: KindSpec = spec(
    BlockKind::Payee(PayeeKind::Party),
    "payee_party",
    &[slot!("PARTY", Party)],
    NO_FIELDS,
);

static PAYEE_ACCOUNT: KindSpec = spec(
    BlockKind::Payee(PayeeKind::Account),
    "payee_account",
    &[slot!("ACCOUNT", Party)],
    NO_FIELDS,
);

static TOKEN: KindSpec = spec(
    BlockKind::Token,
    "token_block",
    NO_SLOTS,
    &[text!("CURRENCY"), text!("NAME")],
);

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

static VALUE_CONSTANT: KindSpec = spec(
    BlockKind::Value(ValueKind::Constant),
    "value_constant",
    NO_SLOTS,
    &[number!("VALUE")],
);

static VALUE_AVAILABLE_MONEY: KindSpec = spec(
    BlockKind::Value(ValueKind::AvailableMoney),
    "value_available_money",
    &[slot!("TOKEN", Token), slot!("PARTY", Party)],
    NO_FIELDS,
);

static VALUE_ADD: KindSpec = spec(
    BlockKind::Value(ValueKind::Add),
    "value_add",
    BINARY_VALUE,
    NO_FIELDS,
);

static VALUE_SUB: KindSpec = spec(
    BlockKind::Value(ValueKind::Sub),
    "value_sub",
    BINARY_VALUE,
    NO_FIELDS,
);

static VALUE_MUL: KindSpec = spec(
    BlockKind::Value(ValueKind::Mul),
    "value_mul",
    BINARY_VALUE,
    NO_FIELDS,
);

static VALUE_DIV: KindSpec = spec(
    BlockKind::Value(ValueKind::Div),
    "value_div",
    BINARY_VALUE,
    NO_FIELDS,
);

static VALUE_NEGATE: KindSpec = spec(
    BlockKind::Value(ValueKind::Negate),
    "value_negate",
    &[slot!("VALUE", Value)],
    NO_FIELDS,
);

static VALUE_CHOICE_VALUE: KindSpec = spec(
    BlockKind::Value(ValueKind::ChoiceValue),
    "value_choice_value",
    &[slot!("CHOICE", ChoiceId)],
    NO_FIELDS,
);

static VALUE_TIME_START: KindSpec = spec(
    BlockKind::Value(ValueKind::TimeIntervalStart),
    "value_time_start",
    NO_SLOTS,
    NO_FIELDS,
);

static VALUE_TIME_END: KindSpec = spec(
    BlockKind::Value(ValueKind::TimeIntervalEnd),
    "value_time_end",
    NO_SLOTS,
    NO_FIELDS,
);

static VALUE_USE_VALUE: KindSpec = spec(
    BlockKind::Value(ValueKind::UseValue),
    "value_use_value",
    NO_SLOTS,
    &[text!("NAME")],
);

static VALUE_COND: KindSpec = spec(
    BlockKind::Value(ValueKind::Cond),
    "value_cond",
    &[
        slot!("OBS", Observation),
        slot!("THEN", Value),
        slot!("ELSE", Value),
    ],
    NO_FIELDS,
);

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

static OBS_TRUE: KindSpec = spec(
    BlockKind::Observation(ObservationKind::True),
    "obs_true",
    NO_SLOTS,
    NO_FIELDS,
);

static OBS_FALSE: KindSpec = spec(
    BlockKind::Observation(ObservationKind::False),
    "obs_false",
    NO_SLOTS,
    NO_FIELDS,
);

static OBS_AND: KindSpec = spec(
    BlockKind::Observation(ObservationKind::And),
    "obs_and",
    BINARY_OBSERVATION,
    NO_FIELDS,
);

static OBS_OR: KindSpec = spec(
    BlockKind::Observation(ObservationKind::Or),
    "obs_or",
    BINARY_OBSERVATION,
    NO_FIELDS,
);

static OBS_NOT: KindSpec = spec(
    BlockKind::Observation(ObservationKind::Not),
    "obs_not",
    &[slot!("OBS", Observation)],
    NO_FIELDS,
);

static OBS_CHOSE_SOMETHING: KindSpec = spec(
    BlockKind::Observation(ObservationKind::ChoseSomething),
    "obs_chose_something",
    &[slot!("CHOICE", ChoiceId)],
    NO_FIELDS,
);

static OBS_GE: KindSpec = spec(
    BlockKind::Observation(ObservationKind::Ge),
    "obs_ge",
    BINARY_VALUE,
    NO_FIELDS,
);

static OBS_GT: KindSpec = spec(
    BlockKind::Observation(ObservationKind::Gt),
    "obs_gt",
    BINARY_VALUE,
    NO_FIELDS,
);

static OBS_LT: KindSpec = spec(
    BlockKind::Observation(ObservationKind::Lt),
    "obs_lt",
    BINARY_VALUE,
    NO_FIELDS,
);

static OBS_LE: KindSpec = spec(
    BlockKind::Observation(ObservationKind::Le),
    "obs_le",
    BINARY_VALUE,
    NO_FIELDS,
);

static OBS_EQ: KindSpec = spec(
    BlockKind::Observation(ObservationKind::Eq),
    "obs_eq",
    BINARY_VALUE,
    NO_FIELDS,
);

/// Every block kind, grouped by category in editor toolbox order.
pub static GRAMMAR: [&KindSpec; 41] = [
    &ROOT,
    &CLOSE,
    &PAY,
    &IF,
    &WHEN,
    &LET,
    &ASSERT,
    &CASE,
    &DEPOSIT,
    &CHOICE,
    &NOTIFY,
    &BOUND,
    &CHOICE_ID,
    &PARTY_ROLE,
    &PARTY_ADDRESS,
    &PAYEE_PARTY,
    &PAYEE_ACCOUNT,
    &TOKEN,
    &VALUE_CONSTANT,
    &VALUE_AVAILABLE_MONEY,
    &VALUE_ADD,
    &VALUE_SUB,
    &VALUE_MUL,
    &VALUE_DIV,
    &VALUE_NEGATE,
    &VALUE_CHOICE_VALUE,
    &VALUE_TIME_START,
    &VALUE_TIME_END,
    &VALUE_USE_VALUE,
    &VALUE_COND,
    &OBS_TRUE,
    &OBS_FALSE,
    &OBS_AND,
    &OBS_OR,
    &OBS_NOT,
    &OBS_CHOSE_SOMETHING,
    &OBS_GE,
    &OBS_GT,
    &OBS_LT,
    &OBS_LE,
    &OBS_EQ,
];

impl BlockKind {
    /// The grammar entry for this kind.
    pub fn spec(self) -> &'static KindSpec {
        match self {
            BlockKind::Root => &ROOT,
            BlockKind::Contract(kind) => match kind {
                ContractKind::Close => &CLOSE,
                ContractKind::Pay => &PAY,
                ContractKind::If => &IF,
                ContractKind::When => &WHEN,
                ContractKind::Let => &LET,
                ContractKind::Assert => &ASSERT,
            },
            BlockKind::Case => &CASE,
            BlockKind::Action(kind) => match kind {
                ActionKind::Deposit => &DEPOSIT,
                ActionKind::Choice => &CHOICE,
                ActionKind::Notify => &NOTIFY,
            },
            BlockKind::Bound => &BOUND,
            BlockKind::ChoiceId => &CHOICE_ID,
            BlockKind::Party(kind) => match kind {
                PartyKind::Role => &PARTY_ROLE,
                PartyKind::Address => &PARTY_ADDRESS,
            },
            BlockKind::Payee(kind) => match kind {
                PayeeKind::Party => &PAYEE_PARTY,
                PayeeKind::Account => &PAYEE_ACCOUNT,
            },
            BlockKind::Token => &TOKEN,
            BlockKind::Value(kind) => match kind {
                ValueKind::Constant => &VALUE_CONSTANT,
                ValueKind::AvailableMoney => &VALUE_AVAILABLE_MONEY,
                ValueKind::Add => &VALUE_ADD,
                ValueKind::Sub => &VALUE_SUB,
                ValueKind::Mul => &VALUE_MUL,
                ValueKind::Div => &VALUE_DIV,
                ValueKind::Negate => &VALUE_NEGATE,
                ValueKind::ChoiceValue => &VALUE_CHOICE_VALUE,
                ValueKind::TimeIntervalStart => &VALUE_TIME_START,
                ValueKind::TimeIntervalEnd => &VALUE_TIME_END,
                ValueKind::UseValue => &VALUE_USE_VALUE,
                ValueKind::Cond => &VALUE_COND,
            },
            BlockKind::Observation(kind) => match kind {
                ObservationKind::True => &OBS_TRUE,
                ObservationKind::False => &OBS_FALSE,
                ObservationKind::And => &OBS_AND,
                ObservationKind::Or => &OBS_OR,
                ObservationKind::Not => &OBS_NOT,
                ObservationKind::ChoseSomething => &OBS_CHOSE_SOMETHING,
                ObservationKind::Ge => &OBS_GE,
                ObservationKind::Gt => &OBS_GT,
                ObservationKind::Lt => &OBS_LT,
                ObservationKind::Le => &OBS_LE,
                ObservationKind::Eq => &OBS_EQ,
            },
        }
    }
}

/// Kinds that produce `category`, in grammar order.
pub fn kinds_of(category: Category) -> impl Iterator<Item = BlockKind> {
    GRAMMAR
        .iter()
        .map(|spec| spec.kind)
        .filter(move |kind| kind.category() == category)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn spec_lookup_agrees_with_table() {
        for entry in GRAMMAR.iter() {
            assert!(std::ptr::eq(entry.kind.spec(), *entry), "{}", entry.tag);
        }
    }

    #[test]
    fn tags_and_kinds_are_unique() {
        let tags: HashSet<_> = GRAMMAR.iter().map(|s| s.tag).collect();
        let kinds: HashSet<_> = GRAMMAR.iter().map(|s| s.kind).collect();
        assert_eq!(tags.len(), GRAMMAR.len());
        assert_eq!(kinds.len(), GRAMMAR.len());
    }

    #[test]
    fn every_category_has_a_kind() {
        for category in Category::ALL {
            assert!(kinds_of(category).next().is_some(), "{category}");
        }
        assert_eq!(kinds_of(Category::Value).count(), 12);
        assert_eq!(kinds_of(Category::Observation).count(), 11);
        assert_eq!(kinds_of(Category::Contract).count(), 6);
    }

    #[test]
    fn no_slot_declares_root() {
        for entry in GRAMMAR.iter() {
            for slot in entry.slots {
                assert_ne!(slot.category, Category::Root, "{}.{}", entry.tag, slot.name);
            }
        }
    }

    #[test]
    fn chain_holders_point_at_optional_link_slots() {
        for entry in GRAMMAR.iter() {
            if let ChainRole::Holder { slot, inner } = entry.chain {
                let declared = entry.slot(slot).expect("holder slot is declared");
                assert!(!declared.required);
                assert_eq!(declared.category, inner);
                assert!(kinds_of(inner).all(|kind| kind.spec().is_chain_link()));
            }
        }
    }

    #[test]
    fn only_chain_holders_have_optional_slots() {
        for entry in GRAMMAR.iter() {
            for slot in entry.slots.iter().filter(|s| !s.required) {
                assert_eq!(
                    entry.chain,
                    ChainRole::Holder {
                        slot: slot.name,
                        inner: slot.category
                    }
                );
            }
        }
    }

    #[test]
    fn when_declares_timeout_field() {
        let when = BlockKind::Contract(ContractKind::When).spec();
        assert_eq!(when.field("TIMEOUT").map(|f| f.ty), Some(FieldType::Number));
        assert!(when.slot("TIMEOUT").is_none());
        assert!(when.slot("TIMEOUT_CONT").unwrap().required);
    }
}
