//! Category translators: block graph to contract document.
//!
//! One method per category. Each method first matches the node's kind
//! against the kinds of its own category, which doubles as the category
//! check, then builds the IR variant, resolving slots in the order the
//! grammar declares them. The walk is depth-first and stops at the first
//! violation.
//!
//! The translator also keeps the set of nodes on the current descent path.
//! Entering a node that is already on the path means the graph nests a
//! block inside itself, which is reported as [`CompileError::CyclicSlot`]
//! instead of recursing forever. A child shared by two sibling slots is not
//! a cycle and is translated once per slot.

use std::collections::HashSet;

use marlowe_blocks_core::{
    ActionKind, BlockKind, BlockSource, Category, ContractKind, NodeId, ObservationKind,
    PartyKind, PayeeKind, ValueKind,
};

use crate::chain::collect_chain;
use crate::document::{
    Action, Bound, Case, ChoiceId, CompareOp, Contract, Observation, Party, Payee, Token, Value,
};
use crate::error::CompileError;

/// Remaining stack below which translation moves to a fresh segment.
const RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated for deep graphs.
const STACK_SEGMENT: usize = 1024 * 1024;

/// A node being translated, together with its kind.
#[derive(Debug, Clone, Copy)]
struct At {
    node: NodeId,
    kind: BlockKind,
}

pub struct Translator<'g, S: BlockSource + ?Sized> {
    source: &'g S,
    active: HashSet<NodeId>,
}

impl<'g, S: BlockSource + ?Sized> Translator<'g, S> {
    pub fn new(source: &'g S) -> Self {
        Translator {
            source,
            active: HashSet::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Contracts and cases
    // -----------------------------------------------------------------------

    pub fn contract(&mut self, node: NodeId) -> Result<Contract, CompileError> {
        let (at, kind) = match self.kind_of(node)? {
            BlockKind::Contract(kind) => (self.at(node, BlockKind::Contract(kind)), kind),
            found => return Err(mismatch(node, Category::Contract, found)),
        };
        self.descend(node, |t| match kind {
            ContractKind::Close => Ok(Contract::Close),
            ContractKind::Pay => Ok(Contract::Pay {
                from: t.party(t.slot(at, "FROM")?)?,
                to: t.payee(t.slot(at, "TO")?)?,
                token: t.token(t.slot(at, "TOKEN")?)?,
                amount: t.value(t.slot(at, "VALUE")?)?,
                then: Box::new(t.contract(t.slot(at, "THEN")?)?),
            }),
            ContractKind::If => Ok(Contract::If {
                cond: t.observation(t.slot(at, "COND")?)?,
                then: Box::new(t.contract(t.slot(at, "THEN")?)?),
                otherwise: Box::new(t.contract(t.slot(at, "ELSE")?)?),
            }),
            ContractKind::When => {
                let cases = collect_chain(t.source, t.source.slot(node, "CASES"))?
                    .into_iter()
                    .map(|case| t.case(case))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Contract::When {
                    cases,
                    timeout: t.integer(at, "TIMEOUT")?,
                    timeout_continuation: Box::new(t.contract(t.slot(at, "TIMEOUT_CONT")?)?),
                })
            }
            ContractKind::Let => Ok(Contract::Let {
                name: t.text(at, "NAME")?,
                value: t.value(t.slot(at, "VALUE")?)?,
                then: Box::new(t.contract(t.slot(at, "THEN")?)?),
            }),
            ContractKind::Assert => Ok(Contract::Assert {
                obs: t.observation(t.slot(at, "OBS")?)?,
                then: Box::new(t.contract(t.slot(at, "THEN")?)?),
            }),
        })
    }

    pub fn case(&mut self, node: NodeId) -> Result<Case, CompileError> {
        let at = match self.kind_of(node)? {
            BlockKind::Case => self.at(node, BlockKind::Case),
            found => return Err(mismatch(node, Category::Case, found)),
        };
        self.descend(node, |t| {
            Ok(Case {
                action: t.action(t.slot(at, "ACTION")?)?,
                then: t.contract(t.slot(at, "THEN")?)?,
            })
        })
    }

    // -----------------------------------------------------------------------
    // Actions, bounds, choice ids
    // -----------------------------------------------------------------------

    pub fn action(&mut self, node: NodeId) -> Result<Action, CompileError> {
        let (at, kind) = match self.kind_of(node)? {
            BlockKind::Action(kind) => (self.at(node, BlockKind::Action(kind)), kind),
            found => return Err(mismatch(node, Category::Action, found)),
        };
        self.descend(node, |t| match kind {
            ActionKind::Deposit => Ok(Action::Deposit {
                party: t.party(t.slot(at, "PARTY")?)?,
                into_account: t.party(t.slot(at, "INTO")?)?,
                token: t.token(t.slot(at, "TOKEN")?)?,
                amount: t.value(t.slot(at, "AMOUNT")?)?,
            }),
            ActionKind::Choice => {
                let choice_id = t.choice_id(t.slot(at, "CHOICE")?)?;
                let bounds = collect_chain(t.source, t.source.slot(node, "BOUNDS"))?
                    .into_iter()
                    .map(|bound| t.bound(bound))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Action::Choice { choice_id, bounds })
            }
            ActionKind::Notify => Ok(Action::Notify {
                obs: t.observation(t.slot(at, "OBS")?)?,
            }),
        })
    }

    pub fn bound(&mut self, node: NodeId) -> Result<Bound, CompileError> {
        let at = match self.kind_of(node)? {
            BlockKind::Bound => self.at(node, BlockKind::Bound),
            found => return Err(mismatch(node, Category::Bound, found)),
        };
        Ok(Bound {
            from: self.integer(at, "FROM")?,
            to: self.integer(at, "TO")?,
        })
    }

    pub fn choice_id(&mut self, node: NodeId) -> Result<ChoiceId, CompileError> {
        let at = match self.kind_of(node)? {
            BlockKind::ChoiceId => self.at(node, BlockKind::ChoiceId),
            found => return Err(mismatch(node, Category::ChoiceId, found)),
        };
        self.descend(node, |t| {
            Ok(ChoiceId {
                name: t.text(at, "NAME")?,
                owner: t.party(t.slot(at, "OWNER")?)?,
            })
        })
    }

    // -----------------------------------------------------------------------
    // Parties, payees, tokens
    // -----------------------------------------------------------------------

    pub fn party(&mut self, node: NodeId) -> Result<Party, CompileError> {
        match self.kind_of(node)? {
            BlockKind::Party(PartyKind::Role) => {
                let at = self.at(node, BlockKind::Party(PartyKind::Role));
                Ok(Party::Role(self.text(at, "ROLE")?))
            }
            BlockKind::Party(PartyKind::Address) => {
                let at = self.at(node, BlockKind::Party(PartyKind::Address));
                Ok(Party::Address(self.text(at, "ADDRESS")?))
            }
            found => Err(mismatch(node, Category::Party, found)),
        }
    }

    pub fn payee(&mut self, node: NodeId) -> Result<Payee, CompileError> {
        let (at, kind) = match self.kind_of(node)? {
            BlockKind::Payee(kind) => (self.at(node, BlockKind::Payee(kind)), kind),
            found => return Err(mismatch(node, Category::Payee, found)),
        };
        self.descend(node, |t| match kind {
            PayeeKind::Party => Ok(Payee::Party(t.party(t.slot(at, "PARTY")?)?)),
            PayeeKind::Account => Ok(Payee::Account(t.party(t.slot(at, "ACCOUNT")?)?)),
        })
    }

    pub fn token(&mut self, node: NodeId) -> Result<Token, CompileError> {
        let at = match self.kind_of(node)? {
            BlockKind::Token => self.at(node, BlockKind::Token),
            found => return Err(mismatch(node, Category::Token, found)),
        };
        Ok(Token {
            currency_symbol: self.text(at, "CURRENCY")?,
            name: self.text(at, "NAME")?,
        })
    }

    // -----------------------------------------------------------------------
    // Values and observations
    // -----------------------------------------------------------------------

    pub fn value(&mut self, node: NodeId) -> Result<Value, CompileError> {
        let (at, kind) = match self.kind_of(node)? {
            BlockKind::Value(kind) => (self.at(node, BlockKind::Value(kind)), kind),
            found => return Err(mismatch(node, Category::Value, found)),
        };
        self.descend(node, |t| match kind {
            ValueKind::Constant => Ok(Value::Constant(t.integer(at, "VALUE")?)),
            ValueKind::AvailableMoney => Ok(Value::AvailableMoney {
                token: t.token(t.slot(at, "TOKEN")?)?,
                account: t.party(t.slot(at, "PARTY")?)?,
            }),
            ValueKind::Add => {
                let (lhs, rhs) = t.value_operands(at)?;
                Ok(Value::Add(lhs, rhs))
            }
            ValueKind::Sub => {
                let (lhs, rhs) = t.value_operands(at)?;
                Ok(Value::Sub(lhs, rhs))
            }
            ValueKind::Mul => {
                let (lhs, rhs) = t.value_operands(at)?;
                Ok(Value::Mul(lhs, rhs))
            }
            ValueKind::Div => {
                let (lhs, rhs) = t.value_operands(at)?;
                Ok(Value::Div(lhs, rhs))
            }
            ValueKind::Negate => Ok(Value::Negate(Box::new(t.value(t.slot(at, "VALUE")?)?))),
            ValueKind::ChoiceValue => Ok(Value::ChoiceValue(t.choice_id(t.slot(at, "CHOICE")?)?)),
            ValueKind::TimeIntervalStart => Ok(Value::TimeIntervalStart),
            ValueKind::TimeIntervalEnd => Ok(Value::TimeIntervalEnd),
            ValueKind::UseValue => Ok(Value::UseValue(t.text(at, "NAME")?)),
            ValueKind::Cond => Ok(Value::Cond {
                obs: Box::new(t.observation(t.slot(at, "OBS")?)?),
                then: Box::new(t.value(t.slot(at, "THEN")?)?),
                otherwise: Box::new(t.value(t.slot(at, "ELSE")?)?),
            }),
        })
    }

    pub fn observation(&mut self, node: NodeId) -> Result<Observation, CompileError> {
        let (at, kind) = match self.kind_of(node)? {
            BlockKind::Observation(kind) => (self.at(node, BlockKind::Observation(kind)), kind),
            found => return Err(mismatch(node, Category::Observation, found)),
        };
        self.descend(node, |t| match kind {
            ObservationKind::True => Ok(Observation::True),
            ObservationKind::False => Ok(Observation::False),
            ObservationKind::And => {
                let (lhs, rhs) = t.observation_operands(at)?;
                Ok(Observation::And(lhs, rhs))
            }
            ObservationKind::Or => {
                let (lhs, rhs) = t.observation_operands(at)?;
                Ok(Observation::Or(lhs, rhs))
            }
            ObservationKind::Not => Ok(Observation::Not(Box::new(
                t.observation(t.slot(at, "OBS")?)?,
            ))),
            ObservationKind::ChoseSomething => Ok(Observation::ChoseSomething(
                t.choice_id(t.slot(at, "CHOICE")?)?,
            )),
            ObservationKind::Ge => t.compare(at, CompareOp::Ge),
            ObservationKind::Gt => t.compare(at, CompareOp::Gt),
            ObservationKind::Lt => t.compare(at, CompareOp::Lt),
            ObservationKind::Le => t.compare(at, CompareOp::Le),
            ObservationKind::Eq => t.compare(at, CompareOp::Eq),
        })
    }

    fn value_operands(&mut self, at: At) -> Result<(Box<Value>, Box<Value>), CompileError> {
        let lhs = self.value(self.slot(at, "LHS")?)?;
        let rhs = self.value(self.slot(at, "RHS")?)?;
        Ok((Box::new(lhs), Box::new(rhs)))
    }

    fn observation_operands(
        &mut self,
        at: At,
    ) -> Result<(Box<Observation>, Box<Observation>), CompileError> {
        let lhs = self.observation(self.slot(at, "LHS")?)?;
        let rhs = self.observation(self.slot(at, "RHS")?)?;
        Ok((Box::new(lhs), Box::new(rhs)))
    }

    fn compare(&mut self, at: At, op: CompareOp) -> Result<Observation, CompileError> {
        let (lhs, rhs) = self.value_operands(at)?;
        Ok(Observation::Compare { op, lhs, rhs })
    }

    // -----------------------------------------------------------------------
    // Graph access
    // -----------------------------------------------------------------------

    fn at(&self, node: NodeId, kind: BlockKind) -> At {
        At { node, kind }
    }

    fn kind_of(&self, node: NodeId) -> Result<BlockKind, CompileError> {
        self.source
            .kind(node)
            .ok_or(CompileError::DanglingReference { node })
    }

    /// Runs `f` with `node` on the active path, growing the stack when
    /// the graph nests deeper than the current stack allows.
    fn descend<T>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if !self.active.insert(node) {
            return Err(CompileError::CyclicSlot { at_node: node });
        }
        let result = stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || f(self));
        self.active.remove(&node);
        result
    }

    /// The child in a required slot.
    fn slot(&self, at: At, slot: &'static str) -> Result<NodeId, CompileError> {
        self.source
            .slot(at.node, slot)
            .ok_or(CompileError::MissingInput {
                node: at.node,
                block_kind: at.kind,
                slot,
            })
    }

    fn text(&self, at: At, field: &'static str) -> Result<String, CompileError> {
        self.source
            .field(at.node, field)
            .map(|value| value.as_text().into_owned())
            .ok_or(CompileError::MissingField {
                node: at.node,
                block_kind: at.kind,
                field,
            })
    }

    fn integer(&self, at: At, field: &'static str) -> Result<i64, CompileError> {
        let value = self
            .source
            .field(at.node, field)
            .ok_or(CompileError::MissingField {
                node: at.node,
                block_kind: at.kind,
                field,
            })?;
        value
            .as_integer()
            .ok_or_else(|| CompileError::InvalidNumericField {
                node: at.node,
                block_kind: at.kind,
                field,
                raw: value.as_text().into_owned(),
            })
    }
}

fn mismatch(node: NodeId, expected: Category, found: BlockKind) -> CompileError {
    CompileError::CategoryMismatch {
        node,
        expected,
        found,
    }
}
