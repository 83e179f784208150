//! The contract document: the immutable IR produced by a compile.
//!
//! One enum or struct per grammar category. Recursive positions are boxed.
//! Binary operators keep their operands in declaration order (`lhs`
//! first); the serializer relies on that order to pick output keys.

/// A contract, the top-level document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contract {
    Close,
    Pay {
        from: Party,
        to: Payee,
        token: Token,
        amount: Value,
        then: Box<Contract>,
    },
    If {
        cond: Observation,
        then: Box<Contract>,
        otherwise: Box<Contract>,
    },
    When {
        /// Cases in priority order.
        cases: Vec<Case>,
        timeout: i64,
        timeout_continuation: Box<Contract>,
    },
    Let {
        name: String,
        value: Value,
        then: Box<Contract>,
    },
    Assert {
        obs: Observation,
        then: Box<Contract>,
    },
}

/// One branch of a `When`: the action that triggers it and what follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub action: Action,
    pub then: Contract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Deposit {
        party: Party,
        into_account: Party,
        token: Token,
        amount: Value,
    },
    Choice {
        choice_id: ChoiceId,
        bounds: Vec<Bound>,
    },
    Notify {
        obs: Observation,
    },
}

/// Inclusive range of acceptable choice values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceId {
    pub name: String,
    pub owner: Party,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Party {
    Role(String),
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payee {
    /// Pay out to the party itself.
    Party(Party),
    /// Pay into the party's internal account.
    Account(Party),
}

/// A token; empty currency symbol and name denote the native asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub currency_symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Constant(i64),
    AvailableMoney {
        token: Token,
        account: Party,
    },
    Add(Box<Value>, Box<Value>),
    Sub(Box<Value>, Box<Value>),
    Mul(Box<Value>, Box<Value>),
    Div(Box<Value>, Box<Value>),
    Negate(Box<Value>),
    ChoiceValue(ChoiceId),
    TimeIntervalStart,
    TimeIntervalEnd,
    UseValue(String),
    Cond {
        obs: Box<Observation>,
        then: Box<Value>,
        otherwise: Box<Value>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Ge,
    Gt,
    Lt,
    Le,
    Eq,
}

impl CompareOp {
    /// Document key under which the right-hand operand is written.
    pub fn key(self) -> &'static str {
        match self {
            CompareOp::Ge => "ge_than",
            CompareOp::Gt => "gt",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le_than",
            CompareOp::Eq => "equal_to",
        }
    }

    pub fn from_key(key: &str) -> Option<CompareOp> {
        [
            CompareOp::Ge,
            CompareOp::Gt,
            CompareOp::Lt,
            CompareOp::Le,
            CompareOp::Eq,
        ]
        .into_iter()
        .find(|op| op.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    True,
    False,
    And(Box<Observation>, Box<Observation>),
    Or(Box<Observation>, Box<Observation>),
    Not(Box<Observation>),
    ChoseSomething(ChoiceId),
    Compare {
        op: CompareOp,
        lhs: Box<Value>,
        rhs: Box<Value>,
    },
}

impl Contract {
    /// Number of contract nodes in the document, counting nested
    /// continuations and case bodies.
    pub fn size(&self) -> usize {
        let mut pending = vec![self];
        let mut size = 0;
        while let Some(contract) = pending.pop() {
            size += 1;
            match contract {
                Contract::Close => {}
                Contract::Pay { then, .. }
                | Contract::Let { then, .. }
                | Contract::Assert { then, .. } => pending.push(then),
                Contract::If {
                    then, otherwise, ..
                } => pending.extend([&**then, &**otherwise]),
                Contract::When {
                    cases,
                    timeout_continuation,
                    ..
                } => {
                    pending.extend(cases.iter().map(|case| &case.then));
                    pending.push(timeout_continuation);
                }
            }
        }
        size
    }
}
