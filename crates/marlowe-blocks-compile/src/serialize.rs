//! Contract document to JSON text.
//!
//! Every variant is written as a JSON object whose keys appear in a fixed
//! order, so equal documents always produce equal text. Terminal variants
//! collapse to scalars: `Close` is the string `"close"`, constants are bare
//! integers, `True`/`False` are booleans and the time interval bounds are
//! strings. The transform is structural and infallible.

use serde_json::{Map, Value as Json};

use crate::document::{
    Action, Bound, Case, ChoiceId, Contract, Observation, Party, Payee, Token, Value,
};

/// Serializes a document as JSON with two-space indentation and no
/// trailing newline.
pub fn serialize(contract: &Contract) -> String {
    format!("{:#}", contract_json(contract))
}

/// The document as a JSON value, keys in emission order.
pub fn to_json(contract: &Contract) -> Json {
    contract_json(contract)
}

impl serde::Serialize for Contract {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&contract_json(self), serializer)
    }
}

fn object<const N: usize>(entries: [(&str, Json); N]) -> Json {
    let mut map = Map::with_capacity(N);
    for (key, value) in entries {
        map.insert(key.to_string(), value);
    }
    Json::Object(map)
}

fn contract_json(contract: &Contract) -> Json {
    match contract {
        Contract::Close => Json::from("close"),
        Contract::Pay {
            from,
            to,
            token,
            amount,
            then,
        } => object([
            ("from_account", party_json(from)),
            ("to", payee_json(to)),
            ("token", token_json(token)),
            ("pay", value_json(amount)),
            ("then", contract_json(then)),
        ]),
        Contract::If {
            cond,
            then,
            otherwise,
        } => object([
            ("if", observation_json(cond)),
            ("then", contract_json(then)),
            ("else", contract_json(otherwise)),
        ]),
        Contract::When {
            cases,
            timeout,
            timeout_continuation,
        } => object([
            ("when", cases.iter().map(case_json).collect()),
            ("timeout", Json::from(*timeout)),
            ("timeout_continuation", contract_json(timeout_continuation)),
        ]),
        Contract::Let { name, value, then } => object([
            ("let", Json::from(name.as_str())),
            ("be", value_json(value)),
            ("then", contract_json(then)),
        ]),
        Contract::Assert { obs, then } => object([
            ("assert", observation_json(obs)),
            ("then", contract_json(then)),
        ]),
    }
}

fn case_json(case: &Case) -> Json {
    object([
        ("case", action_json(&case.action)),
        ("then", contract_json(&case.then)),
    ])
}

fn action_json(action: &Action) -> Json {
    match action {
        Action::Deposit {
            party,
            into_account,
            token,
            amount,
        } => object([
            ("party", party_json(party)),
            ("of_token", token_json(token)),
            ("into_account", party_json(into_account)),
            ("deposits", value_json(amount)),
        ]),
        Action::Choice { choice_id, bounds } => object([
            ("for_choice", choice_id_json(choice_id)),
            ("choose_between", bounds.iter().map(bound_json).collect()),
        ]),
        Action::Notify { obs } => object([("notify_if", observation_json(obs))]),
    }
}

fn bound_json(bound: &Bound) -> Json {
    object([("from", Json::from(bound.from)), ("to", Json::from(bound.to))])
}

fn choice_id_json(choice_id: &ChoiceId) -> Json {
    object([
        ("choice_name", Json::from(choice_id.name.as_str())),
        ("choice_owner", party_json(&choice_id.owner)),
    ])
}

fn party_json(party: &Party) -> Json {
    match party {
        Party::Role(role) => object([("role_token", Json::from(role.as_str()))]),
        Party::Address(address) => object([("address", Json::from(address.as_str()))]),
    }
}

fn payee_json(payee: &Payee) -> Json {
    match payee {
        Payee::Party(party) => object([("party", party_json(party))]),
        Payee::Account(party) => object([("account", party_json(party))]),
    }
}

fn token_json(token: &Token) -> Json {
    object([
        ("currency_symbol", Json::from(token.currency_symbol.as_str())),
        ("token_name", Json::from(token.name.as_str())),
    ])
}

fn value_json(value: &Value) -> Json {
    match value {
        Value::Constant(n) => Json::from(*n),
        Value::AvailableMoney { token, account } => object([
            ("amount_of_token", token_json(token)),
            ("in_account", party_json(account)),
        ]),
        Value::Add(lhs, rhs) => values("add", lhs, "and", rhs),
        Value::Sub(lhs, rhs) => values("value", lhs, "minus", rhs),
        Value::Mul(lhs, rhs) => values("times", lhs, "multiply", rhs),
        Value::Div(lhs, rhs) => values("divide", lhs, "by", rhs),
        Value::Negate(inner) => object([("negate", value_json(inner))]),
        Value::ChoiceValue(choice_id) => object([("value_of_choice", choice_id_json(choice_id))]),
        Value::TimeIntervalStart => Json::from("time_interval_start"),
        Value::TimeIntervalEnd => Json::from("time_interval_end"),
        Value::UseValue(name) => object([("use_value", Json::from(name.as_str()))]),
        Value::Cond {
            obs,
            then,
            otherwise,
        } => object([
            ("if", observation_json(obs)),
            ("then", value_json(then)),
            ("else", value_json(otherwise)),
        ]),
    }
}

fn observation_json(obs: &Observation) -> Json {
    match obs {
        Observation::True => Json::Bool(true),
        Observation::False => Json::Bool(false),
        Observation::And(lhs, rhs) => observations("both", lhs, "and", rhs),
        Observation::Or(lhs, rhs) => observations("either", lhs, "or", rhs),
        Observation::Not(inner) => object([("not", observation_json(inner))]),
        Observation::ChoseSomething(choice_id) => {
            object([("chose_something_for", choice_id_json(choice_id))])
        }
        Observation::Compare { op, lhs, rhs } => values("value", lhs, op.key(), rhs),
    }
}

fn values(lhs_key: &str, lhs: &Value, rhs_key: &str, rhs: &Value) -> Json {
    object([(lhs_key, value_json(lhs)), (rhs_key, value_json(rhs))])
}

fn observations(lhs_key: &str, lhs: &Observation, rhs_key: &str, rhs: &Observation) -> Json {
    object([(lhs_key, observation_json(lhs)), (rhs_key, observation_json(rhs))])
}
