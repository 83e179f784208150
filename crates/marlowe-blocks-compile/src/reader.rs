//! Reading a serialized contract document back into the IR.
//!
//! The document format has no explicit variant tags: a variant is known by
//! its JSON type and, for objects, by its exact key set. The reader matches
//! the sorted key set of each object against the shapes the serializer
//! emits and rejects anything else, naming the JSON path of the offending
//! value (`$.when[0].case.party`).

use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::document::{
    Action, Bound, Case, ChoiceId, CompareOp, Contract, Observation, Party, Payee, Token, Value,
};
use crate::error::ReadError;

/// Parses document text produced by [`crate::serialize::serialize`].
///
/// Documents nest as deep as the contracts they describe, so parsing has
/// no nesting limit.
pub fn read_document(text: &str) -> Result<Contract, ReadError> {
    let mut parser = serde_json::Deserializer::from_str(text);
    parser.disable_recursion_limit();
    let json = Json::deserialize(serde_stacker::Deserializer::new(&mut parser))?;
    parser.end()?;
    read_contract(&json, "$")
}

/// Remaining stack below which reading moves to a fresh segment.
const RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated for deep documents.
const STACK_SEGMENT: usize = 1024 * 1024;

type Read<T> = fn(&Json, &str) -> Result<T, ReadError>;

/// An object whose key set has already been matched.
struct Object<'j, 'p> {
    map: &'j Map<String, Json>,
    path: &'p str,
}

impl Object<'_, '_> {
    fn read<T>(&self, key: &str, read: Read<T>) -> Result<T, ReadError> {
        let value = self.map.get(key).unwrap_or(&Json::Null);
        let path = format!("{}.{key}", self.path);
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || read(value, &path))
    }

    fn boxed<T>(&self, key: &str, read: Read<T>) -> Result<Box<T>, ReadError> {
        self.read(key, read).map(Box::new)
    }

    fn list<T>(&self, key: &str, read: Read<T>) -> Result<Vec<T>, ReadError> {
        let path = format!("{}.{key}", self.path);
        match self.map.get(key) {
            Some(Json::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| read(item, &format!("{path}[{i}]")))
                .collect(),
            other => Err(unrecognized("list", &path, other.unwrap_or(&Json::Null))),
        }
    }
}

fn shape(map: &Map<String, Json>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

fn unrecognized(expected: &'static str, path: &str, found: &Json) -> ReadError {
    let found = match found {
        Json::Object(map) => format!("object with keys {{{}}}", shape(map).join(", ")),
        Json::Array(items) => format!("list of {}", items.len()),
        scalar => scalar.to_string(),
    };
    ReadError::Unrecognized {
        expected,
        path: path.to_string(),
        found,
    }
}

fn read_contract(json: &Json, path: &str) -> Result<Contract, ReadError> {
    let map = match json {
        Json::String(s) if s == "close" => return Ok(Contract::Close),
        Json::Object(map) => map,
        other => return Err(unrecognized("contract", path, other)),
    };
    let obj = Object { map, path };
    match shape(map).as_slice() {
        ["from_account", "pay", "then", "to", "token"] => Ok(Contract::Pay {
            from: obj.read("from_account", read_party)?,
            to: obj.read("to", read_payee)?,
            token: obj.read("token", read_token)?,
            amount: obj.read("pay", read_value)?,
            then: obj.boxed("then", read_contract)?,
        }),
        ["else", "if", "then"] => Ok(Contract::If {
            cond: obj.read("if", read_observation)?,
            then: obj.boxed("then", read_contract)?,
            otherwise: obj.boxed("else", read_contract)?,
        }),
        ["timeout", "timeout_continuation", "when"] => Ok(Contract::When {
            cases: obj.list("when", read_case)?,
            timeout: obj.read("timeout", read_integer)?,
            timeout_continuation: obj.boxed("timeout_continuation", read_contract)?,
        }),
        ["be", "let", "then"] => Ok(Contract::Let {
            name: obj.read("let", read_text)?,
            value: obj.read("be", read_value)?,
            then: obj.boxed("then", read_contract)?,
        }),
        ["assert", "then"] => Ok(Contract::Assert {
            obs: obj.read("assert", read_observation)?,
            then: obj.boxed("then", read_contract)?,
        }),
        _ => Err(unrecognized("contract", path, json)),
    }
}

fn read_case(json: &Json, path: &str) -> Result<Case, ReadError> {
    match json {
        Json::Object(map) if shape(map) == ["case", "then"] => {
            let obj = Object { map, path };
            Ok(Case {
                action: obj.read("case", read_action)?,
                then: obj.read("then", read_contract)?,
            })
        }
        other => Err(unrecognized("case", path, other)),
    }
}

fn read_action(json: &Json, path: &str) -> Result<Action, ReadError> {
    let Json::Object(map) = json else {
        return Err(unrecognized("action", path, json));
    };
    let obj = Object { map, path };
    match shape(map).as_slice() {
        ["deposits", "into_account", "of_token", "party"] => Ok(Action::Deposit {
            party: obj.read("party", read_party)?,
            into_account: obj.read("into_account", read_party)?,
            token: obj.read("of_token", read_token)?,
            amount: obj.read("deposits", read_value)?,
        }),
        ["choose_between", "for_choice"] => Ok(Action::Choice {
            choice_id: obj.read("for_choice", read_choice_id)?,
            bounds: obj.list("choose_between", read_bound)?,
        }),
        ["notify_if"] => Ok(Action::Notify {
            obs: obj.read("notify_if", read_observation)?,
        }),
        _ => Err(unrecognized("action", path, json)),
    }
}

fn read_bound(json: &Json, path: &str) -> Result<Bound, ReadError> {
    match json {
        Json::Object(map) if shape(map) == ["from", "to"] => {
            let obj = Object { map, path };
            Ok(Bound {
                from: obj.read("from", read_integer)?,
                to: obj.read("to", read_integer)?,
            })
        }
        other => Err(unrecognized("bound", path, other)),
    }
}

fn read_choice_id(json: &Json, path: &str) -> Result<ChoiceId, ReadError> {
    match json {
        Json::Object(map) if shape(map) == ["choice_name", "choice_owner"] => {
            let obj = Object { map, path };
            Ok(ChoiceId {
                name: obj.read("choice_name", read_text)?,
                owner: obj.read("choice_owner", read_party)?,
            })
        }
        other => Err(unrecognized("choice id", path, other)),
    }
}

fn read_party(json: &Json, path: &str) -> Result<Party, ReadError> {
    if let Json::Object(map) = json {
        let obj = Object { map, path };
        match shape(map).as_slice() {
            ["role_token"] => return Ok(Party::Role(obj.read("role_token", read_text)?)),
            ["address"] => return Ok(Party::Address(obj.read("address", read_text)?)),
            _ => {}
        }
    }
    Err(unrecognized("party", path, json))
}

fn read_payee(json: &Json, path: &str) -> Result<Payee, ReadError> {
    if let Json::Object(map) = json {
        let obj = Object { map, path };
        match shape(map).as_slice() {
            ["party"] => return Ok(Payee::Party(obj.read("party", read_party)?)),
            ["account"] => return Ok(Payee::Account(obj.read("account", read_party)?)),
            _ => {}
        }
    }
    Err(unrecognized("payee", path, json))
}

fn read_token(json: &Json, path: &str) -> Result<Token, ReadError> {
    match json {
        Json::Object(map) if shape(map) == ["currency_symbol", "token_name"] => {
            let obj = Object { map, path };
            Ok(Token {
                currency_symbol: obj.read("currency_symbol", read_text)?,
                name: obj.read("token_name", read_text)?,
            })
        }
        other => Err(unrecognized("token", path, other)),
    }
}

fn read_value(json: &Json, path: &str) -> Result<Value, ReadError> {
    let map = match json {
        Json::Number(_) => return read_integer(json, path).map(Value::Constant),
        Json::String(s) if s == "time_interval_start" => return Ok(Value::TimeIntervalStart),
        Json::String(s) if s == "time_interval_end" => return Ok(Value::TimeIntervalEnd),
        Json::Object(map) => map,
        other => return Err(unrecognized("value", path, other)),
    };
    let obj = Object { map, path };
    match shape(map).as_slice() {
        ["amount_of_token", "in_account"] => Ok(Value::AvailableMoney {
            token: obj.read("amount_of_token", read_token)?,
            account: obj.read("in_account", read_party)?,
        }),
        ["add", "and"] => Ok(Value::Add(
            obj.boxed("add", read_value)?,
            obj.boxed("and", read_value)?,
        )),
        ["minus", "value"] => Ok(Value::Sub(
            obj.boxed("value", read_value)?,
            obj.boxed("minus", read_value)?,
        )),
        ["multiply", "times"] => Ok(Value::Mul(
            obj.boxed("times", read_value)?,
            obj.boxed("multiply", read_value)?,
        )),
        ["by", "divide"] => Ok(Value::Div(
            obj.boxed("divide", read_value)?,
            obj.boxed("by", read_value)?,
        )),
        ["negate"] => Ok(Value::Negate(obj.boxed("negate", read_value)?)),
        ["value_of_choice"] => Ok(Value::ChoiceValue(
            obj.read("value_of_choice", read_choice_id)?,
        )),
        ["use_value"] => Ok(Value::UseValue(obj.read("use_value", read_text)?)),
        ["else", "if", "then"] => Ok(Value::Cond {
            obs: obj.boxed("if", read_observation)?,
            then: obj.boxed("then", read_value)?,
            otherwise: obj.boxed("else", read_value)?,
        }),
        _ => Err(unrecognized("value", path, json)),
    }
}

fn read_observation(json: &Json, path: &str) -> Result<Observation, ReadError> {
    let map = match json {
        Json::Bool(true) => return Ok(Observation::True),
        Json::Bool(false) => return Ok(Observation::False),
        Json::Object(map) => map,
        other => return Err(unrecognized("observation", path, other)),
    };
    let obj = Object { map, path };
    match shape(map).as_slice() {
        ["and", "both"] => Ok(Observation::And(
            obj.boxed("both", read_observation)?,
            obj.boxed("and", read_observation)?,
        )),
        ["either", "or"] => Ok(Observation::Or(
            obj.boxed("either", read_observation)?,
            obj.boxed("or", read_observation)?,
        )),
        ["not"] => Ok(Observation::Not(obj.boxed("not", read_observation)?)),
        ["chose_something_for"] => Ok(Observation::ChoseSomething(
            obj.read("chose_something_for", read_choice_id)?,
        )),
        [key, "value"] => match CompareOp::from_key(key) {
            Some(op) => Ok(Observation::Compare {
                op,
                lhs: obj.boxed("value", read_value)?,
                rhs: obj.boxed(op.key(), read_value)?,
            }),
            None => Err(unrecognized("observation", path, json)),
        },
        _ => Err(unrecognized("observation", path, json)),
    }
}

fn read_text(json: &Json, path: &str) -> Result<String, ReadError> {
    match json {
        Json::String(s) => Ok(s.clone()),
        other => Err(unrecognized("string", path, other)),
    }
}

fn read_integer(json: &Json, path: &str) -> Result<i64, ReadError> {
    json.as_i64()
        .ok_or_else(|| unrecognized("integer", path, json))
}
