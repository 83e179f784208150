//! Property tests: graphs built from arbitrary value trees compile back to
//! the same tree, and serialized documents read back unchanged.

use proptest::prelude::*;

use marlowe_blocks_compile::{
    compile, read_document, serialize, ChoiceId, Contract, Observation, Party, Token, Value,
};
use marlowe_blocks_core::{
    BlockGraph, BlockKind, ContractKind, NodeId, ObservationKind, PartyKind, ValueKind,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn party() -> impl Strategy<Value = Party> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9 ]{0,11}".prop_map(Party::Role),
        "addr_test1[a-z0-9]{4,20}".prop_map(Party::Address),
    ]
}

fn token() -> impl Strategy<Value = Token> {
    ("[a-f0-9]{0,8}", "[A-Za-z]{0,6}").prop_map(|(currency_symbol, name)| Token {
        currency_symbol,
        name,
    })
}

fn choice_id() -> impl Strategy<Value = ChoiceId> {
    ("[a-z]{1,8}", party()).prop_map(|(name, owner)| ChoiceId { name, owner })
}

fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::Constant),
        Just(Value::TimeIntervalStart),
        Just(Value::TimeIntervalEnd),
        "[a-z]{1,8}".prop_map(Value::UseValue),
        choice_id().prop_map(Value::ChoiceValue),
        (token(), party()).prop_map(|(token, account)| Value::AvailableMoney { token, account }),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Value::Add(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Value::Sub(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Value::Mul(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Value::Div(Box::new(l), Box::new(r))),
            inner.clone().prop_map(|v| Value::Negate(Box::new(v))),
            (any::<bool>(), inner.clone(), inner).prop_map(|(cond, then, otherwise)| {
                Value::Cond {
                    obs: Box::new(if cond {
                        Observation::True
                    } else {
                        Observation::False
                    }),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                }
            }),
        ]
    })
}

// ---------------------------------------------------------------------------
// Graph builders
// ---------------------------------------------------------------------------

fn build_party(graph: &mut BlockGraph, party: &Party) -> NodeId {
    match party {
        Party::Role(role) => {
            let node = graph.add_block(BlockKind::Party(PartyKind::Role));
            graph.set_field(node, "ROLE", role.as_str()).unwrap();
            node
        }
        Party::Address(address) => {
            let node = graph.add_block(BlockKind::Party(PartyKind::Address));
            graph.set_field(node, "ADDRESS", address.as_str()).unwrap();
            node
        }
    }
}

fn build_token(graph: &mut BlockGraph, token: &Token) -> NodeId {
    let node = graph.add_block(BlockKind::Token);
    graph
        .set_field(node, "CURRENCY", token.currency_symbol.as_str())
        .unwrap();
    graph.set_field(node, "NAME", token.name.as_str()).unwrap();
    node
}

fn build_choice_id(graph: &mut BlockGraph, choice_id: &ChoiceId) -> NodeId {
    let node = graph.add_block(BlockKind::ChoiceId);
    graph.set_field(node, "NAME", choice_id.name.as_str()).unwrap();
    let owner = build_party(graph, &choice_id.owner);
    graph.connect(node, "OWNER", owner).unwrap();
    node
}

fn build_observation(graph: &mut BlockGraph, obs: &Observation) -> NodeId {
    let kind = match obs {
        Observation::True => ObservationKind::True,
        Observation::False => ObservationKind::False,
        other => unreachable!("strategy only generates constants, got {other:?}"),
    };
    graph.add_block(BlockKind::Observation(kind))
}

fn build_binary(graph: &mut BlockGraph, kind: ValueKind, lhs: &Value, rhs: &Value) -> NodeId {
    let node = graph.add_block(BlockKind::Value(kind));
    let lhs = build_value(graph, lhs);
    let rhs = build_value(graph, rhs);
    graph.connect(node, "LHS", lhs).unwrap();
    graph.connect(node, "RHS", rhs).unwrap();
    node
}

fn build_value(graph: &mut BlockGraph, value: &Value) -> NodeId {
    match value {
        Value::Constant(n) => {
            let node = graph.add_block(BlockKind::Value(ValueKind::Constant));
            graph.set_field(node, "VALUE", *n).unwrap();
            node
        }
        Value::AvailableMoney { token, account } => {
            let node = graph.add_block(BlockKind::Value(ValueKind::AvailableMoney));
            let token = build_token(graph, token);
            let account = build_party(graph, account);
            graph.connect(node, "TOKEN", token).unwrap();
            graph.connect(node, "PARTY", account).unwrap();
            node
        }
        Value::Add(lhs, rhs) => build_binary(graph, ValueKind::Add, lhs, rhs),
        Value::Sub(lhs, rhs) => build_binary(graph, ValueKind::Sub, lhs, rhs),
        Value::Mul(lhs, rhs) => build_binary(graph, ValueKind::Mul, lhs, rhs),
        Value::Div(lhs, rhs) => build_binary(graph, ValueKind::Div, lhs, rhs),
        Value::Negate(inner) => {
            let node = graph.add_block(BlockKind::Value(ValueKind::Negate));
            let inner = build_value(graph, inner);
            graph.connect(node, "VALUE", inner).unwrap();
            node
        }
        Value::ChoiceValue(choice_id) => {
            let node = graph.add_block(BlockKind::Value(ValueKind::ChoiceValue));
            let choice = build_choice_id(graph, choice_id);
            graph.connect(node, "CHOICE", choice).unwrap();
            node
        }
        Value::TimeIntervalStart => graph.add_block(BlockKind::Value(ValueKind::TimeIntervalStart)),
        Value::TimeIntervalEnd => graph.add_block(BlockKind::Value(ValueKind::TimeIntervalEnd)),
        Value::UseValue(name) => {
            let node = graph.add_block(BlockKind::Value(ValueKind::UseValue));
            graph.set_field(node, "NAME", name.as_str()).unwrap();
            node
        }
        Value::Cond {
            obs,
            then,
            otherwise,
        } => {
            let node = graph.add_block(BlockKind::Value(ValueKind::Cond));
            let obs = build_observation(graph, obs);
            let then = build_value(graph, then);
            let otherwise = build_value(graph, otherwise);
            graph.connect(node, "OBS", obs).unwrap();
            graph.connect(node, "THEN", then).unwrap();
            graph.connect(node, "ELSE", otherwise).unwrap();
            node
        }
    }
}

/// root -> let `name` = value in close
fn let_graph(name: &str, value: &Value) -> BlockGraph {
    let mut graph = BlockGraph::new();
    let root = graph.add_block(BlockKind::Root);
    let body = graph.add_block(BlockKind::Contract(ContractKind::Let));
    graph.set_field(body, "NAME", name).unwrap();
    let value = build_value(&mut graph, value);
    let then = graph.add_block(BlockKind::Contract(ContractKind::Close));
    graph.connect(body, "VALUE", value).unwrap();
    graph.connect(body, "THEN", then).unwrap();
    graph.connect(root, "CONTRACT", body).unwrap();
    graph
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn compile_recovers_the_value(value in value(), name in "[a-z]{1,6}") {
        let graph = let_graph(&name, &value);
        let expected = Contract::Let {
            name,
            value,
            then: Box::new(Contract::Close),
        };
        prop_assert_eq!(compile(&graph), Ok(expected));
    }

    #[test]
    fn serialized_documents_read_back(value in value()) {
        let document = Contract::Let {
            name: "v".to_string(),
            value,
            then: Box::new(Contract::Close),
        };
        let text = serialize(&document);
        prop_assert!(!text.ends_with('\n'));
        prop_assert!(text.lines().all(|line| !line.ends_with(' ')));
        prop_assert_eq!(read_document(&text).unwrap(), document);
    }
}
