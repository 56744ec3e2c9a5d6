//! Flatten/inflate round-trip over descriptor sequences.
//!
//! The inflate here mirrors what the runtime does with the emitted array:
//! walk the flat slots back into a tree. Round-tripping proves the count
//! slots and the literal/nested discrimination are self-describing.

use asjs_common::{DiagnosticSink, QName};
use asjs_emitter::{DescriptorValue, IRNode, TreeFlattener, count_synthesized_ids};
use asjs_model::{
    ClassDef, ClassKind, ComponentNode, ComponentValue, Expr, Member, MethodDef, SymbolTable,
};

#[derive(Debug, PartialEq)]
struct InflatedNode {
    class_ref: String,
    /// (name, literal-rendering or nested marker)
    properties: Vec<(String, InflatedValue)>,
    event: Option<String>,
    children: Vec<InflatedNode>,
}

#[derive(Debug, PartialEq)]
enum InflatedValue {
    Literal(String),
    Nested(Box<InflatedNode>),
}

fn inflate(values: &[DescriptorValue]) -> InflatedNode {
    let mut cursor = 0;
    let node = inflate_node(values, &mut cursor);
    assert_eq!(cursor, values.len(), "trailing slots after inflation");
    node
}

fn inflate_node(values: &[DescriptorValue], cursor: &mut usize) -> InflatedNode {
    let DescriptorValue::ClassRef(class_ref) = &values[*cursor] else {
        panic!("expected class ref at slot {}", *cursor);
    };
    *cursor += 1;

    let DescriptorValue::Count(prop_count) = values[*cursor] else {
        panic!("expected property count");
    };
    *cursor += 1;

    let mut properties = Vec::new();
    for _ in 0..prop_count {
        let DescriptorValue::Name(name) = &values[*cursor] else {
            panic!("expected property name");
        };
        let DescriptorValue::LiteralFlag(is_literal) = values[*cursor + 1] else {
            panic!("expected literal flag");
        };
        let value = if is_literal {
            let DescriptorValue::Literal(ir) = &values[*cursor + 2] else {
                panic!("expected literal value");
            };
            InflatedValue::Literal(format!("{ir:?}"))
        } else {
            let DescriptorValue::Nested(nested) = &values[*cursor + 2] else {
                panic!("expected nested sequence");
            };
            InflatedValue::Nested(Box::new(inflate(nested)))
        };
        properties.push((name.clone(), value));
        *cursor += 3;
    }

    let child_count = match values[*cursor] {
        DescriptorValue::Count(n) => n,
        DescriptorValue::Null => 0,
        _ => panic!("expected child count or null"),
    };
    *cursor += 1;

    let event = match &values[*cursor] {
        DescriptorValue::Name(name) => Some(name.clone()),
        DescriptorValue::Zero => None,
        _ => panic!("expected event name or zero"),
    };
    *cursor += 1;
    match (&event, &values[*cursor]) {
        (Some(_), DescriptorValue::Literal(_)) | (None, DescriptorValue::Null) => {}
        other => panic!("event slots out of shape: {other:?}"),
    }
    *cursor += 1;

    let children = (0..child_count)
        .map(|_| inflate_node(values, cursor))
        .collect();

    InflatedNode {
        class_ref: class_ref.to_string(),
        properties,
        event,
        children,
    }
}

fn view_class() -> (ClassDef, SymbolTable) {
    let mut symbols = SymbolTable::new();
    for name in ["ui.Panel", "ui.Label", "ui.Binding"] {
        let mut def = ClassDef::new(QName::parse(name), ClassKind::Class);
        def.members
            .push(Member::field("text", QName::parse("String"), None));
        def.members
            .push(Member::field("width", QName::parse("Number"), None));
        def.members
            .push(Member::field("dataSource", QName::parse("String"), None));
        symbols.insert_class(&def);
    }

    let mut class = ClassDef::new(QName::parse("app.MainView"), ClassKind::Class);
    class.members.push(Member::method(
        "onClick",
        MethodDef {
            parameters: vec![],
            return_type: QName::parse("void"),
            body: vec![],
        },
    ));
    class.component = Some(
        ComponentNode::new(QName::parse("ui.Panel"))
            .with_id("root")
            .with_property("width", ComponentValue::Literal(Expr::num("400")))
            .with_property(
                "dataSource",
                ComponentValue::Node(Box::new(
                    ComponentNode::new(QName::parse("ui.Binding"))
                        .with_property("text", ComponentValue::Literal(Expr::str("bound"))),
                )),
            )
            .with_child(
                ComponentNode::new(QName::parse("ui.Label"))
                    .with_id("title")
                    .with_property("text", ComponentValue::Literal(Expr::str("Hello")))
                    .with_event("click", "onClick"),
            )
            .with_child(ComponentNode::new(QName::parse("ui.Label"))),
    );
    symbols.insert_class(&class);
    (class, symbols)
}

fn flatten(class: &ClassDef, symbols: &SymbolTable) -> Vec<DescriptorValue> {
    let mut sink = DiagnosticSink::new();
    let values = TreeFlattener::new(class, symbols, 0)
        .flatten(&mut sink)
        .expect("flatten failed");
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
    values
}

#[test]
fn test_roundtrip_reconstructs_tree_shape() {
    let (class, symbols) = view_class();
    let values = flatten(&class, &symbols);
    let tree = inflate(&values);

    assert_eq!(tree.class_ref, "ui.Panel");
    // id first, then declared properties, literals before nested.
    let names: Vec<&str> = tree.properties.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["id", "width", "dataSource"]);
    assert!(matches!(tree.properties[2].1, InflatedValue::Nested(_)));

    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].class_ref, "ui.Label");
    assert_eq!(tree.children[0].event.as_deref(), Some("click"));
    assert_eq!(tree.children[1].event, None);
    assert!(tree.children[1].children.is_empty());

    let InflatedValue::Nested(binding) = &tree.properties[2].1 else {
        unreachable!();
    };
    assert_eq!(binding.class_ref, "ui.Binding");
    assert_eq!(binding.properties.len(), 2); // _id + text
}

#[test]
fn test_child_count_slot_matches_children() {
    let (class, symbols) = view_class();
    let values = flatten(&class, &symbols);

    // Root: classRef, propCount, 3 property triples, then the child count.
    let child_count_slot = 2 + 3 * 3;
    assert_eq!(values[child_count_slot], DescriptorValue::Count(2));
}

#[test]
fn test_synthesized_id_count_and_stability() {
    let (class, symbols) = view_class();
    assert_eq!(count_synthesized_ids(class.component.as_ref().unwrap()), 2);

    let first = flatten(&class, &symbols);
    let second = flatten(&class, &symbols);
    assert_eq!(first, second);

    let ids: Vec<&str> = collect_ids(&first);
    assert_eq!(ids, vec!["$ID_0", "$ID_1"]);
}

fn collect_ids(values: &[DescriptorValue]) -> Vec<&str> {
    let mut ids = Vec::new();
    for value in values {
        match value {
            DescriptorValue::Literal(IRNode::StringLiteral(s)) if s.starts_with("$ID_") => {
                ids.push(s.as_str());
            }
            DescriptorValue::Nested(nested) => ids.extend(collect_ids(nested)),
            _ => {}
        }
    }
    ids
}

#[test]
fn test_malformed_tree_reports_and_degrades() {
    let (mut class, symbols) = view_class();
    class.component = Some(
        ComponentNode::new(QName::parse("ui.Panel"))
            .with_property("noSuchProp", ComponentValue::Literal(Expr::num("1"))),
    );

    let mut sink = DiagnosticSink::new();
    let values = TreeFlattener::new(&class, &symbols, 0).flatten(&mut sink);
    assert!(values.is_none());
    assert_eq!(sink.len(), 1);
    assert_eq!(
        sink.diagnostics()[0].code,
        asjs_common::diagnostic_codes::MALFORMED_COMPONENT_TREE
    );
    assert!(sink.diagnostics()[0].message_text.contains("noSuchProp"));
}
