use super::*;
use luna_ir::{FunctionTypeExpr, ParamTypeExpr};
use pretty_assertions::assert_eq;

fn name(s: &str) -> TypeExpr {
    TypeExpr::Name(s.to_owned())
}

fn parse_lines(lines: &[&str]) -> (luna_ir::SyntaxTree, NodeId) {
    let source: String = lines.iter().map(|l| format!("---{l}\n")).collect();
    let lexed = luna_lexer::lex(&source);
    let blocks = luna_lexer::doc_blocks(&source, &lexed.comments);
    let mut builder = TreeBuilder::new();
    let doc = parse_doc_block(&mut builder, &blocks[0]);
    (builder.finish(doc), doc)
}

fn tags(lines: &[&str]) -> Vec<DocTagKind> {
    let (tree, doc) = parse_lines(lines);
    match tree.kind(doc) {
        NodeKind::DocComment(doc) => doc.tags().cloned().collect(),
        other => panic!("expected doc comment, got {other:?}"),
    }
}

fn errors(lines: &[&str]) -> Vec<String> {
    let (tree, _) = parse_lines(lines);
    tree.errors()
        .filter_map(|id| match tree.kind(id) {
            NodeKind::Error { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn type_expressions() {
    assert_eq!(parse_type_expr("number"), Some(name("number")));
    assert_eq!(
        parse_type_expr("string[]"),
        Some(TypeExpr::Array(Box::new(name("string"))))
    );
    assert_eq!(
        parse_type_expr("A | B | nil"),
        Some(TypeExpr::Union(vec![name("A"), name("B"), name("nil")]))
    );
    assert_eq!(
        parse_type_expr("[number, Ns.Point]"),
        Some(TypeExpr::Tuple(vec![name("number"), name("Ns.Point")]))
    );
    assert_eq!(
        parse_type_expr("table<string, number>"),
        Some(TypeExpr::Applied {
            base: "table".to_owned(),
            args: vec![name("string"), name("number")],
        })
    );
    assert_eq!(
        parse_type_expr("(A | B)[]"),
        Some(TypeExpr::Array(Box::new(TypeExpr::Union(vec![
            name("A"),
            name("B")
        ]))))
    );
    assert_eq!(
        parse_type_expr("string?"),
        Some(TypeExpr::Union(vec![name("string"), name("nil")]))
    );
}

#[test]
fn function_type_expression() {
    let parsed = parse_type_expr("fun(a: number, b?: string, ...: any): boolean, string");
    let expected = FunctionTypeExpr {
        params: vec![
            ParamTypeExpr {
                name: "a".to_owned(),
                optional: false,
                ty: name("number"),
            },
            ParamTypeExpr {
                name: "b".to_owned(),
                optional: true,
                ty: name("string"),
            },
        ],
        returns: vec![name("boolean"), name("string")],
        vararg: Some(Box::new(name("any"))),
    };
    assert_eq!(parsed, Some(TypeExpr::Function(expected)));
}

#[test]
fn nested_function_type_return_stops_at_comma() {
    let Some(TypeExpr::Function(outer)) = parse_type_expr("fun(cb: fun(): number, n: integer)")
    else {
        panic!("expected function type");
    };
    assert_eq!(outer.params.len(), 2);
    assert_eq!(outer.params[1].ty, name("integer"));
}

#[test]
fn malformed_type_is_rejected() {
    assert_eq!(parse_type_expr("A |"), None);
    assert_eq!(parse_type_expr("fun(a: number"), None);
    assert_eq!(parse_type_expr("[A, B"), None);
}

#[test]
fn class_and_field_tags() {
    assert_eq!(
        tags(&[
            "@class Dog : Animal",
            "@field name string",
            "@field private age? integer the age",
        ]),
        vec![
            DocTagKind::Class {
                name: "Dog".to_owned(),
                super_name: Some("Animal".to_owned()),
            },
            DocTagKind::Field {
                visibility: Visibility::Public,
                name: "name".to_owned(),
                optional: false,
                ty: name("string"),
            },
            DocTagKind::Field {
                visibility: Visibility::Private,
                name: "age".to_owned(),
                optional: true,
                ty: name("integer"),
            },
        ]
    );
}

#[test]
fn function_tags() {
    assert_eq!(
        tags(&[
            "@generic T",
            "@param value T the value",
            "@param ... string",
            "@return T, boolean",
            "@overload fun(): nil",
        ]),
        vec![
            DocTagKind::Generic {
                names: vec!["T".to_owned()]
            },
            DocTagKind::Param {
                name: "value".to_owned(),
                optional: false,
                ty: name("T"),
            },
            DocTagKind::Vararg { ty: name("string") },
            DocTagKind::Return {
                types: vec![name("T"), name("boolean")]
            },
            DocTagKind::Overload {
                ty: FunctionTypeExpr {
                    returns: vec![name("nil")],
                    ..FunctionTypeExpr::default()
                }
            },
        ]
    );
}

#[test]
fn description_and_unknown_tags() {
    let (tree, doc) = parse_lines(&[" Adds two numbers.", "@deprecated", "@type number"]);
    let NodeKind::DocComment(doc) = tree.kind(doc) else {
        panic!("expected doc comment");
    };
    assert_eq!(doc.description, "Adds two numbers.");
    assert_eq!(
        doc.tags().cloned().collect::<Vec<_>>(),
        vec![DocTagKind::Type { ty: name("number") }]
    );
}

#[test]
fn malformed_tags_become_error_children() {
    assert_eq!(
        errors(&["@param x", "@class", "@overload number"]),
        vec![
            "expected type in @param annotation".to_owned(),
            "expected class name in @class annotation".to_owned(),
            "expected function type in @overload annotation".to_owned(),
        ]
    );
}

#[test]
fn error_spans_stay_inside_the_block() {
    let (tree, doc) = parse_lines(&["@type A |"]);
    let block_span = tree.span(doc);
    for error in tree.errors() {
        assert!(tree.is_inside_doc(error));
        let span = tree.span(error);
        assert!(span.start >= block_span.start && span.end <= block_span.end);
    }
    assert_eq!(tree.errors().count(), 1);
}
