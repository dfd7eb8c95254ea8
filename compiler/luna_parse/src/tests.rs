use super::*;
use luna_ir::{BinaryOp, DocTagKind, TableField};
use pretty_assertions::assert_eq;

fn stmts(tree: &SyntaxTree) -> Vec<NodeId> {
    let NodeKind::Chunk { block } = tree.kind(tree.root()) else {
        panic!("root must be a chunk");
    };
    match tree.kind(*block) {
        NodeKind::Block { stmts } => stmts.clone(),
        other => panic!("expected block, got {other:?}"),
    }
}

fn error_messages(tree: &SyntaxTree) -> Vec<String> {
    tree.errors()
        .filter_map(|id| match tree.kind(id) {
            NodeKind::Error { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn parses_clean_file_without_errors() {
    let source = r#"
local a, b <const> = 1, "two"
function M.f(x, ...) return x end
function M:g() self.x = 1 end
local function h() end
if a then b = 2 elseif b then a = 1 else a = 3 end
while a < 3 do a = a + 1 end
repeat a = a - 1 until a == 0
for i = 1, 10, 2 do print(i) end
for k, v in pairs(t) do print(k, v) end
do goto done end
::done::
obj:method { 1, x = 2, [3] = 4; }
print "hi"
local s = [[
long]]
"#;
    let tree = parse(source);
    assert_eq!(error_messages(&tree), Vec::<String>::new());
    assert_eq!(stmts(&tree).len(), 14);
}

#[test]
fn every_non_root_node_has_a_parent() {
    let tree = parse("local t = { f = function(a) return a .. 'x' end }\nprint(t.f(1))");
    for id in tree.preorder().skip(1) {
        assert!(tree.parent(id).is_some(), "{:?} has no parent", tree.kind(id));
    }
}

#[test]
fn method_call_shape() {
    let tree = parse("a.b:c(1, 2)");
    let stat = stmts(&tree)[0];
    let NodeKind::ExprStat { expr } = tree.kind(stat) else {
        panic!("expected expression statement");
    };
    let NodeKind::Call(call) = tree.kind(*expr) else {
        panic!("expected call");
    };
    assert!(call.is_colon);
    assert_eq!(call.args.len(), 2);
    assert!(matches!(tree.kind(call.callee), NodeKind::Field { name, .. } if name == "c"));
}

#[test]
fn precedence_and_associativity() {
    let tree = parse("x = 1 + 2 * 3 .. a .. b");
    let stat = stmts(&tree)[0];
    let NodeKind::Assign(assign) = tree.kind(stat) else {
        panic!("expected assignment");
    };
    // `..` is lowest here and right associative: (1 + 2 * 3) .. (a .. b)
    let NodeKind::Binary { op, lhs, rhs } = tree.kind(assign.values[0]) else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Concat);
    assert!(matches!(
        tree.kind(*lhs),
        NodeKind::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
    assert!(matches!(
        tree.kind(*rhs),
        NodeKind::Binary {
            op: BinaryOp::Concat,
            ..
        }
    ));
}

#[test]
fn table_fields() {
    let tree = parse("t = { 1, x = 2, [k] = 3 }");
    let NodeKind::Assign(assign) = tree.kind(stmts(&tree)[0]) else {
        panic!("expected assignment");
    };
    let NodeKind::Table { fields } = tree.kind(assign.values[0]) else {
        panic!("expected table");
    };
    assert!(matches!(fields[0], TableField::Positional(_)));
    assert!(matches!(&fields[1], TableField::Named { name, .. } if name == "x"));
    assert!(matches!(fields[2], TableField::Keyed { .. }));
}

#[test]
fn string_values_are_unquoted() {
    let tree = parse(r#"f("a\"b", [==[x]==])"#);
    let strings: Vec<String> = tree
        .preorder()
        .filter_map(|id| match tree.kind(id) {
            NodeKind::Str(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(strings, vec!["a\"b".to_owned(), "x".to_owned()]);
}

#[test]
fn bare_expression_is_a_statement_node() {
    let tree = parse("a.b\nprint(1)");
    let all = stmts(&tree);
    assert_eq!(all.len(), 2);
    assert!(matches!(tree.kind(all[0]), NodeKind::ExprStat { .. }));
    assert!(error_messages(&tree).is_empty());
}

#[test]
fn missing_end_is_reported_and_parsing_continues() {
    let tree = parse("function f()\n  return 1\n");
    let errors = error_messages(&tree);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("`end`"), "{errors:?}");
}

#[test]
fn broken_statement_recovers_on_next_line() {
    let tree = parse("local = 3\nprint(1)\n+ 2\nprint(2)");
    let calls = tree
        .preorder()
        .filter(|&id| tree.kind(id).is_call())
        .count();
    assert_eq!(calls, 2);
    assert!(!error_messages(&tree).is_empty());
}

#[test]
fn stray_end_at_top_level() {
    let tree = parse("end\nprint(1)");
    assert_eq!(error_messages(&tree), vec!["unexpected `end`".to_owned()]);
    assert_eq!(tree.preorder().filter(|&id| tree.kind(id).is_call()).count(), 1);
}

#[test]
fn doc_attaches_to_following_declaration() {
    let source = "---@class Point\n---@field x number\nlocal Point = {}\n";
    let tree = parse(source);
    let all = stmts(&tree);
    assert_eq!(all.len(), 2);
    assert!(matches!(tree.kind(all[0]), NodeKind::DocComment(_)));
    assert_eq!(tree.kind(all[1]).doc(), Some(all[0]));
    let NodeKind::DocComment(doc) = tree.kind(all[0]) else {
        unreachable!()
    };
    assert!(matches!(
        doc.tags().next(),
        Some(DocTagKind::Class { name, super_name: None }) if name == "Point"
    ));
}

#[test]
fn doc_separated_by_blank_line_stays_detached() {
    let tree = parse("---@type number\n\nlocal x = 1\n---@alias Id integer");
    let all = stmts(&tree);
    assert_eq!(all.len(), 3);
    assert_eq!(tree.kind(all[1]).doc(), None);
    assert!(matches!(tree.kind(all[2]), NodeKind::DocComment(_)));
}

#[test]
fn doc_errors_are_inside_doc() {
    let tree = parse("---@param x\nfunction f(x) end");
    let errors: Vec<NodeId> = tree.errors().collect();
    assert_eq!(errors.len(), 1);
    assert!(tree.is_inside_doc(errors[0]));
}

#[test]
fn docs_inside_function_bodies() {
    let tree = parse("function f()\n  ---@type string\n  local s = g()\nend");
    let local = tree
        .preorder()
        .find(|&id| matches!(tree.kind(id), NodeKind::Local(_)));
    let doc = local.and_then(|id| tree.kind(id).doc());
    assert!(doc.is_some());
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
    let tree = parse(&source);
    assert!(error_messages(&tree).is_empty());
}

#[test]
fn parser_trait_object() {
    let parser: &dyn SourceParser = &LuaParser;
    let tree = parser.parse("print(1)");
    assert_eq!(stmts(&tree).len(), 1);
}
