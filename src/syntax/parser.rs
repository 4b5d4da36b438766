//! Tree-sitter parser integration for C#.
//!
//! Parsing never fails: the concrete tree is lowered into the declaration
//! model in [`super::ast`] and any `ERROR`/`MISSING` nodes are reported as
//! [`ParseError`]s next to it.

use super::ast::{CompilationUnit, Expr};
use super::lower::Lowerer;
use crate::common::Span;
use serde::Serialize;
use tree_sitter::{Language, Node, Parser, Tree};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

/// Line directives kept by the tree as extras.
const LINE_DIRECTIVES: &[&str] = &[
    "preproc_nullable",
    "preproc_pragma",
    "preproc_region",
    "preproc_endregion",
    "preproc_define",
    "preproc_undef",
    "preproc_line",
    "preproc_error",
    "preproc_warning",
];

/// Longest source excerpt quoted in an error message.
const EXCERPT_LIMIT: usize = 24;

/// Result of parsing one file.
pub struct Parsed {
    pub unit: CompilationUnit,
    pub errors: Vec<ParseError>,
    pub directives: Vec<Span>,
}

fn language() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Parse C# source code into a tree-sitter tree.
pub fn parse_tree(source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(&language()).map_err(|e| ParseError {
        message: format!("failed to load the C# grammar: {e}"),
        span: Span::empty(0),
    })?;
    parser.parse(source, None).ok_or_else(|| ParseError {
        message: "failed to parse source code".to_string(),
        span: Span::empty(0),
    })
}

pub fn parse_compilation_unit(source: &str) -> Parsed {
    let tree = match parse_tree(source) {
        Ok(tree) => tree,
        Err(error) => {
            return Parsed {
                unit: CompilationUnit::default(),
                errors: vec![error],
                directives: Vec::new(),
            }
        }
    };
    let root = tree.root_node();
    let mut errors = Vec::new();
    let mut directives = Vec::new();
    scan(root, source, &mut errors, &mut directives);
    directives.sort();
    let unit = Lowerer::new(source, 0).compilation_unit(root);
    Parsed {
        unit,
        errors,
        directives,
    }
}

/// Parses a standalone expression. Spans are relative to `source`.
pub fn parse_expression(source: &str) -> (Expr, Vec<ParseError>) {
    const PREFIX: &str = "class __Expr { object __value = ";
    let wrapped = format!("{PREFIX}{source}; }}");
    let opaque = Expr::opaque(Span::new(0, source.len()));
    let tree = match parse_tree(&wrapped) {
        Ok(tree) => tree,
        Err(error) => return (opaque, vec![error]),
    };
    let mut errors = Vec::new();
    let mut directives = Vec::new();
    scan(tree.root_node(), &wrapped, &mut errors, &mut directives);
    for error in &mut errors {
        error.span = Span::new(
            error.span.start.saturating_sub(PREFIX.len()),
            error.span.end.saturating_sub(PREFIX.len()),
        );
    }
    let expr = find_kind(tree.root_node(), "variable_declarator")
        .and_then(|declarator| Lowerer::new(&wrapped, PREFIX.len()).initializer(declarator))
        .unwrap_or(opaque);
    (expr, errors)
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(|child| find_kind(child, kind))
}

/// Collects syntax errors and line directives in one pass.
fn scan(node: Node, source: &str, errors: &mut Vec<ParseError>, directives: &mut Vec<Span>) {
    let span = Span::new(node.start_byte(), node.end_byte());
    if node.is_missing() {
        errors.push(ParseError {
            message: format!("expected `{}`", node.kind()),
            span,
        });
        return;
    }
    if node.is_error() {
        let text = node_text(&node, source).trim();
        let excerpt: String = text.chars().take(EXCERPT_LIMIT).collect();
        errors.push(ParseError {
            message: format!("unexpected `{excerpt}`"),
            span,
        });
    }
    if LINE_DIRECTIVES.contains(&node.kind()) {
        directives.push(span);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        scan(child, source, errors, directives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::*;

    fn parse(src: &str) -> (CompilationUnit, Vec<ParseError>) {
        let parsed = parse_compilation_unit(src);
        (parsed.unit, parsed.errors)
    }

    fn parse_expr(src: &str) -> Expr {
        let (expr, errors) = parse_expression(src);
        assert!(errors.is_empty(), "{errors:?}");
        expr
    }

    #[test]
    fn grammar_loads() {
        let tree = parse_tree("class A { }").unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn parses_smart_enum_declaration() {
        let src = r#"
namespace Demo.Enums;

[SmartEnum<string>(IsValidatable = true)]
public sealed partial class TestEnum
{
    public static readonly TestEnum Item1 = new("Item1");
    public string Name { get; private set; }

    private TestEnum(string key) : base() { }

    private static TestEnum CreateInvalidItem(string key) => new(key);
}
"#;
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let decl = &unit.types[0];
        assert_eq!(decl.namespace, "Demo.Enums");
        assert_eq!(decl.name.text, "TestEnum");
        assert!(decl.has_modifier(ModifierKind::Partial));
        let attr = decl.attributes().next();
        assert_eq!(attr.map(|a| a.simple_name()), Some("SmartEnum"));
        assert_eq!(attr.map(|a| a.type_args.len()), Some(1));
        assert_eq!(
            attr.and_then(|a| a.named_arg("IsValidatable")).map(|a| a.span.text(src)),
            Some("IsValidatable = true")
        );
        assert_eq!(decl.fields().count(), 1);
        assert_eq!(decl.properties().count(), 1);
        assert_eq!(decl.constructors().count(), 1);
        assert_eq!(decl.methods().count(), 1);
        let setter = decl
            .properties()
            .next()
            .and_then(|p| p.accessor(AccessorKind::Set))
            .map(|a| a.modifiers.iter().map(|m| m.kind).collect::<Vec<_>>());
        assert_eq!(setter, Some(vec![ModifierKind::Private]));
        assert_eq!(decl.span.text(src).lines().next(), Some("[SmartEnum<string>(IsValidatable = true)]"));
        assert_eq!(&src[decl.header_start()..decl.header_start() + 6], "public");
    }

    #[test]
    fn parses_nested_generic_base_list_and_record_struct() {
        let src = "namespace N { public readonly partial record struct R(int A) : IEquatable<List<int>>; }";
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let decl = &unit.types[0];
        assert_eq!(decl.kind, TypeDeclKind::RecordStruct);
        assert_eq!(decl.keyword_span.text(src), "record struct");
        assert!(decl.primary_ctor.is_some());
        assert_eq!(decl.base_list.len(), 1);
        assert_eq!(decl.namespace, "N");
    }

    #[test]
    fn block_namespaces_nest_and_unwind() {
        let src = "namespace A { namespace B.C { class X { } } class Y { } } class Z { }";
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let names: Vec<(&str, &str)> = unit
            .types
            .iter()
            .map(|t| (t.namespace.as_str(), t.name.text.as_str()))
            .collect();
        assert_eq!(names, vec![("A.B.C", "X"), ("A", "Y"), ("", "Z")]);
    }

    #[test]
    fn generic_name_versus_less_than() {
        let call = parse_expr("Foo<int>(x)");
        assert!(matches!(call.kind, ExprKind::Invocation { .. }));
        let cmp = parse_expr("a < b && c > d");
        assert!(matches!(cmp.kind, ExprKind::Binary { ref op, .. } if op == "&&"));
    }

    #[test]
    fn lambdas_with_modifiers_and_named_arguments() {
        let src = "e.Switch(state: x, item1: static s => { _ = s; }, item2: () => 1)";
        let expr = parse_expr(src);
        let ExprKind::Invocation { args, args_span, .. } = expr.kind else {
            panic!("expected invocation");
        };
        assert_eq!(args_span.text(src).chars().next(), Some('('));
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].name.as_ref().map(|n| n.text.as_str()), Some("state"));
        let ExprKind::Lambda(lambda) = &args[1].expr.kind else {
            panic!("expected lambda");
        };
        assert!(lambda.is_static());
        assert!(!lambda.parenthesized);
        assert_eq!(lambda.params_span.text(src), "s");
        assert_eq!(lambda.arrow_span.text(src), "=>");
        let ExprKind::Lambda(empty) = &args[2].expr.kind else {
            panic!("expected lambda");
        };
        assert!(empty.parenthesized);
        assert_eq!(empty.params_span.text(src), "()");
    }

    #[test]
    fn casts_and_parenthesized() {
        assert!(matches!(parse_expr("(int)x").kind, ExprKind::Cast { .. }));
        assert!(matches!(parse_expr("(a) + b").kind, ExprKind::Binary { .. }));
        assert!(matches!(parse_expr("(a, b: 2)").kind, ExprKind::Tuple(_)));
        assert!(matches!(parse_expr("nameof(Item1)").kind, ExprKind::NameOf(_)));
    }

    #[test]
    fn default_and_is_patterns() {
        let expr = parse_expr("default(T) == default");
        let ExprKind::Binary { lhs, rhs, .. } = expr.kind else {
            panic!("expected binary");
        };
        assert!(lhs.is_default_literal());
        assert!(rhs.is_default_literal());
        assert!(matches!(parse_expr("o is string s && s.Length > 0").kind, ExprKind::Binary { .. }));
        let ExprKind::Is { pattern, .. } = parse_expr("o is TestEnum e").kind else {
            panic!("expected is");
        };
        assert!(matches!(*pattern, Pattern::Type { designation: Some(_), .. }));
    }

    #[test]
    fn recovers_from_garbage_members() {
        let (unit, errors) = parse("class A { int x = ; public void M() { } }");
        assert!(!errors.is_empty());
        assert_eq!(unit.types[0].methods().count(), 1);
    }

    #[test]
    fn method_body_statements() {
        let src = r#"
class C {
    void M(TestEnum testEnum) {
        var x = 42;
        foreach (var item in items) { if (item is null) continue; }
        using var s = Open();
        try { M(out var y); } catch (Exception ex) when (ex != null) { throw; }
        switch (x) { case 1: break; default: return; }
        int Local(int a) => a + x;
        testEnum.Switch(item1: () => { _ = x; }, item2: () => {});
    }
}"#;
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let body = unit.types[0].methods().next().and_then(|m| m.body.as_ref());
        let Some(Body::Block(block)) = body else {
            panic!("expected block body");
        };
        assert!(matches!(block.stmts[0].kind, StmtKind::LocalDecl { .. }));
        assert!(matches!(block.stmts[1].kind, StmtKind::ForEach { .. }));
        assert!(matches!(block.stmts[2].kind, StmtKind::Using { body: None, .. }));
        assert!(matches!(block.stmts[3].kind, StmtKind::Try { .. }));
        assert!(matches!(block.stmts[4].kind, StmtKind::Switch { .. }));
        assert!(matches!(block.stmts[5].kind, StmtKind::LocalFunction(_)));
        assert!(matches!(block.stmts[6].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn out_arguments_declare_variables() {
        let expr = parse_expr("TestEnum.TryGet(key, out var item)");
        let ExprKind::Invocation { args, .. } = expr.kind else {
            panic!("expected invocation");
        };
        assert_eq!(args[1].ref_kind, RefKind::Out);
        assert!(matches!(args[1].expr.kind, ExprKind::Declaration { ref name, .. } if name.text == "item"));
    }

    #[test]
    fn property_shapes() {
        let src = "class P { public int A { get; init; } = 1; public int B => 2; int I.C { get => 3; } }";
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let props: Vec<&PropertyDecl> = unit.types[0].properties().collect();
        assert_eq!(props.len(), 3);
        assert!(props[0].accessor(AccessorKind::Init).is_some());
        assert!(props[0].initializer.is_some());
        assert!(props[1].expression_body.is_some());
        assert!(props[2].explicit_interface.is_some());
        assert!(matches!(
            props[2].accessor(AccessorKind::Get).map(|a| &a.body),
            Some(AccessorBody::Expression(_))
        ));
    }

    #[test]
    fn directives_are_collected_in_order() {
        let src = "#nullable enable\nclass A {\n#pragma warning disable TTRESG001\n int x;\n}\n";
        let parsed = parse_compilation_unit(src);
        let texts: Vec<&str> = parsed.directives.iter().map(|s| s.text(src).trim()).collect();
        assert_eq!(texts, vec!["#nullable enable", "#pragma warning disable TTRESG001"]);
    }
}
