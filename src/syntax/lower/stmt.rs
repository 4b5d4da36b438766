//! Statements and blocks.

use super::{first_of_kind, named, named_after, token, Lowerer, PREPROC_BRANCHES};
use crate::common::Span;
use crate::syntax::ast::*;
use tree_sitter::Node;

impl<'a> Lowerer<'a> {
    pub(super) fn block(&self, node: Node) -> Block {
        Block {
            stmts: self.stmts(named(node)),
            span: self.span(node),
        }
    }

    fn stmts(&self, nodes: Vec<Node>) -> Vec<Stmt> {
        nodes
            .into_iter()
            .filter(|n| !n.is_error())
            .map(|n| self.stmt(n))
            .collect()
    }

    fn boxed_stmt(&self, node: Node, field: &str) -> Box<Stmt> {
        Box::new(match node.child_by_field_name(field) {
            Some(stmt) => self.stmt(stmt),
            None => Stmt {
                kind: StmtKind::Empty,
                span: Span::empty(self.span(node).end),
            },
        })
    }

    fn field_expr(&self, node: Node, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(expr) => self.expr(expr),
            None => Expr::opaque(Span::empty(self.span(node).end)),
        }
    }

    /// The single expression child of `return`, `throw` and friends.
    fn optional_expr(&self, node: Node) -> Option<Expr> {
        named(node).into_iter().next().map(|e| self.expr(e))
    }

    pub(super) fn stmt(&self, node: Node) -> Stmt {
        let kind = match node.kind() {
            "block" => StmtKind::Block(self.block(node)),
            "local_declaration_statement" => self.local_declaration(node),
            "local_function_statement" => StmtKind::LocalFunction(Box::new(self.local_function(node))),
            "expression_statement" => match named(node).into_iter().next() {
                Some(expr) => StmtKind::Expr(self.expr(expr)),
                None => StmtKind::Empty,
            },
            "return_statement" => StmtKind::Return(self.optional_expr(node)),
            "throw_statement" => StmtKind::Throw(self.optional_expr(node)),
            "yield_statement" => StmtKind::Yield(self.optional_expr(node)),
            "if_statement" => StmtKind::If {
                cond: self.field_expr(node, "condition"),
                then: self.boxed_stmt(node, "consequence"),
                otherwise: node.child_by_field_name("alternative").map(|s| Box::new(self.stmt(s))),
            },
            "while_statement" => StmtKind::While {
                cond: self.field_expr(node, "condition"),
                body: self.boxed_stmt(node, "body"),
            },
            "do_statement" => StmtKind::DoWhile {
                body: self.boxed_stmt(node, "body"),
                cond: self.field_expr(node, "condition"),
            },
            "for_statement" => self.for_stmt(node),
            "foreach_statement" => self.foreach_stmt(node),
            "using_statement" => {
                let resource = named(node)
                    .into_iter()
                    .find(|c| Some(*c) != node.child_by_field_name("body"))
                    .map(|r| Box::new(self.resource(r)));
                StmtKind::Using {
                    resource,
                    body: Some(self.boxed_stmt(node, "body")),
                }
            }
            "lock_statement" => {
                let parts = named(node);
                match parts.as_slice() {
                    [expr, body] => StmtKind::Lock {
                        expr: self.expr(*expr),
                        body: Box::new(self.stmt(*body)),
                    },
                    _ => StmtKind::Unknown,
                }
            }
            "try_statement" => self.try_stmt(node),
            "switch_statement" => self.switch_stmt(node),
            "break_statement" => StmtKind::Break,
            "continue_statement" => StmtKind::Continue,
            "empty_statement" => StmtKind::Empty,
            "checked_statement" | "unsafe_statement" => match first_of_kind(node, "block") {
                Some(block) => StmtKind::Block(self.block(block)),
                None => StmtKind::Unknown,
            },
            // the statement a label or `fixed` guards
            "labeled_statement" | "fixed_statement" => match named(node).into_iter().last() {
                Some(inner) if inner.kind() != "identifier" => return self.stmt(inner),
                _ => StmtKind::Unknown,
            },
            kind if PREPROC_BRANCHES.contains(&kind) => StmtKind::Block(Block {
                stmts: self.stmts(
                    named(node)
                        .into_iter()
                        .filter(|c| Some(*c) != node.child_by_field_name("condition"))
                        .collect(),
                ),
                span: self.span(node),
            }),
            _ => StmtKind::Unknown,
        };
        Stmt {
            kind,
            span: self.span(node),
        }
    }

    fn local_declaration(&self, node: Node) -> StmtKind {
        let Some(decl) = first_of_kind(node, "variable_declaration") else {
            return StmtKind::Unknown;
        };
        let (ty, declarators) = self.variable_declaration(decl);
        let is_const = self
            .modifiers(node)
            .iter()
            .any(|m| m.kind == ModifierKind::Const);
        let local = StmtKind::LocalDecl {
            ty,
            declarators,
            is_const,
        };
        if token(node, "using").is_none() {
            return local;
        }
        // `using var x = ...;`
        StmtKind::Using {
            resource: Some(Box::new(Stmt {
                kind: local,
                span: self.span(decl),
            })),
            body: None,
        }
    }

    /// Declaration or expression inside `using (...)`.
    fn resource(&self, node: Node) -> Stmt {
        let kind = if node.kind() == "variable_declaration" {
            let (ty, declarators) = self.variable_declaration(node);
            StmtKind::LocalDecl {
                ty,
                declarators,
                is_const: false,
            }
        } else {
            StmtKind::Expr(self.expr(node))
        };
        Stmt {
            kind,
            span: self.span(node),
        }
    }

    fn for_stmt(&self, node: Node) -> StmtKind {
        let mut cursor = node.walk();
        let init = node
            .children_by_field_name("initializer", &mut cursor)
            .filter(|c| c.is_named())
            .map(|c| self.resource(c))
            .collect();
        let mut cursor = node.walk();
        let step = node
            .children_by_field_name("update", &mut cursor)
            .filter(|c| c.is_named())
            .map(|c| self.expr(c))
            .collect();
        StmtKind::For {
            init,
            cond: node.child_by_field_name("condition").map(|c| self.expr(c)),
            step,
            body: self.boxed_stmt(node, "body"),
        }
    }

    fn foreach_stmt(&self, node: Node) -> StmtKind {
        let left = node.child_by_field_name("left");
        let (ty, name) = match (node.child_by_field_name("type"), left) {
            (Some(ty), Some(name)) if name.kind() == "identifier" => (self.type_ref(ty), self.ident(name)),
            // deconstruction: `var (a, b) in ...`
            _ => {
                let at = left.unwrap_or(node);
                (
                    self.missing_type(at),
                    Ident {
                        text: String::new(),
                        span: Span::empty(self.span(at).start),
                    },
                )
            }
        };
        StmtKind::ForEach {
            ty,
            name,
            expr: self.field_expr(node, "right"),
            body: self.boxed_stmt(node, "body"),
        }
    }

    fn try_stmt(&self, node: Node) -> StmtKind {
        let block = match node.child_by_field_name("body") {
            Some(b) => self.block(b),
            None => Block {
                stmts: Vec::new(),
                span: Span::empty(self.span(node).end),
            },
        };
        let catches = named(node)
            .into_iter()
            .filter(|c| c.kind() == "catch_clause")
            .filter_map(|clause| {
                let declaration = first_of_kind(clause, "catch_declaration");
                Some(CatchClause {
                    ty: declaration
                        .and_then(|d| d.child_by_field_name("type"))
                        .map(|t| self.type_ref(t)),
                    name: declaration
                        .and_then(|d| d.child_by_field_name("name"))
                        .map(|n| self.ident(n)),
                    filter: first_of_kind(clause, "catch_filter_clause")
                        .and_then(|f| named(f).into_iter().next())
                        .map(|e| self.expr(e)),
                    block: self.block(clause.child_by_field_name("body")?),
                })
            })
            .collect();
        let finally = first_of_kind(node, "finally_clause")
            .and_then(|f| first_of_kind(f, "block"))
            .map(|b| self.block(b));
        StmtKind::Try {
            block,
            catches,
            finally,
        }
    }

    fn switch_stmt(&self, node: Node) -> StmtKind {
        let sections = node
            .child_by_field_name("body")
            .map(|body| {
                named(body)
                    .into_iter()
                    .filter(|s| s.kind() == "switch_section")
                    .map(|section| {
                        // patterns and `when` clauses are kept opaque
                        let colon_end = token(section, ":")
                            .map_or(self.span(section).end, |c| self.span(c).end);
                        let label = Expr::opaque(Span::new(self.span(section).start, colon_end));
                        let mut stmts = Vec::new();
                        let mut next = named_after(section, ":");
                        while let Some(stmt) = next {
                            if !stmt.is_extra() && !stmt.is_error() {
                                stmts.push(self.stmt(stmt));
                            }
                            next = stmt.next_named_sibling();
                        }
                        SwitchSection {
                            labels: vec![label],
                            stmts,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        StmtKind::Switch {
            expr: self.field_expr(node, "value"),
            sections,
        }
    }
}
