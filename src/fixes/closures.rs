//! Closure-to-state conversion for `Switch`/`SwitchPartially` callbacks.
//!
//! The preferred rewrite passes the captured locals through the `state`
//! overload and makes every callback `static`. It needs to know exactly
//! which outer locals the callbacks use; when that cannot be established
//! (a capture of `this`, a method group argument, an explicit `state`
//! argument, opaque syntax) the fix degrades to adding `static` to the
//! offending callback only, which may leave compile errors for the user.
//! State travels by value, so a callback that writes to a captured local
//! gets no conversion: the offending callback is made `static` only when
//! it captures nothing itself, and otherwise has no fix.

use super::{FixStrategy, TextEdit};
use crate::common::Span;
use crate::semantic::{Compilation, TypeId};
use crate::syntax::ast::*;
use crate::syntax::visit::{self, Visitor};
use crate::syntax::SourceFile;
use std::collections::BTreeSet;

const STATE: &str = "state";

/// Outcome of the conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureFix {
    pub strategy: FixStrategy,
    pub edits: Vec<TextEdit>,
}

/// Converts the dispatch call that passes the lambda at `lambda_span`.
pub fn closure_to_state(
    compilation: &Compilation,
    owner: TypeId,
    file: &SourceFile,
    decl: &TypeDecl,
    lambda_span: Span,
) -> Option<ClosureFix> {
    let (member, call) = find_call(decl, lambda_span)?;
    let ExprKind::Invocation { args, .. } = &call.kind else {
        return None;
    };
    let target = args.iter().find_map(|a| match &a.expr.unparenthesized().kind {
        ExprKind::Lambda(l) if l.span == lambda_span => Some(l.as_ref()),
        _ => None,
    })?;

    let static_only = ClosureFix {
        strategy: FixStrategy::StaticOnly,
        edits: vec![TextEdit::insert(target.span.start, "static ")],
    };
    match try_get_captured_variables(compilation, owner, member, call, args) {
        Some(captures) if captures.written => {
            let captures_itself = captures.references.iter().any(|r| target.span.contains(r.span));
            (!captures_itself).then_some(static_only)
        }
        Some(captures) if !captures.names.is_empty() => Some(ClosureFix {
            strategy: FixStrategy::ClosureToState,
            edits: state_edits(file, args, &captures),
        }),
        _ => Some(static_only),
    }
}

/// Outer locals used by the callbacks of one call.
#[derive(Debug)]
struct Captures<'a> {
    /// In order of first use.
    names: Vec<String>,
    /// Every reference to a captured name, per callback.
    references: Vec<&'a Ident>,
    /// Some callback assigns, increments or passes by `ref`/`out` a
    /// captured local.
    written: bool,
    state_name: String,
}

/// Finds the captured locals of every callback of the call, or `None`
/// when the callbacks use something that cannot become state.
fn try_get_captured_variables<'a>(
    compilation: &Compilation,
    owner: TypeId,
    member: &'a Member,
    call: &'a Expr,
    args: &'a [Argument],
) -> Option<Captures<'a>> {
    let mut lambdas = Vec::new();
    for arg in args {
        if arg.name.as_ref().is_some_and(|n| n.text == STATE) {
            return None;
        }
        match &arg.expr.unparenthesized().kind {
            ExprKind::Lambda(l) if l.params.iter().all(|p| p.ty.is_none()) => lambdas.push(l.as_ref()),
            // method groups, typed parameters and anything else
            _ => return None,
        }
    }

    let mut declarations = Declarations::default();
    declarations.visit_member(member);
    if matches!(member, Member::Property(_) | Member::Other(_)) {
        declarations.names.push(("value".to_string(), member.span()));
    }
    let outer: BTreeSet<&str> = declarations
        .names
        .iter()
        .filter(|(_, span)| span.start < call.span.start)
        .filter(|(_, span)| {
            !declarations
                .lambdas
                .iter()
                .any(|l| l.contains(*span) && !l.contains(call.span))
        })
        .map(|(name, _)| name.as_str())
        .collect();

    let mut names: Vec<String> = Vec::new();
    let mut references = Vec::new();
    let mut written = false;
    let mut used = BTreeSet::new();
    for lambda in lambdas.iter().copied() {
        let inner: BTreeSet<&str> = declarations
            .names
            .iter()
            .filter(|(_, span)| lambda.span.contains(*span))
            .map(|(name, _)| name.as_str())
            .collect();
        let mut refs = References::default();
        refs.visit_lambda(lambda);
        if refs.opaque || refs.this {
            return None;
        }
        written |= refs
            .written
            .iter()
            .any(|w| outer.contains(w.text.as_str()) && !inner.contains(w.text.as_str()));
        for ident in refs.names {
            let text = ident.text.as_str();
            used.insert(text.to_string());
            if inner.contains(text) {
                if outer.contains(text) {
                    // shadowed capture
                    return None;
                }
                continue;
            }
            if outer.contains(text) {
                if !names.iter().any(|n| n == text) {
                    names.push(text.to_string());
                }
                references.push(ident);
            } else if declarations.local_functions.contains(text) || is_instance_member(compilation, owner, text) {
                return None;
            }
        }
    }

    let taken: BTreeSet<&str> = declarations
        .names
        .iter()
        .map(|(n, _)| n.as_str())
        .chain(declarations.local_functions.iter().map(String::as_str))
        .chain(used.iter().map(String::as_str))
        .collect();
    let state_name = std::iter::once(STATE.to_string())
        .chain((1..).map(|i| format!("{STATE}{i}")))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| STATE.to_string());

    Some(Captures {
        names,
        references,
        written,
        state_name,
    })
}

/// Implicit `this`: an instance field, property or method of the type, or a
/// primary constructor parameter.
fn is_instance_member(compilation: &Compilation, owner: TypeId, name: &str) -> bool {
    compilation.parts(owner).into_iter().any(|part| {
        let primary = compilation.symbols().decl(part).primary_ctor.as_ref();
        primary.is_some_and(|list| list.params.iter().any(|p| p.name.text == name))
            || compilation.find_member(part, name).is_some_and(|m| !m.is_static)
            || compilation
                .find_methods(part, name)
                .iter()
                .any(|(_, m)| !m.has_modifier(ModifierKind::Static))
    })
}

fn state_edits(file: &SourceFile, args: &[Argument], captures: &Captures<'_>) -> Vec<TextEdit> {
    let state = &captures.state_name;
    let mut edits = Vec::new();

    let value = match captures.names.as_slice() {
        [single] => single.clone(),
        many => format!("({})", many.join(", ")),
    };
    if let Some(first) = args.first() {
        let inserted = if first.name.is_some() {
            format!("{STATE}: {value}, ")
        } else {
            format!("{value}, ")
        };
        edits.push(TextEdit::insert(first.span.start, inserted));
    }

    for arg in args {
        let ExprKind::Lambda(lambda) = &arg.expr.unparenthesized().kind else {
            continue;
        };
        let mut modifiers = vec!["static"];
        modifiers.extend(
            lambda
                .modifiers
                .iter()
                .filter(|m| m.kind != ModifierKind::Static)
                .map(|m| m.kind.as_str()),
        );
        let params = if lambda.params.is_empty() {
            state.clone()
        } else {
            let rest: Vec<&str> = lambda.params.iter().map(|p| file.span_text(p.name.span)).collect();
            format!("({state}, {})", rest.join(", "))
        };
        edits.push(TextEdit::replace(
            Span::new(lambda.span.start, lambda.params_span.end),
            format!("{} {params}", modifiers.join(" ")),
        ));
    }

    let single = captures.names.len() == 1;
    for ident in &captures.references {
        let replacement = if single {
            state.clone()
        } else {
            format!("{state}.{}", ident.text)
        };
        edits.push(TextEdit::replace(ident.span, replacement));
    }
    edits
}

/// The member and invocation passing the lambda at `lambda_span`.
fn find_call(decl: &TypeDecl, lambda_span: Span) -> Option<(&Member, &Expr)> {
    let mut finder = CallFinder {
        target: lambda_span,
        member: None,
        found: None,
    };
    for member in &decl.members {
        finder.visit_member(member);
    }
    finder.found
}

struct CallFinder<'ast> {
    target: Span,
    member: Option<&'ast Member>,
    found: Option<(&'ast Member, &'ast Expr)>,
}

impl<'ast> Visitor<'ast> for CallFinder<'ast> {
    fn visit_member(&mut self, member: &'ast Member) {
        if matches!(member, Member::Type(_)) || self.found.is_some() {
            return;
        }
        let previous = self.member.replace(member);
        visit::walk_member(self, member);
        self.member = previous;
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.found.is_some() {
            return;
        }
        if let ExprKind::Invocation { args, .. } = &expr.kind {
            let passes_target = args.iter().any(|a| {
                matches!(&a.expr.unparenthesized().kind, ExprKind::Lambda(l) if l.span == self.target)
            });
            if passes_target {
                self.found = self.member.map(|m| (m, expr));
                return;
            }
        }
        visit::walk_expr(self, expr);
    }
}

/// Names declared anywhere in a member, with where they are declared.
#[derive(Default)]
struct Declarations {
    names: Vec<(String, Span)>,
    local_functions: BTreeSet<String>,
    lambdas: Vec<Span>,
}

impl Declarations {
    fn declare(&mut self, ident: &Ident) {
        self.names.push((ident.text.clone(), ident.span));
    }
}

impl<'ast> Visitor<'ast> for Declarations {
    fn visit_parameter(&mut self, param: &'ast Parameter) {
        self.declare(&param.name);
        visit::walk_parameter(self, param);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match &stmt.kind {
            StmtKind::LocalDecl { declarators, .. } => {
                for d in declarators {
                    self.declare(&d.name);
                }
            }
            StmtKind::ForEach { name, .. } => self.declare(name),
            StmtKind::LocalFunction(method) => {
                self.local_functions.insert(method.name.text.clone());
            }
            StmtKind::Try { catches, .. } => {
                for name in catches.iter().filter_map(|c| c.name.as_ref()) {
                    self.declare(name);
                }
            }
            _ => {}
        }
        visit::walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            ExprKind::Declaration { name, .. } => self.declare(name),
            ExprKind::Is { pattern, .. } => {
                if let Pattern::Type {
                    designation: Some(name),
                    ..
                } = pattern.as_ref()
                {
                    self.declare(name);
                }
            }
            _ => {}
        }
        visit::walk_expr(self, expr);
    }

    fn visit_lambda(&mut self, lambda: &'ast Lambda) {
        self.lambdas.push(lambda.span);
        for p in &lambda.params {
            self.declare(&p.name);
        }
        visit::walk_lambda(self, lambda);
    }
}

/// Simple names a lambda refers to.
#[derive(Default)]
struct References<'ast> {
    names: Vec<&'ast Ident>,
    /// Names the lambda writes to.
    written: Vec<&'ast Ident>,
    this: bool,
    opaque: bool,
}

impl<'ast> References<'ast> {
    fn write(&mut self, target: &'ast Expr) {
        match &target.unparenthesized().kind {
            ExprKind::Name { name, .. } => self.written.push(name),
            // `(a, b) = ...`
            ExprKind::Tuple(items) => {
                for item in items {
                    self.write(&item.expr);
                }
            }
            _ => {}
        }
    }

    fn write_by_reference(&mut self, args: &'ast [Argument]) {
        for arg in args {
            if matches!(arg.ref_kind, RefKind::Ref | RefKind::Out) {
                self.write(&arg.expr);
            }
        }
    }
}

impl<'ast> Visitor<'ast> for References<'ast> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            ExprKind::Name { name, .. } => self.names.push(name),
            ExprKind::This | ExprKind::Base => self.this = true,
            ExprKind::Opaque => self.opaque = true,
            ExprKind::Assignment { target, .. } => self.write(target),
            ExprKind::Unary { op, operand } | ExprKind::Postfix { op, operand } if op == "++" || op == "--" => {
                self.write(operand)
            }
            ExprKind::Invocation { args, .. } => self.write_by_reference(args),
            ExprKind::ObjectCreation { args: Some(args), .. } => self.write_by_reference(args),
            _ => {}
        }
        visit::walk_expr(self, expr);
    }
}
