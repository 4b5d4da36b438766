//! Best-effort expression typing for usage rules.
//!
//! Handles locals, parameters, members of the enclosing type chain, static
//! member access, object creation, casts and the members the code generator
//! adds to pattern types (`Get`, `TryGet`, `Create`, ...). Anything else is
//! `ResolvedType::Unknown`.

use super::{Builtin, Compilation, ResolvedType, Scope, TypeId};
use crate::syntax::ast::*;

/// Generated static factories returning the pattern type itself.
const GENERATED_FACTORIES: &[&str] = &["Get", "Create", "Parse", "op_Implicit"];
/// Generated `Try*` members returning `bool`.
const GENERATED_TRY_METHODS: &[&str] = &["TryGet", "TryCreate", "TryParse", "TryGetValue"];

/// Lexically scoped local variables and parameters.
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    frames: Vec<Vec<(String, ResolvedType)>>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self {
            frames: vec![Vec::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn declare(&mut self, name: impl Into<String>, ty: ResolvedType) {
        if self.frames.is_empty() {
            self.frames.push(Vec::new());
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push((name.into(), ty));
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ResolvedType> {
        self.frames
            .iter()
            .rev()
            .flat_map(|f| f.iter().rev())
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// A member found by name, with its type resolved in its declaring scope.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub owner: TypeId,
    pub ty: ResolvedType,
    pub is_static: bool,
}

impl Compilation {
    /// Whether a member declared on `owner` is visible from the current
    /// assembly. Cross-assembly members need `public` or `protected`.
    pub fn member_visible(&self, owner: TypeId, modifiers: &[Modifier]) -> bool {
        self.is_current(owner)
            || has_modifier(modifiers, ModifierKind::Public)
            || has_modifier(modifiers, ModifierKind::Protected)
    }

    /// Field or property `name` on `id` or its base classes.
    pub fn find_member(&self, id: TypeId, name: &str) -> Option<MemberInfo> {
        for owner in std::iter::once(id).chain(self.base_chain(id)) {
            let decl = self.symbols().decl(owner);
            let scope = self.scope_of(owner);
            for member in &decl.members {
                let found = match member {
                    Member::Field(f) if f.declarators.iter().any(|d| d.name.text == name) => {
                        Some((&f.ty, &f.modifiers))
                    }
                    Member::Property(p) if p.name.text == name && p.explicit_interface.is_none() => {
                        Some((&p.ty, &p.modifiers))
                    }
                    _ => None,
                };
                if let Some((ty, modifiers)) = found {
                    if owner != id && !self.member_visible(owner, modifiers) {
                        continue;
                    }
                    return Some(MemberInfo {
                        owner,
                        ty: self.resolve(ty, &scope),
                        is_static: has_modifier(modifiers, ModifierKind::Static)
                            || has_modifier(modifiers, ModifierKind::Const),
                    });
                }
            }
        }
        None
    }

    /// Methods named `name` on `id` or its base classes.
    pub fn find_methods(&self, id: TypeId, name: &str) -> Vec<(TypeId, &MethodDecl)> {
        let mut out = Vec::new();
        for owner in std::iter::once(id).chain(self.base_chain(id)) {
            for method in self.symbols().decl(owner).methods() {
                if method.name.text == name
                    && method.explicit_interface.is_none()
                    && (owner == id || self.member_visible(owner, &method.modifiers))
                {
                    out.push((owner, method));
                }
            }
        }
        out
    }

    /// Enclosing type chain from `scope`, innermost first.
    fn scope_types(&self, scope: &Scope) -> Vec<TypeId> {
        match scope.containing {
            Some(c) => std::iter::once(c)
                .chain(self.symbols().containing_chain(c))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Interprets a name or dotted expression as a type, if it names one
    /// and is not shadowed by a local or member.
    pub fn expr_as_type(&self, expr: &Expr, scope: &Scope, locals: &LocalScope) -> Option<ResolvedType> {
        let segments = expr_name_segments(expr)?;
        let first = segments.first()?;
        if segments.len() == 1 && locals.is_declared(&first.name.text) {
            return None;
        }
        if self
            .scope_types(scope)
            .iter()
            .any(|t| self.find_member(*t, &first.name.text).is_some())
        {
            return None;
        }
        let ty = TypeRef {
            kind: TypeRefKind::Named {
                global: false,
                segments,
            },
            span: expr.span,
        };
        match self.resolve(&ty, scope) {
            r @ (ResolvedType::Declared { .. } | ResolvedType::Builtin(_)) => Some(r),
            _ => None,
        }
    }

    pub fn type_of(&self, expr: &Expr, scope: &Scope, locals: &LocalScope) -> ResolvedType {
        match &expr.kind {
            ExprKind::Literal(kind) => {
                let keyword = match kind {
                    LiteralKind::Int => "int",
                    LiteralKind::Real => "double",
                    LiteralKind::String => "string",
                    LiteralKind::Char => "char",
                    LiteralKind::True | LiteralKind::False => "bool",
                    LiteralKind::Null => return ResolvedType::Unknown,
                };
                Builtin::from_keyword(keyword)
                    .map(ResolvedType::Builtin)
                    .unwrap_or(ResolvedType::Unknown)
            }
            ExprKind::Name { name, .. } => {
                if let Some(ty) = locals.lookup(&name.text) {
                    return ty.clone();
                }
                self.scope_types(scope)
                    .into_iter()
                    .find_map(|t| self.find_member(t, &name.text))
                    .map(|m| m.ty)
                    .unwrap_or(ResolvedType::Unknown)
            }
            ExprKind::This => scope
                .containing
                .map(ResolvedType::declared)
                .unwrap_or(ResolvedType::Unknown),
            ExprKind::Base => scope
                .containing
                .and_then(|c| self.base_class(c))
                .unwrap_or(ResolvedType::Unknown),
            ExprKind::Default(Some(ty)) => self.resolve(ty, scope),
            ExprKind::ObjectCreation { ty: Some(ty), .. } => self.resolve(ty, scope),
            ExprKind::ArrayCreation { ty: Some(ty), .. } => match self.resolve(ty, scope) {
                arr @ ResolvedType::Array(..) => arr,
                element => ResolvedType::Array(Box::new(element), 1),
            },
            ExprKind::Cast { ty, .. } | ExprKind::As { ty, .. } => self.resolve(ty, scope),
            ExprKind::Parenthesized(inner) => self.type_of(inner, scope, locals),
            ExprKind::Tuple(args) => ResolvedType::Tuple(
                args.iter()
                    .map(|a| self.type_of(&a.expr, scope, locals))
                    .collect(),
            ),
            ExprKind::MemberAccess { target, name, .. } => {
                if let Some(owner) = self.expr_as_type(target, scope, locals) {
                    return owner
                        .declared_id()
                        .and_then(|id| self.find_member(id, &name.text))
                        .map(|m| m.ty)
                        .unwrap_or(ResolvedType::Unknown);
                }
                let target_ty = self.type_of(target, scope, locals);
                target_ty
                    .strip_nullable()
                    .declared_id()
                    .and_then(|id| self.find_member(id, &name.text))
                    .map(|m| m.ty)
                    .unwrap_or(ResolvedType::Unknown)
            }
            ExprKind::Invocation { callee, .. } => self.invocation_type(callee, scope, locals),
            ExprKind::Conditional {
                when_true,
                when_false,
                ..
            } => {
                let t = self.type_of(when_true, scope, locals);
                if t.is_unknown() {
                    self.type_of(when_false, scope, locals)
                } else {
                    t
                }
            }
            ExprKind::Binary { op, lhs, rhs } if op == "??" => {
                let t = self.type_of(lhs, scope, locals);
                match t {
                    ResolvedType::Unknown => self.type_of(rhs, scope, locals),
                    other => other.strip_nullable().clone(),
                }
            }
            ExprKind::Binary { op, .. } if matches!(op.as_str(), "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||") => {
                Builtin::from_keyword("bool")
                    .map(ResolvedType::Builtin)
                    .unwrap_or(ResolvedType::Unknown)
            }
            ExprKind::Is { .. } => Builtin::from_keyword("bool")
                .map(ResolvedType::Builtin)
                .unwrap_or(ResolvedType::Unknown),
            ExprKind::Assignment { target, .. } => self.type_of(target, scope, locals),
            ExprKind::Postfix { op, operand } if op == "!" => {
                self.type_of(operand, scope, locals).strip_nullable().clone()
            }
            ExprKind::TypeOf(_) => Builtin::from_name("Type")
                .map(ResolvedType::Builtin)
                .unwrap_or(ResolvedType::Unknown),
            ExprKind::NameOf(_) => Builtin::from_keyword("string")
                .map(ResolvedType::Builtin)
                .unwrap_or(ResolvedType::Unknown),
            _ => ResolvedType::Unknown,
        }
    }

    fn invocation_type(&self, callee: &Expr, scope: &Scope, locals: &LocalScope) -> ResolvedType {
        match &callee.kind {
            ExprKind::MemberAccess { target, name, .. } => {
                let (owner, is_static) = match self.expr_as_type(target, scope, locals) {
                    Some(t) => (t, true),
                    None => (self.type_of(target, scope, locals), false),
                };
                let Some(id) = owner.strip_nullable().declared_id() else {
                    return ResolvedType::Unknown;
                };
                if let Some(ret) = self.declared_return_type(id, &name.text) {
                    return ret;
                }
                if is_static && GENERATED_FACTORIES.contains(&name.text.as_str()) {
                    return ResolvedType::declared(id);
                }
                if GENERATED_TRY_METHODS.contains(&name.text.as_str()) {
                    return Builtin::from_keyword("bool")
                        .map(ResolvedType::Builtin)
                        .unwrap_or(ResolvedType::Unknown);
                }
                ResolvedType::Unknown
            }
            ExprKind::Name { name, .. } => self
                .scope_types(scope)
                .into_iter()
                .find_map(|t| self.declared_return_type(t, &name.text))
                .unwrap_or(ResolvedType::Unknown),
            _ => ResolvedType::Unknown,
        }
    }

    fn declared_return_type(&self, id: TypeId, name: &str) -> Option<ResolvedType> {
        let (owner, method) = self.find_methods(id, name).into_iter().next()?;
        let scope = self
            .scope_of(owner)
            .with_type_params(method.type_params.iter().map(|p| p.text.clone()));
        Some(self.resolve(&method.return_type, &scope))
    }

    /// Type a `TryGet(key, out var item)` style out-argument receives.
    pub fn out_argument_type(
        &self,
        callee: &Expr,
        arg_index: usize,
        scope: &Scope,
        locals: &LocalScope,
    ) -> ResolvedType {
        let ExprKind::MemberAccess { target, name, .. } = &callee.kind else {
            return ResolvedType::Unknown;
        };
        let owner = match self.expr_as_type(target, scope, locals) {
            Some(t) => t,
            None => self.type_of(target, scope, locals),
        };
        let Some(id) = owner.strip_nullable().declared_id() else {
            return ResolvedType::Unknown;
        };
        if let Some((decl_owner, method)) = self.find_methods(id, &name.text).into_iter().next() {
            let scope = self
                .scope_of(decl_owner)
                .with_type_params(method.type_params.iter().map(|p| p.text.clone()));
            return method
                .params
                .params
                .get(arg_index)
                .map(|p| self.resolve(&p.ty, &scope))
                .map(|t| t.strip_nullable().clone())
                .unwrap_or(ResolvedType::Unknown);
        }
        if GENERATED_TRY_METHODS.contains(&name.text.as_str()) {
            return ResolvedType::declared(id);
        }
        ResolvedType::Unknown
    }

    /// Parameter type targeted by an argument of an invocation, by name or
    /// position, for methods declared in source.
    pub fn argument_target_type(
        &self,
        callee: &Expr,
        arg: &Argument,
        position: usize,
        scope: &Scope,
        locals: &LocalScope,
    ) -> ResolvedType {
        let (id, name) = match &callee.kind {
            ExprKind::MemberAccess { target, name, .. } => {
                let owner = match self.expr_as_type(target, scope, locals) {
                    Some(t) => t,
                    None => self.type_of(target, scope, locals),
                };
                match owner.strip_nullable().declared_id() {
                    Some(id) => (id, name.text.as_str()),
                    None => return ResolvedType::Unknown,
                }
            }
            ExprKind::Name { name, .. } => {
                let found = self
                    .scope_types(scope)
                    .into_iter()
                    .find(|t| !self.find_methods(*t, &name.text).is_empty());
                match found {
                    Some(id) => (id, name.text.as_str()),
                    None => return ResolvedType::Unknown,
                }
            }
            _ => return ResolvedType::Unknown,
        };
        for (owner, method) in self.find_methods(id, name) {
            let param = match &arg.name {
                Some(arg_name) => method.params.params.iter().find(|p| p.name.text == arg_name.text),
                None => method.params.params.get(position),
            };
            if let Some(param) = param {
                let scope = self
                    .scope_of(owner)
                    .with_type_params(method.type_params.iter().map(|p| p.text.clone()));
                return self.resolve(&param.ty, &scope);
            }
        }
        ResolvedType::Unknown
    }
}

/// `A`, `A.B`, `A<T>.B` as name segments; `None` for other expressions.
pub fn expr_name_segments(expr: &Expr) -> Option<Vec<NameSegment>> {
    match &expr.kind {
        ExprKind::Name { name, type_args } => Some(vec![NameSegment {
            name: name.clone(),
            type_args: type_args.clone(),
            span: expr.span,
        }]),
        ExprKind::MemberAccess {
            target,
            name,
            type_args,
            conditional: false,
        } => {
            let mut segments = expr_name_segments(target)?;
            segments.push(NameSegment {
                name: name.clone(),
                type_args: type_args.clone(),
                span: name.span,
            });
            Some(segments)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::parse_expression;

    fn expr(src: &str) -> Expr {
        parse_expression(src).0
    }

    fn setup() -> (Compilation, TypeId) {
        let c = Compilation::from_sources(
            "App",
            &[(
                "a.cs",
                "public partial class TestEnum { public static readonly TestEnum Item1 = default; } \
                 class User { TestEnum field; string Name { get; } TestEnum Make() => null; }",
            )],
        );
        let user = c
            .symbols()
            .ids()
            .find(|id| c.symbols().get(*id).name == "User")
            .expect("User");
        (c, user)
    }

    #[test]
    fn types_members_and_generated_factories() {
        let (c, user) = setup();
        let scope = c.scope_of(user);
        let locals = LocalScope::new();
        let enum_id = c.symbols().ids().find(|id| c.symbols().get(*id).name == "TestEnum");
        let ty = |src: &str| c.type_of(&expr(src), &scope, &locals).declared_id();
        assert_eq!(ty("field"), enum_id);
        assert_eq!(ty("TestEnum.Item1"), enum_id);
        assert_eq!(ty("TestEnum.Get(\"x\")"), enum_id);
        assert_eq!(ty("Make()"), enum_id);
        assert_eq!(ty("(TestEnum)o"), enum_id);
        assert!(c.type_of(&expr("Name"), &scope, &locals).is_string());
    }

    #[test]
    fn locals_shadow_members() {
        let (c, user) = setup();
        let scope = c.scope_of(user);
        let mut locals = LocalScope::new();
        locals.push();
        locals.declare("field", Builtin::from_keyword("int").map(ResolvedType::Builtin).unwrap_or(ResolvedType::Unknown));
        assert_eq!(
            c.type_of(&expr("field"), &scope, &locals).is_value_type(c.symbols()),
            Some(true)
        );
        locals.pop();
        assert!(c.type_of(&expr("field"), &scope, &locals).declared_id().is_some());
    }
}
