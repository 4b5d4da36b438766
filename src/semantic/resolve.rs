//! Name resolution for type references.
//!
//! Names are looked up through the enclosing types, then the namespace
//! chain, then globally by name and generic arity. Referenced assemblies
//! participate only through their publicly visible types.

use super::{Builtin, Compilation, FileId, ResolvedType, TypeId};
use crate::syntax::ast::{Member, NameSegment, TypeDeclKind, TypeRef, TypeRefKind};

/// Resolution context at a position in source.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub file: Option<FileId>,
    pub namespace: String,
    /// Innermost enclosing type.
    pub containing: Option<TypeId>,
    /// Type parameters in scope (type and method level).
    pub type_params: Vec<String>,
}

impl Scope {
    pub fn with_type_params(mut self, params: impl IntoIterator<Item = String>) -> Self {
        self.type_params.extend(params);
        self
    }
}

impl Compilation {
    /// Scope inside the body of `id`.
    pub fn scope_of(&self, id: TypeId) -> Scope {
        let symbols = self.symbols();
        let symbol = symbols.get(id);
        let mut type_params: Vec<String> = Vec::new();
        for t in std::iter::once(id).chain(symbols.containing_chain(id)) {
            type_params.extend(symbols.decl(t).type_params.iter().map(|p| p.text.clone()));
        }
        Scope {
            file: Some(symbol.file),
            namespace: symbol.namespace.clone(),
            containing: Some(id),
            type_params,
        }
    }

    pub fn resolve(&self, ty: &TypeRef, scope: &Scope) -> ResolvedType {
        match &ty.kind {
            TypeRefKind::Predefined(keyword) => Builtin::from_keyword(keyword)
                .map(ResolvedType::Builtin)
                .unwrap_or(ResolvedType::Unknown),
            TypeRefKind::Nullable(inner) => {
                ResolvedType::Nullable(Box::new(self.resolve(inner, scope)))
            }
            TypeRefKind::Array { element, rank } => {
                ResolvedType::Array(Box::new(self.resolve(element, scope)), *rank)
            }
            TypeRefKind::Tuple(elements) => ResolvedType::Tuple(
                elements.iter().map(|e| self.resolve(&e.ty, scope)).collect(),
            ),
            TypeRefKind::Named { segments, .. } => self.resolve_segments(segments, scope),
        }
    }

    fn resolve_args(&self, seg: &NameSegment, scope: &Scope) -> Vec<ResolvedType> {
        seg.type_args.iter().map(|a| self.resolve(a, scope)).collect()
    }

    fn resolve_segments(&self, segments: &[NameSegment], scope: &Scope) -> ResolvedType {
        let Some(first) = segments.first() else {
            return ResolvedType::Unknown;
        };
        let name = first.name.text.as_str();
        let arity = first.type_args.len();

        if segments.len() == 1 && arity == 0 && scope.type_params.iter().any(|p| p == name) {
            return ResolvedType::TypeParam(name.to_string());
        }

        // `Nullable<T>` / `System.Nullable<T>`
        if let Some(last) = segments.last() {
            let qualified_ok = segments.len() == 1
                || (segments.len() == 2 && segments[0].name.text == "System");
            if qualified_ok && last.name.text == "Nullable" && last.type_args.len() == 1 {
                return ResolvedType::Nullable(Box::new(self.resolve(&last.type_args[0], scope)));
            }
        }

        // namespace-qualified: `A.B.Type.Nested`
        for split in 1..segments.len() {
            let namespace = segments[..split]
                .iter()
                .map(|s| s.name.text.as_str())
                .collect::<Vec<_>>()
                .join(".");
            let seg = &segments[split];
            if let Some(id) =
                self.visible_in_namespace(&namespace, &seg.name.text, seg.type_args.len())
            {
                return self.resolve_nested_rest(id, &segments[split..], scope);
            }
            if namespace == "System" && split == segments.len() - 1 && seg.type_args.is_empty() {
                if let Some(b) = Builtin::from_name(&seg.name.text) {
                    return ResolvedType::Builtin(b);
                }
            }
        }

        if let Some(id) = self.lookup_simple(name, arity, scope) {
            return self.resolve_nested_rest(id, segments, scope);
        }

        if segments.len() == 1 && arity == 0 {
            if let Some(b) = Builtin::from_name(name) {
                return ResolvedType::Builtin(b);
            }
        }

        let Some(last) = segments.last() else {
            return ResolvedType::Unknown;
        };
        ResolvedType::External {
            name: segments
                .iter()
                .map(|s| s.name.text.as_str())
                .collect::<Vec<_>>()
                .join("."),
            args: self.resolve_args(last, scope),
        }
    }

    /// Resolves `segments[1..]` as nested types of `id` (which is
    /// `segments[0]`).
    fn resolve_nested_rest(
        &self,
        id: TypeId,
        segments: &[NameSegment],
        scope: &Scope,
    ) -> ResolvedType {
        let mut current = id;
        for seg in &segments[1..] {
            match self
                .symbols()
                .lookup_nested(current, &seg.name.text, seg.type_args.len())
            {
                Some(nested) => current = nested,
                None => return ResolvedType::Unknown,
            }
        }
        let args = segments
            .last()
            .map(|s| self.resolve_args(s, scope))
            .unwrap_or_default();
        ResolvedType::Declared { id: current, args }
    }

    fn visible_in_namespace(&self, namespace: &str, name: &str, arity: usize) -> Option<TypeId> {
        let symbols = self.symbols();
        symbols
            .lookup(name, arity)
            .iter()
            .copied()
            .filter(|id| symbols.get(*id).containing.is_none() && symbols.get(*id).namespace == namespace)
            .find(|id| self.is_accessible_from_current(*id))
    }

    fn is_accessible_from_current(&self, id: TypeId) -> bool {
        self.is_current(id) || self.symbols().is_publicly_visible(id)
    }

    fn lookup_simple(&self, name: &str, arity: usize, scope: &Scope) -> Option<TypeId> {
        let symbols = self.symbols();

        // enclosing types and their nested types
        if let Some(containing) = scope.containing {
            for t in std::iter::once(containing).chain(symbols.containing_chain(containing)) {
                if symbols.get(t).name == name && symbols.get(t).arity == arity {
                    return Some(t);
                }
                if let Some(nested) = symbols.lookup_nested(t, name, arity) {
                    return Some(nested);
                }
                // nested types inherited from base classes
                let mut base = self.base_class(t).and_then(|b| b.declared_id());
                let mut guard = 0;
                while let Some(b) = base {
                    if let Some(nested) = symbols.lookup_nested(b, name, arity) {
                        return Some(nested);
                    }
                    guard += 1;
                    if guard > 32 {
                        break;
                    }
                    base = self.base_class(b).and_then(|bb| bb.declared_id());
                }
            }
        }

        // namespace chain, innermost first
        let mut ns = scope.namespace.as_str();
        loop {
            if let Some(id) = self.visible_in_namespace(ns, name, arity) {
                return Some(id);
            }
            match ns.rfind('.') {
                Some(idx) => ns = &ns[..idx],
                None if !ns.is_empty() => ns = "",
                None => break,
            }
        }

        // global fallback (stands in for `using` directives): current
        // assembly first, then accessible referenced types
        let candidates = symbols.lookup(name, arity);
        candidates
            .iter()
            .copied()
            .filter(|id| symbols.get(*id).containing.is_none())
            .find(|id| self.is_current(*id))
            .or_else(|| {
                candidates
                    .iter()
                    .copied()
                    .filter(|id| symbols.get(*id).containing.is_none())
                    .find(|id| symbols.is_publicly_visible(*id))
            })
    }

    /// Base class of a class or record: the first base list entry that
    /// resolves to a declared class. Interfaces and unknown names are not
    /// base classes.
    pub fn base_class(&self, id: TypeId) -> Option<ResolvedType> {
        let symbols = self.symbols();
        let decl = symbols.decl(id);
        if !decl.kind.is_class_like() {
            return None;
        }
        let first = decl.base_list.first()?;
        let mut scope = self.scope_of(id);
        // the base list is resolved outside the type's own body
        scope.containing = symbols.get(id).containing;
        let resolved = self.resolve(first, &scope);
        match resolved.declared_id() {
            Some(base) if base != id && symbols.get(base).kind.is_class_like() => Some(resolved),
            _ => None,
        }
    }

    /// Base class chain, nearest first, stopping at cycles.
    pub fn base_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = self.base_class(id).and_then(|b| b.declared_id());
        while let Some(base) = current {
            if base == id || chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = self.base_class(base).and_then(|b| b.declared_id());
        }
        chain
    }

    /// Resolved base list entries of `id` (base class and interfaces).
    pub fn base_list(&self, id: TypeId) -> Vec<(ResolvedType, &TypeRef)> {
        let symbols = self.symbols();
        let mut scope = self.scope_of(id);
        scope.containing = symbols.get(id).containing;
        symbols
            .decl(id)
            .base_list
            .iter()
            .map(|t| (self.resolve(t, &scope), t))
            .collect()
    }

    /// Whether `id` derives from `ancestor`, directly or transitively.
    pub fn derives_from(&self, id: TypeId, ancestor: TypeId) -> bool {
        self.base_chain(id).contains(&ancestor)
    }

    /// Whether the declaration is a nested container for other types, i.e.
    /// a static class or a type with nested type members only.
    pub fn is_type_container(&self, id: TypeId) -> bool {
        let decl = self.symbols().decl(id);
        decl.kind == TypeDeclKind::Class
            && decl.has_modifier(crate::syntax::ast::ModifierKind::Static)
            && decl.members.iter().all(|m| matches!(m, Member::Type(_)))
    }
}
