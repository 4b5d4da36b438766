//! Type symbol table spanning the current compilation and its references.

use super::{AssemblyId, FileId};
use crate::syntax::ast::{Member, ModifierKind, TypeDecl, TypeDeclKind};
use crate::syntax::SourceFile;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub id: TypeId,
    pub name: String,
    pub arity: usize,
    pub kind: TypeDeclKind,
    pub namespace: String,
    pub containing: Option<TypeId>,
    pub file: FileId,
    pub assembly: AssemblyId,
    /// Index into the file's top-level types, then member indices of
    /// nested type declarations.
    path: Vec<usize>,
}

impl TypeSymbol {
    pub fn metadata_name(&self) -> String {
        if self.arity == 0 {
            self.name.clone()
        } else {
            format!("{}`{}", self.name, self.arity)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: Vec<TypeSymbol>,
    files: Vec<(Arc<SourceFile>, AssemblyId)>,
    by_name: HashMap<(String, usize), Vec<TypeId>>,
    nested: HashMap<TypeId, Vec<TypeId>>,
}

impl SymbolTable {
    pub(super) fn build(files: Vec<(Arc<SourceFile>, AssemblyId)>) -> Self {
        let mut table = SymbolTable {
            files,
            ..Default::default()
        };
        for file_idx in 0..table.files.len() {
            let file = Arc::clone(&table.files[file_idx].0);
            let assembly = table.files[file_idx].1;
            for (idx, decl) in file.unit.types.iter().enumerate() {
                table.add(decl, FileId(file_idx), assembly, None, vec![idx]);
            }
        }
        table
    }

    fn add(
        &mut self,
        decl: &TypeDecl,
        file: FileId,
        assembly: AssemblyId,
        containing: Option<TypeId>,
        path: Vec<usize>,
    ) {
        let id = TypeId(self.types.len());
        self.types.push(TypeSymbol {
            id,
            name: decl.name.text.clone(),
            arity: decl.type_params.len(),
            kind: decl.kind,
            namespace: decl.namespace.clone(),
            containing,
            file,
            assembly,
            path: path.clone(),
        });
        self.by_name
            .entry((decl.name.text.clone(), decl.type_params.len()))
            .or_default()
            .push(id);
        if let Some(parent) = containing {
            self.nested.entry(parent).or_default().push(id);
        }
        for (idx, member) in decl.members.iter().enumerate() {
            if let Member::Type(nested) = member {
                let mut nested_path = path.clone();
                nested_path.push(idx);
                self.add(nested, file, assembly, Some(id), nested_path);
            }
        }
    }

    pub fn get(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.iter().map(|t| t.id)
    }

    pub fn file(&self, id: FileId) -> &Arc<SourceFile> {
        &self.files[id.0].0
    }

    pub fn file_assembly(&self, id: FileId) -> AssemblyId {
        self.files[id.0].1
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn source_of(&self, id: TypeId) -> &SourceFile {
        self.file(self.get(id).file)
    }

    /// Syntax of a declared type.
    pub fn decl(&self, id: TypeId) -> &TypeDecl {
        let symbol = self.get(id);
        let file = self.file(symbol.file);
        let mut decl = &file.unit.types[symbol.path[0]];
        for idx in &symbol.path[1..] {
            if let Member::Type(nested) = &decl.members[*idx] {
                decl = nested;
            }
        }
        decl
    }

    pub fn lookup(&self, name: &str, arity: usize) -> &[TypeId] {
        self.by_name
            .get(&(name.to_string(), arity))
            .map_or(&[], Vec::as_slice)
    }

    pub fn nested_types(&self, id: TypeId) -> &[TypeId] {
        self.nested.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Containing types from the innermost outwards.
    pub fn containing_chain(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.get(id).containing, move |c| self.get(*c).containing)
    }

    /// `Outer.Inner` style name.
    pub fn qualified_name(&self, id: TypeId) -> String {
        let mut parts = vec![self.get(id).name.clone()];
        for outer in self.containing_chain(id) {
            parts.push(self.get(outer).name.clone());
        }
        parts.reverse();
        let name = parts.join(".");
        let ns = &self.get(id).namespace;
        if ns.is_empty() {
            name
        } else {
            format!("{ns}.{name}")
        }
    }

    /// Declared accessibility, with C# defaults for the declaration site.
    pub fn is_publicly_visible(&self, id: TypeId) -> bool {
        let decl = self.decl(id);
        let own = decl.has_modifier(ModifierKind::Public)
            || decl.has_modifier(ModifierKind::Protected) && !decl.has_modifier(ModifierKind::Private);
        own && self.containing_chain(id).all(|c| self.is_publicly_visible(c))
    }

    /// Type declared in `namespace` with the given name and arity.
    pub fn lookup_in_namespace(&self, namespace: &str, name: &str, arity: usize) -> Option<TypeId> {
        self.lookup(name, arity)
            .iter()
            .copied()
            .find(|id| self.get(*id).containing.is_none() && self.get(*id).namespace == namespace)
    }

    pub fn lookup_nested(&self, parent: TypeId, name: &str, arity: usize) -> Option<TypeId> {
        self.nested_types(parent)
            .iter()
            .copied()
            .find(|id| self.get(*id).name == name && self.get(*id).arity == arity)
    }
}
