//! Semantic model over parsed sources: assemblies, type symbols, name
//! resolution, nullable context and simple expression typing.
//!
//! Referenced assemblies are given as source ("metadata as source"). Only
//! their publicly visible surface is consulted by cross-assembly queries.

pub mod resolve;
pub mod symbols;
pub mod types;
pub mod typing;

pub use resolve::Scope;
pub use symbols::{SymbolTable, TypeId, TypeSymbol};
pub use types::{Builtin, ResolvedType};
pub use typing::LocalScope;

use crate::syntax::SourceFile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

/// Assembly index; `AssemblyId::CURRENT` is the compilation under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssemblyId(pub usize);

impl AssemblyId {
    pub const CURRENT: AssemblyId = AssemblyId(0);
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub name: String,
    pub files: Vec<Arc<SourceFile>>,
}

impl Assembly {
    pub fn new(name: impl Into<String>, files: Vec<Arc<SourceFile>>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }
}

/// Where the pattern library lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryInfo {
    pub assembly_name: String,
    pub namespace: String,
    pub internal_namespace: String,
}

impl Default for LibraryInfo {
    fn default() -> Self {
        Self {
            assembly_name: "Thinktecture.Runtime.Extensions".to_string(),
            namespace: "Thinktecture".to_string(),
            internal_namespace: "Thinktecture.Internal".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilationOptions {
    /// Nullable context when no `#nullable` directive applies.
    pub nullable_default: bool,
    pub library: LibraryInfo,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            nullable_default: true,
            library: LibraryInfo::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Compilation {
    assemblies: Vec<Assembly>,
    options: CompilationOptions,
    symbols: SymbolTable,
    derived: HashMap<TypeId, Vec<TypeId>>,
}

impl Compilation {
    pub fn new(current: Assembly, references: Vec<Assembly>, options: CompilationOptions) -> Self {
        let assemblies: Vec<Assembly> = std::iter::once(current).chain(references).collect();
        let files = assemblies
            .iter()
            .enumerate()
            .flat_map(|(idx, asm)| {
                asm.files
                    .iter()
                    .map(move |f| (Arc::clone(f), AssemblyId(idx)))
            })
            .collect();
        let symbols = SymbolTable::build(files);
        let mut compilation = Self {
            assemblies,
            options,
            symbols,
            derived: HashMap::new(),
        };
        compilation.derived = compilation.compute_derived();
        tracing::debug!(
            assembly = %compilation.assembly_name(),
            types = compilation.symbols.len(),
            references = compilation.assemblies.len() - 1,
            "built compilation"
        );
        compilation
    }

    /// Single-assembly compilation, mostly for tests.
    pub fn from_sources(assembly_name: &str, sources: &[(&str, &str)]) -> Self {
        let files = sources
            .iter()
            .map(|(path, text)| Arc::new(SourceFile::parse(*path, *text)))
            .collect();
        Self::new(
            Assembly::new(assembly_name, files),
            Vec::new(),
            CompilationOptions::default(),
        )
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn library(&self) -> &LibraryInfo {
        &self.options.library
    }

    pub fn assembly_name(&self) -> &str {
        &self.assemblies[0].name
    }

    pub fn assembly(&self, id: AssemblyId) -> &Assembly {
        &self.assemblies[id.0]
    }

    pub fn current_files(&self) -> &[Arc<SourceFile>] {
        &self.assemblies[0].files
    }

    /// File ids of the current assembly.
    pub fn current_file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.symbols.file_count())
            .map(FileId)
            .filter(|f| self.symbols.file_assembly(*f) == AssemblyId::CURRENT)
    }

    pub fn is_current(&self, id: TypeId) -> bool {
        self.symbols.get(id).assembly == AssemblyId::CURRENT
    }

    /// Types of the current assembly, outer before nested.
    pub fn current_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.symbols.ids().filter(|id| self.is_current(*id))
    }

    /// Every partial part of `id` declared in the same assembly, `id`
    /// included, in declaration order.
    pub fn parts(&self, id: TypeId) -> Vec<TypeId> {
        let symbols = &self.symbols;
        let me = symbols.get(id);
        let qualified = symbols.qualified_name(id);
        symbols
            .lookup(&me.name, me.arity)
            .iter()
            .copied()
            .filter(|other| {
                symbols.get(*other).assembly == me.assembly && symbols.qualified_name(*other) == qualified
            })
            .collect()
    }

    /// Types in the current compilation whose base class is `id`.
    pub fn derived_types(&self, id: TypeId) -> &[TypeId] {
        self.derived.get(&id).map_or(&[], Vec::as_slice)
    }

    fn compute_derived(&self) -> HashMap<TypeId, Vec<TypeId>> {
        let mut derived: HashMap<TypeId, Vec<TypeId>> = HashMap::new();
        for id in self.current_types() {
            if let Some(base) = self.base_class(id).and_then(|b| b.declared_id()) {
                derived.entry(base).or_default().push(id);
            }
        }
        derived
    }

    /// Nullable context at a position of a file.
    pub fn nullable_enabled(&self, file: FileId, offset: usize) -> bool {
        self.symbols
            .file(file)
            .nullable_context_at(offset)
            .unwrap_or(self.options.nullable_default)
    }

    /// Copy of this compilation with one current-assembly file replaced.
    pub fn with_file_replaced(&self, file: FileId, replacement: Arc<SourceFile>) -> Self {
        let target = Arc::clone(self.symbols.file(file));
        let mut assemblies = self.assemblies.clone();
        for asm in &mut assemblies {
            for f in &mut asm.files {
                if Arc::ptr_eq(f, &target) {
                    *f = Arc::clone(&replacement);
                }
            }
        }
        let mut iter = assemblies.into_iter();
        let current = iter.next().unwrap_or_else(|| Assembly::new("", Vec::new()));
        Self::new(current, iter.collect(), self.options.clone())
    }

    /// File id of a current-assembly file by path.
    pub fn file_id(&self, path: &std::path::Path) -> Option<FileId> {
        self.current_file_ids()
            .find(|f| self.symbols.file(*f).path() == path)
    }
}
