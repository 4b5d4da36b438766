use super::symbols::{SymbolTable, TypeId};
use crate::syntax::ast::TypeDeclKind;
use std::fmt;

/// Well-known `System` types: (C# keyword if any, metadata name, is value type).
const BUILTINS: &[(Option<&str>, &str, bool)] = &[
    (Some("bool"), "Boolean", true),
    (Some("byte"), "Byte", true),
    (Some("sbyte"), "SByte", true),
    (Some("char"), "Char", true),
    (Some("decimal"), "Decimal", true),
    (Some("double"), "Double", true),
    (Some("float"), "Single", true),
    (Some("int"), "Int32", true),
    (Some("uint"), "UInt32", true),
    (Some("long"), "Int64", true),
    (Some("ulong"), "UInt64", true),
    (Some("short"), "Int16", true),
    (Some("ushort"), "UInt16", true),
    (Some("nint"), "IntPtr", true),
    (Some("nuint"), "UIntPtr", true),
    (Some("object"), "Object", false),
    (Some("string"), "String", false),
    (Some("void"), "Void", false),
    (Some("dynamic"), "Object", false),
    (None, "Guid", true),
    (None, "DateTime", true),
    (None, "DateTimeOffset", true),
    (None, "TimeSpan", true),
    (None, "DateOnly", true),
    (None, "TimeOnly", true),
    (None, "Half", true),
    (None, "Int128", true),
    (None, "UInt128", true),
    (None, "IFormatProvider", false),
    (None, "Exception", false),
    (None, "Type", false),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Builtin(usize);

impl Builtin {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .position(|(kw, _, _)| *kw == Some(keyword))
            .map(Builtin)
    }

    /// Metadata name without the `System.` prefix.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("System.").unwrap_or(name);
        BUILTINS
            .iter()
            .position(|(kw, n, _)| *n == name && *kw != Some("dynamic"))
            .map(Builtin)
    }

    pub fn name(self) -> &'static str {
        BUILTINS[self.0].1
    }

    pub fn keyword(self) -> Option<&'static str> {
        BUILTINS[self.0].0
    }

    pub fn is_value_type(self) -> bool {
        BUILTINS[self.0].2
    }

    pub fn is_string(self) -> bool {
        self.name() == "String"
    }
}

/// A type reference after name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    Declared { id: TypeId, args: Vec<ResolvedType> },
    Builtin(Builtin),
    /// Named type without a declaration in any known assembly.
    External { name: String, args: Vec<ResolvedType> },
    TypeParam(String),
    /// `T?`, `Nullable<T>`.
    Nullable(Box<ResolvedType>),
    Array(Box<ResolvedType>, usize),
    Tuple(Vec<ResolvedType>),
    Unknown,
}

impl ResolvedType {
    pub fn declared(id: TypeId) -> Self {
        ResolvedType::Declared {
            id,
            args: Vec::new(),
        }
    }

    pub fn declared_id(&self) -> Option<TypeId> {
        match self {
            ResolvedType::Declared { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, ResolvedType::Nullable(_))
    }

    pub fn strip_nullable(&self) -> &ResolvedType {
        match self {
            ResolvedType::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolvedType::Unknown)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ResolvedType::Builtin(b) if b.is_string())
    }

    /// Simple name of the type constructor, e.g. `IEnum` for `IEnum<string>`.
    pub fn simple_name<'a>(&'a self, symbols: &'a SymbolTable) -> Option<&'a str> {
        match self {
            ResolvedType::Declared { id, .. } => Some(symbols.get(*id).name.as_str()),
            ResolvedType::External { name, .. } => Some(name.rsplit('.').next().unwrap_or(name)),
            ResolvedType::Builtin(b) => Some(b.name()),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[ResolvedType] {
        match self {
            ResolvedType::Declared { args, .. } | ResolvedType::External { args, .. } => args,
            _ => &[],
        }
    }

    /// `Some(true)` for value types, `Some(false)` for reference types and
    /// `None` when unknown (type parameters, unresolved names).
    pub fn is_value_type(&self, symbols: &SymbolTable) -> Option<bool> {
        match self {
            ResolvedType::Builtin(b) => Some(b.is_value_type()),
            ResolvedType::Declared { id, .. } => Some(matches!(
                symbols.get(*id).kind,
                TypeDeclKind::Struct | TypeDeclKind::RecordStruct | TypeDeclKind::Enum
            )),
            ResolvedType::Nullable(inner) => inner.is_value_type(symbols),
            ResolvedType::Array(..) => Some(false),
            ResolvedType::Tuple(_) => Some(true),
            ResolvedType::External { .. } | ResolvedType::TypeParam(_) | ResolvedType::Unknown => {
                None
            }
        }
    }

    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, symbols }
    }
}

/// C#-style rendering used in diagnostic messages and synthesized code.
pub struct TypeDisplay<'a> {
    ty: &'a ResolvedType,
    symbols: &'a SymbolTable,
}

impl TypeDisplay<'_> {
    fn write_args(&self, f: &mut fmt::Formatter<'_>, args: &[ResolvedType]) -> fmt::Result {
        if args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg.display(self.symbols))?;
        }
        f.write_str(">")
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            ResolvedType::Declared { id, args } => {
                f.write_str(&self.symbols.get(*id).name)?;
                self.write_args(f, args)
            }
            ResolvedType::Builtin(b) => f.write_str(b.keyword().unwrap_or(b.name())),
            ResolvedType::External { name, args } => {
                f.write_str(name)?;
                self.write_args(f, args)
            }
            ResolvedType::TypeParam(name) => f.write_str(name),
            ResolvedType::Nullable(inner) => write!(f, "{}?", inner.display(self.symbols)),
            ResolvedType::Array(element, rank) => {
                write!(f, "{}[{}]", element.display(self.symbols), ",".repeat(rank.saturating_sub(1)))
            }
            ResolvedType::Tuple(elements) => {
                f.write_str("(")?;
                for (i, el) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", el.display(self.symbols))?;
                }
                f.write_str(")")
            }
            ResolvedType::Unknown => f.write_str("?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_by_keyword_and_name() {
        let int = Builtin::from_keyword("int");
        assert_eq!(int, Builtin::from_name("System.Int32"));
        assert_eq!(int.map(Builtin::is_value_type), Some(true));
        assert_eq!(Builtin::from_keyword("string").map(Builtin::is_string), Some(true));
        assert!(Builtin::from_name("Guid").is_some_and(Builtin::is_value_type));
        assert_eq!(Builtin::from_keyword("Guid"), None);
    }

    #[test]
    fn display_uses_keywords() {
        let symbols = SymbolTable::default();
        let ty = ResolvedType::Nullable(Box::new(ResolvedType::Builtin(
            Builtin::from_keyword("int").unwrap(),
        )));
        assert_eq!(ty.display(&symbols).to_string(), "int?");
        let generic = ResolvedType::External {
            name: "IEnum".to_string(),
            args: vec![ResolvedType::Builtin(Builtin::from_keyword("string").unwrap())],
        };
        assert_eq!(generic.display(&symbols).to_string(), "IEnum<string>");
    }
}
