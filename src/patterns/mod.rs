//! Pattern classification: decides which ADT pattern a declaration opts
//! into and extracts the kind-specific configuration.

pub mod classifier;
pub mod markers;

pub use classifier::classify;

use crate::common::Span;
use crate::semantic::ResolvedType;
use crate::syntax::ast::TypeRef;
use serde::Serialize;
use std::fmt;

/// Operator generation level; ordered by richness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OperatorsGeneration {
    None,
    Default,
    DefaultWithKeyTypeOverloads,
}

impl OperatorsGeneration {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "None" => Some(Self::None),
            "Default" => Some(Self::Default),
            "DefaultWithKeyTypeOverloads" => Some(Self::DefaultWithKeyTypeOverloads),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Default => "Default",
            Self::DefaultWithKeyTypeOverloads => "DefaultWithKeyTypeOverloads",
        }
    }
}

impl fmt::Display for OperatorsGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator setting together with where it was written, if explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSetting {
    pub level: OperatorsGeneration,
    /// Span of the `Name = Value` argument; `None` when defaulted.
    pub arg_span: Option<Span>,
    pub value_span: Option<Span>,
}

impl OperatorSetting {
    pub fn defaulted() -> Self {
        Self {
            level: OperatorsGeneration::Default,
            arg_span: None,
            value_span: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSettings {
    pub comparison: OperatorSetting,
    pub equality: OperatorSetting,
    /// Attribute carrying the settings, for inserting a missing argument.
    pub attribute_span: Span,
    pub args_span: Option<Span>,
}

/// Serialization frameworks as bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SerializationFrameworks(pub u8);

/// Flag table in declaration order; composite entries last.
const FRAMEWORKS: &[(&str, u8)] = &[
    ("None", 0),
    ("SystemTextJson", 1),
    ("NewtonsoftJson", 2),
    ("MessagePack", 4),
    ("Json", 3),
    ("All", 7),
];

impl SerializationFrameworks {
    pub const NONE: Self = Self(0);

    pub fn parse(name: &str) -> Option<Self> {
        FRAMEWORKS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bits)| Self(*bits))
    }

    pub fn from_names(names: &[String]) -> Self {
        Self(
            names
                .iter()
                .filter_map(|n| Self::parse(n))
                .fold(0, |acc, f| acc | f.0),
        )
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn overlap(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Name of the first single framework contained in these flags.
    pub fn first_framework_name(self) -> Option<&'static str> {
        FRAMEWORKS
            .iter()
            .filter(|(_, bits)| bits.count_ones() == 1)
            .find(|(_, bits)| self.0 & bits != 0)
            .map(|(name, _)| *name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StringComparison {
    Ordinal,
    OrdinalIgnoreCase,
    CurrentCulture,
    CurrentCultureIgnoreCase,
    InvariantCulture,
    InvariantCultureIgnoreCase,
}

impl StringComparison {
    pub fn parse(name: &str) -> Option<Self> {
        let value = match name {
            "Ordinal" => Self::Ordinal,
            "OrdinalIgnoreCase" => Self::OrdinalIgnoreCase,
            "CurrentCulture" => Self::CurrentCulture,
            "CurrentCultureIgnoreCase" => Self::CurrentCultureIgnoreCase,
            "InvariantCulture" => Self::InvariantCulture,
            "InvariantCultureIgnoreCase" => Self::InvariantCultureIgnoreCase,
            _ => return None,
        };
        Some(value)
    }
}

/// `[KeyMemberComparer<Accessor, K>]` / `[KeyMemberEqualityComparer<Accessor, K>]`.
#[derive(Debug, Clone)]
pub struct ComparerMarker {
    pub accessor: TypeRef,
    pub key_type: ResolvedType,
    pub key_type_ref: TypeRef,
    pub span: Span,
    /// Span of the enclosing `[...]` list.
    pub list_span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct ComparerSettings {
    pub comparer: Option<ComparerMarker>,
    pub equality_comparer: Option<ComparerMarker>,
}

#[derive(Debug, Clone)]
pub struct SmartEnumInfo {
    /// `None` for keyless enums.
    pub key_type: Option<ResolvedType>,
    pub key_type_ref: Option<TypeRef>,
    pub is_validatable: bool,
    pub is_extensible: bool,
    pub key_property_name: String,
    pub operators: Option<OperatorSettings>,
    pub comparers: ComparerSettings,
    pub marker_span: Span,
}

#[derive(Debug, Clone)]
pub struct KeyedValueObjectInfo {
    pub key_type: ResolvedType,
    pub key_type_ref: TypeRef,
    pub skip_key_member: bool,
    pub key_member_name: String,
    pub allow_default_structs: bool,
    pub operators: Option<OperatorSettings>,
    pub comparers: ComparerSettings,
    pub marker_span: Span,
}

#[derive(Debug, Clone)]
pub struct ComplexValueObjectInfo {
    pub allow_default_structs: bool,
    pub default_string_comparison: StringComparison,
    pub operators: Option<OperatorSettings>,
    pub marker_span: Span,
}

#[derive(Debug, Clone)]
pub enum UnionKind {
    /// `[Union]` on an abstract base with nested case types.
    Regular,
    /// `[Union<T1, ..., Tn>]`
    AdHoc { member_types: Vec<(ResolvedType, Span)> },
}

#[derive(Debug, Clone)]
pub struct UnionInfo {
    pub kind: UnionKind,
    pub marker_span: Span,
}

impl UnionInfo {
    /// Regular unions discriminate by case type.
    pub fn is_discriminated_by_type(&self) -> bool {
        matches!(self.kind, UnionKind::Regular)
    }
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    SmartEnum(SmartEnumInfo),
    KeyedValueObject(KeyedValueObjectInfo),
    ComplexValueObject(ComplexValueObjectInfo),
    Union(UnionInfo),
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::SmartEnum(_) => "SmartEnum",
            PatternKind::KeyedValueObject(_) => "KeyedValueObject",
            PatternKind::ComplexValueObject(_) => "ComplexValueObject",
            PatternKind::Union(_) => "Union",
        }
    }

    pub fn as_smart_enum(&self) -> Option<&SmartEnumInfo> {
        match self {
            PatternKind::SmartEnum(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionInfo> {
        match self {
            PatternKind::Union(info) => Some(info),
            _ => None,
        }
    }

    pub fn is_value_object(&self) -> bool {
        matches!(
            self,
            PatternKind::KeyedValueObject(_) | PatternKind::ComplexValueObject(_)
        )
    }

    /// Whether a struct of this kind explicitly allows its zero value.
    pub fn allows_default_structs(&self) -> bool {
        match self {
            PatternKind::KeyedValueObject(info) => info.allow_default_structs,
            PatternKind::ComplexValueObject(info) => info.allow_default_structs,
            PatternKind::SmartEnum(_) | PatternKind::Union(_) => false,
        }
    }

    pub fn operators(&self) -> Option<&OperatorSettings> {
        match self {
            PatternKind::SmartEnum(info) => info.operators.as_ref(),
            PatternKind::KeyedValueObject(info) => info.operators.as_ref(),
            PatternKind::ComplexValueObject(info) => info.operators.as_ref(),
            PatternKind::Union(_) => None,
        }
    }

    pub fn comparers(&self) -> Option<&ComparerSettings> {
        match self {
            PatternKind::SmartEnum(info) => Some(&info.comparers),
            PatternKind::KeyedValueObject(info) => Some(&info.comparers),
            _ => None,
        }
    }

    pub fn key_type(&self) -> Option<&ResolvedType> {
        match self {
            PatternKind::SmartEnum(info) => info.key_type.as_ref(),
            PatternKind::KeyedValueObject(info) => Some(&info.key_type),
            _ => None,
        }
    }
}

/// `[ObjectFactory<T>]` augmentation.
#[derive(Debug, Clone)]
pub struct ObjectFactory {
    pub value_type: ResolvedType,
    pub value_type_ref: TypeRef,
    pub use_for_serialization: SerializationFrameworks,
    pub use_with_entity_framework: bool,
    pub use_for_model_binding: bool,
    pub has_corresponding_constructor: bool,
    pub span: Span,
}

impl ObjectFactory {
    /// Whether the generator needs a `ToValue` conversion back to the value type.
    pub fn needs_to_value(&self) -> bool {
        !self.use_for_serialization.is_none()
            || self.use_with_entity_framework
            || self.use_for_model_binding
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationIssue {
    /// Enum contracts with different key types.
    IncompatibleEnumInterfaces { span: Span },
}

/// Result of classifying one declaration. Never fails.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub primary: Option<PatternKind>,
    pub factories: Vec<ObjectFactory>,
    /// `[ValidationError<E>]`
    pub validation_error: Option<(ResolvedType, TypeRef, Span)>,
    pub issues: Vec<ClassificationIssue>,
    /// Partial part carrying the markers; every span above points into
    /// its file.
    pub home: Option<crate::semantic::TypeId>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
            && self.factories.is_empty()
            && self.validation_error.is_none()
            && self.issues.is_empty()
    }
}
