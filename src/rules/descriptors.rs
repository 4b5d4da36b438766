//! Stable rule identifiers with their default severity and message.
//!
//! Identifiers are never reused for a different invariant.

use crate::diagnostics::Severity;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub severity: Severity,
    /// Message template with positional `{n}` arguments.
    pub message: &'static str,
    pub has_fix: bool,
}

macro_rules! descriptors {
    ($($konst:ident = $id:literal, $name:literal, $sev:ident, $fix:literal, $msg:literal;)*) => {
        $(pub const $konst: &str = $id;)*

        pub static DESCRIPTORS: &[RuleDescriptor] = &[
            $(RuleDescriptor {
                id: $id,
                name: $name,
                severity: Severity::$sev,
                message: $msg,
                has_fix: $fix,
            },)*
        ];
    };
}

descriptors! {
    FIELD_MUST_BE_READ_ONLY = "TTRESG001", "FieldMustBeReadOnly", Error, true,
        "The field '{0}' of the type '{1}' must be read-only";
    PROPERTY_MUST_BE_READ_ONLY = "TTRESG002", "PropertyMustBeReadOnly", Error, true,
        "The property '{0}' of the type '{1}' must be read-only";
    TYPE_MUST_BE_CLASS_OR_STRUCT = "TTRESG003", "TypeMustBeClassOrStruct", Error, false,
        "The type '{0}' must be a class or a struct";
    TYPE_MUST_BE_PARTIAL = "TTRESG004", "TypeMustBePartial", Error, true,
        "The type '{0}' must be partial";
    MULTIPLE_INCOMPATIBLE_ENUM_INTERFACES = "TTRESG005", "MultipleIncompatibleEnumInterfaces", Error, false,
        "The type '{0}' implements the enumeration contract for different key types";
    ENUM_ITEM_MUST_BE_PUBLIC = "TTRESG006", "EnumItemMustBePublic", Error, true,
        "The item '{0}' of the enumeration '{1}' must be public";
    CONSTRUCTORS_MUST_BE_PRIVATE = "TTRESG007", "ConstructorsMustBePrivate", Error, true,
        "The constructors of the type '{0}' must be private";
    STRUCT_MUST_BE_READ_ONLY = "TTRESG008", "StructMustBeReadOnly", Error, true,
        "The struct '{0}' must be read-only";
    TYPE_MUST_BE_SEALED = "TTRESG009", "TypeMustBeSealed", Error, true,
        "The type '{0}' must be sealed";
    DERIVED_TYPE_MUST_BE_SEALED = "TTRESG010", "DerivedTypeMustBeSealed", Error, true,
        "The type '{0}' deriving from the enumeration '{1}' must be sealed";
    DERIVED_TYPE_CONSTRUCTORS_MUST_BE_PRIVATE = "TTRESG011", "DerivedTypeConstructorsMustBePrivate", Error, false,
        "The constructors of the type '{0}' deriving from the enumeration '{1}' must be private";
    TYPE_MUST_NOT_BE_GENERIC = "TTRESG012", "TypeMustNotBeGeneric", Error, false,
        "The type '{0}' must not be generic but declares {1} type parameter(s)";
    TYPE_MUST_NOT_BE_INSIDE_GENERIC_TYPE = "TTRESG013", "TypeMustNotBeInsideGenericType", Error, false,
        "The type '{0}' must not be nested inside the generic type '{1}'";
    KEY_MEMBER_MUST_NOT_BE_NULLABLE = "TTRESG014", "KeyMemberMustNotBeNullable", Error, false,
        "The key type '{1}' of the type '{0}' must not be nullable";
    CUSTOM_KEY_MEMBER_TYPE_MISMATCH = "TTRESG015", "CustomKeyMemberTypeMismatch", Error, false,
        "The key member '{0}' has the type '{1}' but the type '{2}' is expected";
    CUSTOM_KEY_MEMBER_NOT_FOUND = "TTRESG016", "CustomKeyMemberNotFound", Error, false,
        "The type '{0}' skips the generation of the key member but declares no member '{1}'";
    INVALID_CREATE_INVALID_ITEM_SIGNATURE = "TTRESG017", "InvalidCreateInvalidItemSignature", Error, false,
        "The method 'CreateInvalidItem' of the enumeration '{0}' must be 'private static {0} CreateInvalidItem({1} key)'";
    ABSTRACT_ENUM_MUST_IMPLEMENT_CREATE_INVALID_ITEM = "TTRESG018", "AbstractEnumMustImplementCreateInvalidItem", Error, true,
        "The abstract enumeration '{0}' must implement 'private static {0} CreateInvalidItem({1} key)'";
    NON_VALIDATABLE_ENUM_MUST_BE_CLASS = "TTRESG019", "NonValidatableEnumMustBeClass", Error, false,
        "The enumeration '{0}' must be a class because it is not validatable";
    ENUM_HAS_NO_ITEMS = "TTRESG020", "EnumHasNoItems", Warning, false,
        "The enumeration '{0}' has no items";
    EXTENSIBLE_ENUM_CANNOT_BE_STRUCT = "TTRESG021", "ExtensibleEnumCannotBeStruct", Error, false,
        "The extensible enumeration '{0}' cannot be a struct";
    EXTENSIBLE_ENUM_MUST_NOT_HAVE_VIRTUAL_MEMBERS = "TTRESG022", "ExtensibleEnumMustNotHaveVirtualMembers", Error, false,
        "The member '{0}' of the extensible enumeration '{1}' must not be virtual";
    STATIC_PROPERTIES_ARE_NOT_ITEMS = "TTRESG023", "StaticPropertiesAreNotItems", Warning, false,
        "The static property '{0}' of the enumeration '{1}' is not considered an item; use a static read-only field instead";
    PRIMARY_CONSTRUCTOR_NOT_ALLOWED = "TTRESG024", "PrimaryConstructorNotAllowed", Error, false,
        "The type '{0}' must not declare a primary constructor";
    EXPLICIT_COMPARER_WITHOUT_EQUALITY_COMPARER = "TTRESG025", "ExplicitComparerWithoutEqualityComparer", Error, true,
        "The type '{0}' specifies a comparer but no equality comparer";
    EXPLICIT_EQUALITY_COMPARER_WITHOUT_COMPARER = "TTRESG026", "ExplicitEqualityComparerWithoutComparer", Error, true,
        "The type '{0}' specifies an equality comparer but no comparer";
    COMPARER_KEY_TYPE_MISMATCH = "TTRESG027", "ComparerKeyTypeMismatch", Error, false,
        "The comparer of the type '{0}' is for the key type '{1}' but the key type is '{2}'";
    OPERATORS_GENERATION_MISMATCH = "TTRESG028", "OperatorsGenerationMismatch", Error, true,
        "The type '{0}' generates comparison operators with '{1}' but equality operators with '{2}'";
    NON_DEFAULT_STRUCT_MEMBER_MUST_BE_REQUIRED = "TTRESG029", "NonDefaultStructMemberMustBeRequired", Error, true,
        "The {0} '{1}' of the type '{2}' must be required because '{3}' does not allow default values";
    ALLOW_DEFAULT_STRUCTS_WITH_NON_DEFAULT_MEMBERS = "TTRESG030", "AllowDefaultStructsWithNonDefaultMembers", Error, false,
        "The type '{0}' allows default values but its member '{1}' of type '{2}' does not";
    DEFAULT_INSTANCE_NOT_ALLOWED = "TTRESG031", "DefaultInstanceNotAllowed", Error, false,
        "The type '{0}' does not allow default values; use one of its factory methods instead";
    DISPATCH_LAMBDA_MUST_BE_STATIC = "TTRESG032", "DispatchLambdaMustBeStatic", Warning, true,
        "The callback passed to '{0}' should be static to avoid a closure";
    INTERNAL_API_USAGE = "TTRESG033", "InternalApiUsage", Error, false,
        "'{0}' is an internal API of '{1}' and must not be used outside of it";
    REGULAR_UNION_MUST_BE_CLASS_OR_RECORD = "TTRESG034", "RegularUnionMustBeClassOrRecord", Error, false,
        "The union '{0}' must be a class or a record";
    UNION_CASE_MUST_BE_SEALED_OR_PRIVATE = "TTRESG035", "UnionCaseMustBeSealedOrPrivate", Error, true,
        "The type '{0}' deriving from the union '{1}' must be sealed or have private constructors only";
    INNER_TYPE_DOES_NOT_DERIVE_FROM_UNION = "TTRESG036", "InnerTypeDoesNotDeriveFromUnion", Error, false,
        "The inner type '{0}' of the union '{1}' does not derive from it";
    AD_HOC_UNION_TYPES_MUST_BE_DISTINCT = "TTRESG037", "AdHocUnionTypesMustBeDistinct", Error, false,
        "The union '{0}' lists the type '{1}' more than once";
    MULTIPLE_FACTORIES_FOR_SERIALIZATION_FRAMEWORK = "TTRESG038", "MultipleFactoriesForSerializationFramework", Error, false,
        "The type '{0}' has more than one object factory used for serialization with '{1}'";
    MULTIPLE_FACTORIES_FOR_ENTITY_FRAMEWORK = "TTRESG039", "MultipleFactoriesForEntityFramework", Error, false,
        "The type '{0}' has more than one object factory used with Entity Framework";
    MULTIPLE_FACTORIES_FOR_MODEL_BINDING = "TTRESG040", "MultipleFactoriesForModelBinding", Error, false,
        "The type '{0}' has more than one object factory used for model binding";
    VALIDATE_METHOD_MISSING = "TTRESG041", "ValidateMethodMissing", Error, true,
        "The type '{0}' must implement '{1}'";
    VALIDATE_METHOD_SIGNATURE_INVALID = "TTRESG042", "ValidateMethodSignatureInvalid", Error, true,
        "The method 'Validate' of the type '{0}' must have the signature '{1}'";
    TO_VALUE_METHOD_MISSING = "TTRESG043", "ToValueMethodMissing", Error, true,
        "The type '{0}' must implement '{1}'";
    TO_VALUE_METHOD_SIGNATURE_INVALID = "TTRESG044", "ToValueMethodSignatureInvalid", Error, true,
        "The method 'ToValue' of the type '{0}' must have the signature '{1}'";
    CORRESPONDING_CONSTRUCTOR_MISSING = "TTRESG045", "CorrespondingConstructorMissing", Error, false,
        "The type '{0}' must declare a constructor with a single parameter of type '{1}'";
    VALIDATION_ERROR_TYPE_MUST_IMPLEMENT_CONTRACT = "TTRESG046", "ValidationErrorTypeMustImplementContract", Error, false,
        "The validation error type '{0}' must implement 'IValidationError<{0}>'";
    USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_BE_PARTIAL = "TTRESG047", "UseDelegateFromConstructorMethodMustBePartial", Error, true,
        "The method '{0}' marked with 'UseDelegateFromConstructor' must be partial";
    USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_NOT_BE_GENERIC = "TTRESG048", "UseDelegateFromConstructorMethodMustNotBeGeneric", Error, false,
        "The method '{0}' marked with 'UseDelegateFromConstructor' must not be generic";
}

pub fn descriptor(id: &str) -> Option<&'static RuleDescriptor> {
    DESCRIPTORS.iter().find(|d| d.id == id)
}
