//! Rule catalogue.
//!
//! Every rule is a plain function from a [`RuleContext`] to the
//! diagnostics it finds. Rules share nothing and may run in any order;
//! the reporter sorts and deduplicates their combined output.

pub mod declaration;
pub mod descriptors;
pub mod enums;
pub mod factories;
pub mod hierarchy;
pub mod members;
pub mod pairing;
pub mod unions;
pub mod usage;
pub mod value_objects;

pub use descriptors::{descriptor, RuleDescriptor, DESCRIPTORS};

use crate::common::Span;
use crate::diagnostics::{format_message, Diagnostic, Location, Severity};
use crate::patterns::{Classification, PatternKind};
use crate::semantic::{Compilation, FileId, Scope, TypeId};
use crate::syntax::ast::{ModifierKind, TypeDecl};
use crate::syntax::SourceFile;

/// One partial part of the declaration under analysis.
#[derive(Clone, Copy)]
pub struct Part<'a> {
    pub id: TypeId,
    pub decl: &'a TypeDecl,
    pub file: &'a SourceFile,
}

/// Everything a rule may look at for one declaration.
pub struct RuleContext<'a> {
    pub compilation: &'a Compilation,
    pub id: TypeId,
    pub decl: &'a TypeDecl,
    pub file: &'a SourceFile,
    pub file_id: FileId,
    pub classification: &'a Classification,
}

impl<'a> RuleContext<'a> {
    pub fn new(compilation: &'a Compilation, id: TypeId, classification: &'a Classification) -> Self {
        let symbols = compilation.symbols();
        let file_id = symbols.get(id).file;
        Self {
            compilation,
            id,
            decl: symbols.decl(id),
            file: symbols.file(file_id).as_ref(),
            file_id,
            classification,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.decl.name.text
    }

    pub fn kind(&self) -> Option<&'a PatternKind> {
        self.classification.primary.as_ref()
    }

    /// Scope inside the declaration body.
    pub fn scope(&self) -> Scope {
        self.compilation.scope_of(self.id)
    }

    pub fn library_namespace(&self) -> &'a str {
        &self.compilation.library().namespace
    }

    pub fn nullable_enabled_at(&self, offset: usize) -> bool {
        self.compilation.nullable_enabled(self.file_id, offset)
    }

    /// Every partial part of this declaration in the same assembly,
    /// this one included.
    pub fn parts(&self) -> Vec<TypeId> {
        self.compilation.parts(self.id)
    }

    /// Every partial part with its declaration and file.
    pub fn part_decls(&self) -> Vec<Part<'a>> {
        let symbols = self.compilation.symbols();
        self.parts()
            .into_iter()
            .map(|id| Part {
                id,
                decl: symbols.decl(id),
                file: symbols.source_of(id),
            })
            .collect()
    }

    /// Modifiers of partial parts combine.
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        self.part_decls().iter().any(|p| p.decl.has_modifier(kind))
    }

    /// The part carrying the markers. Declaration-level rules run there
    /// once; member rules walk every part from it.
    pub fn is_home_part(&self) -> bool {
        self.classification.home.map_or(true, |home| home == self.id)
    }

    pub fn report(&self, id: &'static str, span: Span, args: Vec<String>) -> Diagnostic {
        let severity = descriptor(id).map_or(Severity::Error, |d| d.severity);
        self.report_with_severity(id, severity, span, args)
    }

    pub fn report_with_severity(
        &self,
        id: &'static str,
        severity: Severity,
        span: Span,
        args: Vec<String>,
    ) -> Diagnostic {
        self.report_in(self.file, id, severity, span, args)
    }

    /// Reports a member of another partial part in that part's file.
    pub fn report_on(&self, part: &Part<'_>, id: &'static str, span: Span, args: Vec<String>) -> Diagnostic {
        let severity = descriptor(id).map_or(Severity::Error, |d| d.severity);
        self.report_in(part.file, id, severity, span, args)
    }

    /// Reports a location in another file, e.g. a case type declared in a
    /// different part of the hierarchy.
    pub fn report_in(
        &self,
        file: &SourceFile,
        id: &'static str,
        severity: Severity,
        span: Span,
        args: Vec<String>,
    ) -> Diagnostic {
        let message = descriptor(id).map_or_else(String::new, |d| format_message(d.message, &args));
        Diagnostic {
            id,
            severity,
            args,
            message,
            location: Location::new(file, span),
            additional_locations: Vec::new(),
            node_span: span,
        }
    }
}

pub type RuleFn = fn(&RuleContext<'_>) -> Vec<Diagnostic>;

/// A registered rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub check: RuleFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

macro_rules! rules {
    ($($id:path => $check:path,)*) => {
        static CATALOGUE: &[Rule] = &[$(Rule { id: $id, check: $check },)*];
    };
}

use descriptors as d;

rules! {
    d::FIELD_MUST_BE_READ_ONLY => members::field_must_be_read_only,
    d::PROPERTY_MUST_BE_READ_ONLY => members::property_must_be_read_only,
    d::TYPE_MUST_BE_CLASS_OR_STRUCT => declaration::type_must_be_class_or_struct,
    d::TYPE_MUST_BE_PARTIAL => declaration::type_must_be_partial,
    d::MULTIPLE_INCOMPATIBLE_ENUM_INTERFACES => enums::multiple_incompatible_enum_interfaces,
    d::ENUM_ITEM_MUST_BE_PUBLIC => members::enum_item_must_be_public,
    d::CONSTRUCTORS_MUST_BE_PRIVATE => hierarchy::constructors_must_be_private,
    d::STRUCT_MUST_BE_READ_ONLY => declaration::struct_must_be_read_only,
    d::TYPE_MUST_BE_SEALED => hierarchy::type_must_be_sealed,
    d::DERIVED_TYPE_MUST_BE_SEALED => hierarchy::derived_type_must_be_sealed,
    d::DERIVED_TYPE_CONSTRUCTORS_MUST_BE_PRIVATE => hierarchy::derived_type_constructors_must_be_private,
    d::TYPE_MUST_NOT_BE_GENERIC => declaration::type_must_not_be_generic,
    d::TYPE_MUST_NOT_BE_INSIDE_GENERIC_TYPE => declaration::type_must_not_be_inside_generic_type,
    d::KEY_MEMBER_MUST_NOT_BE_NULLABLE => value_objects::key_member_must_not_be_nullable,
    d::CUSTOM_KEY_MEMBER_TYPE_MISMATCH => value_objects::custom_key_member_type_mismatch,
    d::CUSTOM_KEY_MEMBER_NOT_FOUND => value_objects::custom_key_member_not_found,
    d::INVALID_CREATE_INVALID_ITEM_SIGNATURE => enums::invalid_create_invalid_item_signature,
    d::ABSTRACT_ENUM_MUST_IMPLEMENT_CREATE_INVALID_ITEM => enums::abstract_enum_must_implement_create_invalid_item,
    d::NON_VALIDATABLE_ENUM_MUST_BE_CLASS => enums::non_validatable_enum_must_be_class,
    d::ENUM_HAS_NO_ITEMS => enums::enum_has_no_items,
    d::EXTENSIBLE_ENUM_CANNOT_BE_STRUCT => enums::extensible_enum_cannot_be_struct,
    d::EXTENSIBLE_ENUM_MUST_NOT_HAVE_VIRTUAL_MEMBERS => enums::extensible_enum_must_not_have_virtual_members,
    d::STATIC_PROPERTIES_ARE_NOT_ITEMS => members::static_properties_are_not_items,
    d::PRIMARY_CONSTRUCTOR_NOT_ALLOWED => declaration::primary_constructor_not_allowed,
    d::EXPLICIT_COMPARER_WITHOUT_EQUALITY_COMPARER => pairing::comparer_without_equality_comparer,
    d::EXPLICIT_EQUALITY_COMPARER_WITHOUT_COMPARER => pairing::equality_comparer_without_comparer,
    d::COMPARER_KEY_TYPE_MISMATCH => pairing::comparer_key_type_mismatch,
    d::OPERATORS_GENERATION_MISMATCH => pairing::operators_generation_mismatch,
    d::NON_DEFAULT_STRUCT_MEMBER_MUST_BE_REQUIRED => members::non_default_struct_member_must_be_required,
    d::ALLOW_DEFAULT_STRUCTS_WITH_NON_DEFAULT_MEMBERS => members::allow_default_structs_with_non_default_members,
    d::DEFAULT_INSTANCE_NOT_ALLOWED => usage::default_instance_not_allowed,
    d::DISPATCH_LAMBDA_MUST_BE_STATIC => usage::dispatch_lambda_must_be_static,
    d::INTERNAL_API_USAGE => usage::internal_api_usage,
    d::REGULAR_UNION_MUST_BE_CLASS_OR_RECORD => unions::regular_union_must_be_class_or_record,
    d::UNION_CASE_MUST_BE_SEALED_OR_PRIVATE => unions::union_case_must_be_sealed_or_private,
    d::INNER_TYPE_DOES_NOT_DERIVE_FROM_UNION => unions::inner_type_does_not_derive_from_union,
    d::AD_HOC_UNION_TYPES_MUST_BE_DISTINCT => unions::ad_hoc_union_types_must_be_distinct,
    d::MULTIPLE_FACTORIES_FOR_SERIALIZATION_FRAMEWORK => factories::multiple_factories_for_serialization,
    d::MULTIPLE_FACTORIES_FOR_ENTITY_FRAMEWORK => factories::multiple_factories_for_entity_framework,
    d::MULTIPLE_FACTORIES_FOR_MODEL_BINDING => factories::multiple_factories_for_model_binding,
    d::VALIDATE_METHOD_MISSING => factories::validate_method_missing,
    d::VALIDATE_METHOD_SIGNATURE_INVALID => factories::validate_method_signature_invalid,
    d::TO_VALUE_METHOD_MISSING => factories::to_value_method_missing,
    d::TO_VALUE_METHOD_SIGNATURE_INVALID => factories::to_value_method_signature_invalid,
    d::CORRESPONDING_CONSTRUCTOR_MISSING => factories::corresponding_constructor_missing,
    d::VALIDATION_ERROR_TYPE_MUST_IMPLEMENT_CONTRACT => factories::validation_error_type_must_implement_contract,
    d::USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_BE_PARTIAL => declaration::use_delegate_method_must_be_partial,
    d::USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_NOT_BE_GENERIC => declaration::use_delegate_method_must_not_be_generic,
}

/// The full catalogue in identifier order.
pub fn catalogue() -> &'static [Rule] {
    CATALOGUE
}

/// Runs `rules` against one declaration.
///
/// Declarations without a classification only get the usage rules, which
/// look at what the declaration's code does rather than what it is. Usage
/// rules run on every partial part; the rest only on the home part.
pub fn evaluate(ctx: &RuleContext<'_>, rules: &[Rule]) -> Vec<Diagnostic> {
    let declaration_rules = !ctx.classification.is_empty() && ctx.is_home_part();
    rules
        .iter()
        .filter(|rule| declaration_rules || usage::is_usage_rule(rule.id))
        .flat_map(|rule| {
            let found = (rule.check)(ctx);
            if !found.is_empty() {
                tracing::trace!(rule = rule.id, count = found.len(), declaration = ctx.name(), "rule fired");
            }
            found
        })
        .collect()
}

pub(crate) fn display_type(ctx: &RuleContext<'_>, ty: &crate::semantic::ResolvedType) -> String {
    ty.display(ctx.compilation.symbols()).to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::patterns::classify;

    /// Runs the whole catalogue over one source file and returns the
    /// diagnostics with id `id`.
    pub fn run(src: &str, id: &str) -> Vec<Diagnostic> {
        let c = Compilation::from_sources("App", &[("Test.cs", src)]);
        run_on(&c, id)
    }

    pub fn run_on(c: &Compilation, id: &str) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for type_id in c.current_types() {
            let classification = classify(c, type_id);
            let ctx = RuleContext::new(c, type_id, &classification);
            let rules: Vec<Rule> = catalogue().iter().copied().filter(|r| r.id == id).collect();
            out.extend(evaluate(&ctx, &rules));
        }
        out.sort_by_key(|d| d.location.span);
        out.dedup_by(|a, b| a.key() == b.key());
        out
    }

    pub fn args(diagnostics: &[Diagnostic]) -> Vec<Vec<String>> {
        diagnostics.iter().map(|d| d.args.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_covers_every_descriptor_once() {
        let ids: Vec<&str> = catalogue().iter().map(|r| r.id).collect();
        let expected: Vec<&str> = DESCRIPTORS.iter().map(|d| d.id).collect();
        assert_eq!(ids, expected);
    }
}
