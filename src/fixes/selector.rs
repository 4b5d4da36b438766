//! Maps a diagnostic to the rewrite that resolves it.

use super::accessors::make_read_only;
use super::attributes::{insert_comparer_counterpart, raise_equality_operators};
use super::closures::closure_to_state;
use super::modifiers::{insert_modifier, set_accessibility};
use super::stubs::{append_method, create_invalid_item_signature};
use super::{FixEdit, FixStrategy, TextEdit};
use crate::diagnostics::Diagnostic;
use crate::patterns::OperatorsGeneration;
use crate::rules::descriptors as d;
use crate::semantic::{Compilation, TypeId};
use crate::shape::{self, mutable_accessor, Accessibility};
use crate::syntax::ast::{Member, ModifierKind, TypeDecl};
use crate::syntax::SourceFile;

/// The fix for `diagnostic`, or `None` when its id has no rewrite or the
/// offending node's shape does not allow one.
pub fn select_fix(diagnostic: &Diagnostic, compilation: &Compilation) -> Option<FixEdit> {
    let id = target_declaration(diagnostic, compilation)?;
    let symbols = compilation.symbols();
    let decl = symbols.decl(id);
    let file = symbols.source_of(id);
    let node = diagnostic.node_span;
    let text = file.text.as_str();

    let (strategy, title, edits): (FixStrategy, String, Vec<TextEdit>) = match diagnostic.id {
        d::FIELD_MUST_BE_READ_ONLY => {
            let field = decl.fields().find(|f| f.span == node)?;
            if field.has_modifier(ModifierKind::Const) || field.has_modifier(ModifierKind::Volatile) {
                return None;
            }
            let edit = insert_modifier(&field.modifiers, field.ty.span.start, ModifierKind::Readonly)?;
            (FixStrategy::ModifierEdit, "Make field read-only".into(), vec![edit])
        }
        d::PROPERTY_MUST_BE_READ_ONLY => {
            let property = decl.properties().find(|p| p.span == node)?;
            let edits = make_read_only(text, property)?;
            (FixStrategy::AccessorEdit, "Make property read-only".into(), edits)
        }
        d::TYPE_MUST_BE_PARTIAL => {
            let edit = insert_modifier(&decl.modifiers, decl.keyword_span.start, ModifierKind::Partial)?;
            (FixStrategy::ModifierEdit, "Make the type partial".into(), vec![edit])
        }
        d::ENUM_ITEM_MUST_BE_PUBLIC => {
            let field = decl.fields().find(|f| f.span == node)?;
            let edits = set_accessibility(text, &field.modifiers, field.ty.span.start, ModifierKind::Public);
            (FixStrategy::ModifierEdit, "Make the item public".into(), edits)
        }
        d::CONSTRUCTORS_MUST_BE_PRIVATE => {
            let ctor = decl.constructors().find(|c| c.span == node)?;
            // nested derived types would lose access
            let has_derived = compilation
                .parts(id)
                .into_iter()
                .any(|part| !compilation.derived_types(part).is_empty());
            if has_derived {
                return None;
            }
            let edits = set_accessibility(text, &ctor.modifiers, ctor.name.span.start, ModifierKind::Private);
            (FixStrategy::ModifierEdit, "Make the constructor private".into(), edits)
        }
        d::STRUCT_MUST_BE_READ_ONLY => {
            let edit = insert_modifier(&decl.modifiers, decl.keyword_span.start, ModifierKind::Readonly)?;
            (FixStrategy::ModifierEdit, "Make the struct read-only".into(), vec![edit])
        }
        d::TYPE_MUST_BE_SEALED | d::DERIVED_TYPE_MUST_BE_SEALED => {
            if has_non_private_constructor(compilation, id) {
                return None;
            }
            (FixStrategy::ModifierEdit, "Seal the type".into(), seal(decl)?)
        }
        d::UNION_CASE_MUST_BE_SEALED_OR_PRIVATE => {
            (FixStrategy::ModifierEdit, "Seal the union case".into(), seal(decl)?)
        }
        d::ABSTRACT_ENUM_MUST_IMPLEMENT_CREATE_INVALID_ITEM => {
            let [name, key] = diagnostic.args.as_slice() else {
                return None;
            };
            let edit = append_method(file, decl, &create_invalid_item_signature(name, key))?;
            (FixStrategy::MemberStub, "Implement 'CreateInvalidItem'".into(), vec![edit])
        }
        d::EXPLICIT_COMPARER_WITHOUT_EQUALITY_COMPARER | d::EXPLICIT_EQUALITY_COMPARER_WITHOUT_COMPARER => {
            let edit = insert_comparer_counterpart(file, decl, diagnostic.location.span)?;
            let title = if diagnostic.id == d::EXPLICIT_COMPARER_WITHOUT_EQUALITY_COMPARER {
                "Add the matching equality comparer"
            } else {
                "Add the matching comparer"
            };
            (FixStrategy::AttributeEdit, title.into(), vec![edit])
        }
        d::OPERATORS_GENERATION_MISMATCH => {
            let level = OperatorsGeneration::parse(diagnostic.args.get(1)?)?;
            let edit = raise_equality_operators(file, decl, node, level)?;
            let title = format!("Generate equality operators with '{}'", level.as_str());
            (FixStrategy::AttributeEdit, title, vec![edit])
        }
        d::NON_DEFAULT_STRUCT_MEMBER_MUST_BE_REQUIRED => {
            let edit = make_required(decl, node)?;
            (FixStrategy::ModifierEdit, "Make the member required".into(), vec![edit])
        }
        d::DISPATCH_LAMBDA_MUST_BE_STATIC => {
            let fix = closure_to_state(compilation, id, file, decl, node)?;
            let title = match fix.strategy {
                FixStrategy::ClosureToState => "Pass captured variables as state",
                _ => "Make the callback static",
            };
            (fix.strategy, title.into(), fix.edits)
        }
        d::VALIDATE_METHOD_MISSING
        | d::VALIDATE_METHOD_SIGNATURE_INVALID
        | d::TO_VALUE_METHOD_MISSING
        | d::TO_VALUE_METHOD_SIGNATURE_INVALID => {
            let signature = diagnostic.args.get(1)?;
            let edit = append_method(file, decl, signature)?;
            (FixStrategy::MemberStub, format!("Add '{signature}'"), vec![edit])
        }
        d::USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_BE_PARTIAL => {
            let method = decl.methods().find(|m| m.span == node)?;
            let edit = insert_modifier(&method.modifiers, method.return_type.span.start, ModifierKind::Partial)?;
            (FixStrategy::ModifierEdit, "Make the method partial".into(), vec![edit])
        }
        _ => return None,
    };

    if edits.is_empty() {
        return None;
    }
    tracing::debug!(
        diagnostic = diagnostic.id,
        strategy = %strategy,
        edits = edits.len(),
        "selected fix"
    );
    Some(FixEdit::new(file.path.clone(), diagnostic.id, strategy, title, decl.span).with_edits(edits))
}

/// The declaration a fix for `diagnostic` edits.
///
/// Factory method findings may sit in another part; their node is the
/// pattern declaration itself, which is matched by span and name.
fn target_declaration(diagnostic: &Diagnostic, compilation: &Compilation) -> Option<TypeId> {
    let symbols = compilation.symbols();
    let node = diagnostic.node_span;

    if matches!(
        diagnostic.id,
        d::VALIDATE_METHOD_MISSING
            | d::VALIDATE_METHOD_SIGNATURE_INVALID
            | d::TO_VALUE_METHOD_MISSING
            | d::TO_VALUE_METHOD_SIGNATURE_INVALID
    ) {
        let name = diagnostic.args.first()?;
        let candidates: Vec<TypeId> = compilation
            .current_types()
            .filter(|id| {
                let decl = symbols.decl(*id);
                decl.span == node && &decl.name.text == name
            })
            .collect();
        return candidates
            .iter()
            .copied()
            .find(|id| symbols.source_of(*id).path() == diagnostic.path())
            .or_else(|| candidates.first().copied());
    }

    let file = compilation.file_id(diagnostic.path())?;
    compilation
        .current_types()
        .filter(|id| symbols.get(*id).file == file)
        .filter(|id| symbols.decl(*id).span.contains(node))
        .min_by_key(|id| symbols.decl(*id).span.len())
}

/// Any explicit constructor in any part that is not private.
fn has_non_private_constructor(compilation: &Compilation, id: TypeId) -> bool {
    compilation.parts(id).into_iter().any(|part| {
        shape::constructors(compilation.symbols().decl(part), false)
            .iter()
            .any(|c| c.accessibility != Accessibility::Private)
    })
}

fn seal(decl: &TypeDecl) -> Option<Vec<TextEdit>> {
    if decl.has_modifier(ModifierKind::Abstract) || decl.has_modifier(ModifierKind::Static) {
        return None;
    }
    insert_modifier(&decl.modifiers, decl.keyword_span.start, ModifierKind::Sealed).map(|e| vec![e])
}

/// `required` needs a settable member: no read-only or const fields, and
/// properties need a `set` or `init` accessor.
fn make_required(decl: &TypeDecl, node: crate::common::Span) -> Option<TextEdit> {
    match decl.members.iter().find(|m| m.span() == node)? {
        Member::Field(f) => {
            if f.has_modifier(ModifierKind::Readonly) || f.has_modifier(ModifierKind::Const) {
                return None;
            }
            insert_modifier(&f.modifiers, f.ty.span.start, ModifierKind::Required)
        }
        Member::Property(p) => {
            mutable_accessor(p)?;
            insert_modifier(&p.modifiers, p.ty.span.start, ModifierKind::Required)
        }
        _ => None,
    }
}

/// Text of the file a fix applies to, for callers that only hold the
/// diagnostic.
pub fn fix_source<'a>(fix: &FixEdit, compilation: &'a Compilation) -> Option<&'a SourceFile> {
    let file = compilation.file_id(&fix.path)?;
    Some(compilation.symbols().file(file).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::apply_edits;
    use crate::patterns::classify;
    use crate::rules::{catalogue, evaluate, RuleContext};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn diagnostics(c: &Compilation, id: &str) -> Vec<Diagnostic> {
        let rules: Vec<_> = catalogue().iter().copied().filter(|r| r.id == id).collect();
        c.current_types()
            .flat_map(|type_id| {
                let classification = classify(c, type_id);
                let ctx = RuleContext::new(c, type_id, &classification);
                evaluate(&ctx, &rules)
            })
            .collect()
    }

    fn fixed(src: &str, id: &str) -> Option<String> {
        let c = Compilation::from_sources("App", &[("Test.cs", src)]);
        let found = diagnostics(&c, id);
        let diagnostic = found.first().expect("expected a diagnostic");
        let fix = select_fix(diagnostic, &c)?;
        let file = fix_source(&fix, &c).unwrap();
        Some(apply_edits(&file.text, &fix.edits, id).unwrap())
    }

    #[test]
    fn readonly_field_fix() {
        let src = indoc! {"
            public partial class TestEnum : IValidatableEnum<string>
            {
                public static TestEnum Item1 = default;
            }
        "};
        let out = fixed(src, d::FIELD_MUST_BE_READ_ONLY).unwrap();
        assert!(out.contains("public static readonly TestEnum Item1 = default;"));
    }

    #[test]
    fn operators_mismatch_raises_equality() {
        let src = indoc! {"
            [SmartEnum<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads,
                            EqualityComparisonOperators = OperatorsGeneration.Default)]
            public sealed partial class TestEnum
            {
                public static readonly TestEnum Item1 = default;
            }
        "};
        let out = fixed(src, d::OPERATORS_GENERATION_MISMATCH).unwrap();
        assert!(out.contains("EqualityComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads)]"));
    }

    #[test]
    fn partial_is_inserted_before_the_keyword() {
        let src = indoc! {"
            [SmartEnum<int>]
            public sealed class TestEnum
            {
                public static readonly TestEnum Item1 = default;
            }
        "};
        let out = fixed(src, d::TYPE_MUST_BE_PARTIAL).unwrap();
        assert!(out.contains("public sealed partial class TestEnum"));
    }

    #[test]
    fn sealing_is_withheld_with_public_constructors() {
        let src = indoc! {"
            [ValueObject<int>]
            public partial class Amount
            {
                public Amount(int value) { }
            }
        "};
        assert_eq!(fixed(src, d::TYPE_MUST_BE_SEALED), None);

        let src = indoc! {"
            [ValueObject<int>]
            public partial class Amount
            {
            }
        "};
        let out = fixed(src, d::TYPE_MUST_BE_SEALED).unwrap();
        assert!(out.contains("public sealed partial class Amount"));
    }

    #[test]
    fn missing_create_invalid_item_gets_a_stub() {
        let src = indoc! {"
            [SmartEnum<string>(IsValidatable = true)]
            public abstract partial class TestEnum
            {
                public static readonly TestEnum Item1 = default;
            }
        "};
        let out = fixed(src, d::ABSTRACT_ENUM_MUST_IMPLEMENT_CREATE_INVALID_ITEM).unwrap();
        assert!(out.contains("private static TestEnum CreateInvalidItem(string key)"));
        assert!(out.contains("throw new System.NotImplementedException();"));
    }

    #[test]
    fn ids_without_a_rewrite_get_none() {
        let src = indoc! {"
            [SmartEnum<int>]
            public sealed partial class Empty { }
        "};
        assert_eq!(fixed(src, d::ENUM_HAS_NO_ITEMS), None);
    }
}
