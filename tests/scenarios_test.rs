//! End-to-end scenarios: source in, diagnostics and rewritten source out.

mod common;

use common::{args_of, compile_one, fix_first, sequential_engine, with_id};
use indoc::indoc;
use patternlint::diagnostics::Severity;
use patternlint::fixes::{select_fix, FixStrategy};
use patternlint::rules::descriptors as d;
use pretty_assertions::assert_eq;

#[test]
fn readonly_field_is_reported_and_fixed() {
    let src = indoc! {"
        public partial class TestEnum : IValidatableEnum<string>
        {
            public static TestEnum Item1 = default;
        }
    "};
    let report = sequential_engine().analyze(&compile_one(src));
    let found = with_id(&report, d::FIELD_MUST_BE_READ_ONLY);
    assert_eq!(
        args_of(&found),
        vec![vec!["Item1".to_string(), "TestEnum".to_string()]]
    );
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(
        found[0].message,
        "The field 'Item1' of the type 'TestEnum' must be read-only"
    );

    let (_, text) = fix_first(src, d::FIELD_MUST_BE_READ_ONLY);
    assert_eq!(
        text,
        indoc! {"
            public partial class TestEnum : IValidatableEnum<string>
            {
                public static readonly TestEnum Item1 = default;
            }
        "}
    );
}

#[test]
fn operator_mismatch_raises_equality_operators() {
    let src = indoc! {"
        [SmartEnum<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads, EqualityComparisonOperators = OperatorsGeneration.Default)]
        public sealed partial class TestEnum
        {
            public static readonly TestEnum Item1 = default;
        }
    "};
    let report = sequential_engine().analyze(&compile_one(src));
    assert_eq!(
        args_of(&with_id(&report, d::OPERATORS_GENERATION_MISMATCH)),
        vec![vec![
            "TestEnum".to_string(),
            "DefaultWithKeyTypeOverloads".to_string(),
            "Default".to_string()
        ]]
    );

    let (fixed, text) = fix_first(src, d::OPERATORS_GENERATION_MISMATCH);
    assert!(text.contains(
        "[SmartEnum<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads, EqualityComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads)]"
    ));
    let after = sequential_engine().analyze(&fixed);
    assert!(with_id(&after, d::OPERATORS_GENERATION_MISMATCH).is_empty());
}

#[test]
fn default_struct_union_is_reported_but_comparisons_are_exempt() {
    let src = indoc! {"
        [Union<string, int>]
        public readonly partial struct TestUnion_struct_string_int { }

        public class Consumer
        {
            public void Do<T>()
            {
                TestUnion_struct_string_int testStruct = default;
                if (default(T) == default) { }
            }
        }
    "};
    let report = sequential_engine().analyze(&compile_one(src));
    assert_eq!(
        args_of(&with_id(&report, d::DEFAULT_INSTANCE_NOT_ALLOWED)),
        vec![vec!["TestUnion_struct_string_int".to_string()]]
    );

    let comparison_only = indoc! {"
        public class Consumer
        {
            public bool IsDefault<T>() => default(T) == default;
            public void Do<T>()
            {
                if (default(T) == default) { }
            }
        }
    "};
    let report = sequential_engine().analyze(&compile_one(comparison_only));
    assert!(with_id(&report, d::DEFAULT_INSTANCE_NOT_ALLOWED).is_empty());
}

#[test]
fn captured_variable_is_passed_as_state() {
    let src = indoc! {"
        [SmartEnum]
        public partial class TestEnum
        {
            public static readonly TestEnum Item1 = default;
            public static readonly TestEnum Item2 = default;
        }

        public class Consumer
        {
            public void Run(TestEnum testEnum)
            {
                var x = 42;
                testEnum.Switch(item1: () => { _ = x; }, item2: () => {});
            }
        }
    "};
    let engine = sequential_engine();
    let c = compile_one(src);
    let report = engine.analyze(&c);
    let lambdas = with_id(&report, d::DISPATCH_LAMBDA_MUST_BE_STATIC);
    assert!(!lambdas.is_empty());
    assert!(lambdas.iter().all(|x| x.severity == Severity::Warning));

    let applied = engine.apply(&c, lambdas[0]).unwrap();
    assert_eq!(applied.fix.strategy, FixStrategy::ClosureToState);
    let text = &applied.compilation.current_files()[0].text;
    assert!(
        text.contains("testEnum.Switch(state: x, item1: static state => { _ = state; }, item2: static state => {});"),
        "{text}"
    );

    let after = engine.analyze(&applied.compilation);
    assert!(with_id(&after, d::DISPATCH_LAMBDA_MUST_BE_STATIC).is_empty());
}

#[test]
fn conflicting_serialization_factories_are_reported_once_in_any_order() {
    let forward = indoc! {"
        [ValueObject<int>]
        [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
        [ObjectFactory<long>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
        public sealed partial class Amount { }
    "};
    let backward = indoc! {"
        [ValueObject<int>]
        [ObjectFactory<long>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
        [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
        public sealed partial class Amount { }
    "};
    for src in [forward, backward] {
        let report = sequential_engine().analyze(&compile_one(src));
        assert_eq!(
            args_of(&with_id(&report, d::MULTIPLE_FACTORIES_FOR_SERIALIZATION_FRAMEWORK)),
            vec![vec!["Amount".to_string(), "SystemTextJson".to_string()]]
        );
    }
}

#[test]
fn suppressed_diagnostics_are_counted_not_reported() {
    let src = indoc! {"
        public partial class TestEnum : IValidatableEnum<string>
        {
            // patternlint:ignore-next-line[TTRESG001]
            public static TestEnum Item1 = default;
            public static TestEnum Item2 = default;
        }
    "};
    let report = sequential_engine().analyze(&compile_one(src));
    assert_eq!(
        args_of(&with_id(&report, d::FIELD_MUST_BE_READ_ONLY)),
        vec![vec!["Item2".to_string(), "TestEnum".to_string()]]
    );
    assert_eq!(report.suppressions.total_suppressed, 1);
}

#[test]
fn marker_and_members_in_different_files() {
    let c = common::compile(&[
        ("A.cs", "[SmartEnum<int>]\npublic sealed partial class Level { }\n"),
        (
            "B.cs",
            indoc! {"
                public partial class Level
                {
                    public static Level Low = default;
                }
            "},
        ),
    ]);
    let engine = sequential_engine();
    let report = engine.analyze(&c);
    assert_eq!(report.declarations_classified, 1);
    let found = with_id(&report, d::FIELD_MUST_BE_READ_ONLY);
    assert_eq!(args_of(&found), vec![vec!["Low".to_string(), "Level".to_string()]]);
    assert!(found[0].path().ends_with("B.cs"));
    // the marker part is sealed, so the other part needs no modifier
    assert!(with_id(&report, d::TYPE_MUST_BE_SEALED).is_empty());
    assert!(with_id(&report, d::ENUM_HAS_NO_ITEMS).is_empty());

    let applied = engine.apply(&c, found[0]).unwrap();
    let text = applied
        .compilation
        .current_files()
        .iter()
        .find(|f| f.path.ends_with("B.cs"))
        .map(|f| f.text.clone())
        .unwrap();
    assert!(text.contains("public static readonly Level Low = default;"), "{text}");
    let after = engine.analyze(&applied.compilation);
    assert!(with_id(&after, d::FIELD_MUST_BE_READ_ONLY).is_empty());
}

#[test]
fn callback_writing_a_captured_local_is_reported_without_a_fix() {
    let src = indoc! {"
        [SmartEnum]
        public sealed partial class TestEnum
        {
            public static readonly TestEnum Item1 = default;
            public static readonly TestEnum Item2 = default;
        }

        public class Consumer
        {
            public int Run(TestEnum testEnum)
            {
                var count = 0;
                testEnum.Switch(item1: () => { count++; }, item2: static () => { });
                return count;
            }
        }
    "};
    let c = compile_one(src);
    let report = sequential_engine().analyze(&c);
    let lambdas = with_id(&report, d::DISPATCH_LAMBDA_MUST_BE_STATIC);
    assert_eq!(lambdas.len(), 1);
    assert!(select_fix(lambdas[0], &c).is_none());
}
