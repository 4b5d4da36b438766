//! Applying a fix and re-running the catalogue leaves no diagnostic with the
//! fixed id behind.

mod common;

use common::{compile_one, fix_first, sequential_engine, with_id};
use indoc::indoc;
use patternlint::fixes::select_fix;
use patternlint::rules::descriptors as d;

fn assert_fixed(src: &str, id: &str) {
    let before = sequential_engine().analyze(&compile_one(src));
    assert_eq!(with_id(&before, id).len(), 1, "fixture must report {id} once");

    let (fixed, text) = fix_first(src, id);
    let after = sequential_engine().analyze(&fixed);
    let remaining = with_id(&after, id);
    assert!(remaining.is_empty(), "{id} remains after fixing:\n{text}\n{remaining:#?}");
}

#[test]
fn readonly_field() {
    assert_fixed(
        indoc! {"
            public partial class TestEnum : IValidatableEnum<string>
            {
                public static TestEnum Item1 = default;
            }
        "},
        d::FIELD_MUST_BE_READ_ONLY,
    );
}

#[test]
fn missing_partial() {
    assert_fixed(
        indoc! {"
            [SmartEnum<int>]
            public sealed class TestEnum
            {
                public static readonly TestEnum Item1 = default;
            }
        "},
        d::TYPE_MUST_BE_PARTIAL,
    );
}

#[test]
fn missing_sealed() {
    assert_fixed(
        indoc! {"
            [ValueObject<int>]
            public partial class Amount
            {
            }
        "},
        d::TYPE_MUST_BE_SEALED,
    );
}

#[test]
fn missing_create_invalid_item() {
    assert_fixed(
        indoc! {"
            [SmartEnum<string>(IsValidatable = true)]
            public abstract partial class TestEnum
            {
                public static readonly TestEnum Item1 = default;
            }
        "},
        d::ABSTRACT_ENUM_MUST_IMPLEMENT_CREATE_INVALID_ITEM,
    );
}

#[test]
fn operators_mismatch() {
    assert_fixed(
        indoc! {"
            [SmartEnum<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads,
                            EqualityComparisonOperators = OperatorsGeneration.Default)]
            public sealed partial class TestEnum
            {
                public static readonly TestEnum Item1 = default;
            }
        "},
        d::OPERATORS_GENERATION_MISMATCH,
    );
}

#[test]
fn comparer_without_equality_comparer() {
    assert_fixed(
        indoc! {"
            [SmartEnum<string>]
            [KeyMemberComparer<ComparerAccessors.StringOrdinal, string>]
            public sealed partial class Color
            {
                public static readonly Color Red = default;
            }
        "},
        d::EXPLICIT_COMPARER_WITHOUT_EQUALITY_COMPARER,
    );
}

#[test]
fn non_default_member_becomes_required() {
    assert_fixed(
        indoc! {"
            [ValueObject<int>]
            public readonly partial struct Amount { }

            [ComplexValueObject]
            public sealed partial class Order
            {
                public Amount Total { get; init; }
            }
        "},
        d::NON_DEFAULT_STRUCT_MEMBER_MUST_BE_REQUIRED,
    );
}

#[test]
fn missing_validate_method() {
    assert_fixed(
        indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Range { }
        "},
        d::VALIDATE_METHOD_MISSING,
    );
}

#[test]
fn settable_property() {
    assert_fixed(
        indoc! {"
            [ValueObject<int>]
            public sealed partial class Amount
            {
                public int Cents { get; set; }
            }
        "},
        d::PROPERTY_MUST_BE_READ_ONLY,
    );
}

#[test]
fn internal_item() {
    assert_fixed(
        indoc! {"
            [SmartEnum<int>]
            public sealed partial class Level
            {
                internal static readonly Level Low = default;
                public static readonly Level High = default;
            }
        "},
        d::ENUM_ITEM_MUST_BE_PUBLIC,
    );
}

#[test]
fn public_constructor() {
    assert_fixed(
        indoc! {"
            [SmartEnum<int>]
            public sealed partial class Level
            {
                public static readonly Level Low = default;

                public Level(int key) { }
            }
        "},
        d::CONSTRUCTORS_MUST_BE_PRIVATE,
    );
}

#[test]
fn mutable_struct() {
    assert_fixed(
        indoc! {"
            [ValueObject<int>]
            public partial struct Amount
            {
            }
        "},
        d::STRUCT_MUST_BE_READ_ONLY,
    );
}

#[test]
fn unsealed_derived_type() {
    assert_fixed(
        indoc! {"
            [SmartEnum<string>]
            public abstract partial class Shape
            {
                public static readonly Shape Circle = default;

                private class RoundShape : Shape
                {
                    private RoundShape() { }
                }
            }
        "},
        d::DERIVED_TYPE_MUST_BE_SEALED,
    );
}

#[test]
fn equality_comparer_without_comparer() {
    assert_fixed(
        indoc! {"
            [ValueObject<string>]
            [KeyMemberEqualityComparer<ComparerAccessors.StringOrdinal, string>]
            public sealed partial class Name
            {
            }
        "},
        d::EXPLICIT_EQUALITY_COMPARER_WITHOUT_COMPARER,
    );
}

#[test]
fn non_static_callback() {
    assert_fixed(
        indoc! {"
            [SmartEnum]
            public sealed partial class TestEnum
            {
                public static readonly TestEnum Item1 = default;
                public static readonly TestEnum Item2 = default;
            }

            public class Consumer
            {
                public void Run(TestEnum testEnum)
                {
                    testEnum.Switch(item1: () => { }, item2: static () => { });
                }
            }
        "},
        d::DISPATCH_LAMBDA_MUST_BE_STATIC,
    );
}

#[test]
fn open_union_case() {
    assert_fixed(
        indoc! {"
            [Union]
            public abstract partial record Result
            {
                private Result() { }

                public sealed record Success(int Value) : Result;

                public record Failure : Result
                {
                    public Failure(string error) { }
                }
            }
        "},
        d::UNION_CASE_MUST_BE_SEALED_OR_PRIVATE,
    );
}

#[test]
fn invalid_validate_signature() {
    assert_fixed(
        indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>]
            public sealed partial class Range
            {
                public ValidationError? Validate(string? value, IFormatProvider? provider, out Range? item) => null;
            }
        "},
        d::VALIDATE_METHOD_SIGNATURE_INVALID,
    );
}

#[test]
fn missing_to_value_method() {
    assert_fixed(
        indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>(UseForModelBinding = true)]
            public sealed partial class Span
            {
            }
        "},
        d::TO_VALUE_METHOD_MISSING,
    );
}

#[test]
fn invalid_to_value_signature() {
    assert_fixed(
        indoc! {"
            [ComplexValueObject]
            [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
            public sealed partial class Range
            {
                public static string ToValue() => \"\";
            }
        "},
        d::TO_VALUE_METHOD_SIGNATURE_INVALID,
    );
}

#[test]
fn non_partial_delegate_method() {
    assert_fixed(
        indoc! {"
            [SmartEnum<int>]
            public sealed partial class Operation
            {
                public static readonly Operation Add = default;

                [UseDelegateFromConstructor]
                public int Apply(int a, int b);
            }
        "},
        d::USE_DELEGATE_FROM_CONSTRUCTOR_METHOD_MUST_BE_PARTIAL,
    );
}

#[test]
fn fixed_sources_have_no_fixable_diagnostics_left() {
    let src = indoc! {"
        [SmartEnum<string>]
        public class TestEnum
        {
            public static TestEnum Item1 = default;
            internal static readonly TestEnum Item2 = default;
        }
    "};
    let engine = sequential_engine();
    let c = compile_one(src);
    let run = engine.fix_all(&c);
    assert!(run.failures.is_empty(), "{:#?}", run.failures);
    assert!(!run.applied.is_empty());

    let after = engine.analyze(&run.compilation);
    assert!(after
        .diagnostics
        .iter()
        .all(|x| select_fix(x, &run.compilation).is_none()));

    let again = engine.fix_all(&run.compilation);
    assert!(again.applied.is_empty());
    assert!(again.changed_files(&run.compilation).is_empty());
}
