//! Property tests over the rule catalogue and the parser.

mod common;

use common::{compile, compile_one, fingerprint, sequential_engine};
use indoc::indoc;
use patternlint::diagnostics::{Diagnostic, Severity};
use patternlint::engine::Engine;
use patternlint::patterns::classify;
use patternlint::rules::descriptors as d;
use patternlint::rules::{catalogue, evaluate, Rule, RuleContext};
use patternlint::semantic::{Assembly, Compilation, CompilationOptions};
use patternlint::syntax::SourceFile;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

const MIXED: &str = indoc! {"
    [SmartEnum<string>]
    public class TestEnum
    {
        public static TestEnum Item1 = default;
        internal static readonly TestEnum Item2 = default;
        public TestEnum(string key) { }
    }

    [ValueObject<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads)]
    public struct Amount
    {
        public int Value { get; set; }
    }

    [ComplexValueObject]
    [ObjectFactory<string>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
    [ObjectFactory<long>(UseForSerialization = SerializationFrameworks.SystemTextJson)]
    public partial class Range
    {
        public Amount Lower { get; init; }
    }

    [Union<string, int>]
    public partial struct TextOrNumber { }

    public class Consumer
    {
        public void Run(TestEnum testEnum)
        {
            var x = 1;
            Amount a = default;
            testEnum.Switch(item1: () => x, item2: () => 2);
        }
    }
"};

fn evaluate_in_order(c: &Compilation, order: &[usize]) -> Vec<Diagnostic> {
    let all = catalogue();
    let rules: Vec<Rule> = order.iter().map(|i| all[*i]).collect();
    c.current_types()
        .flat_map(|id| {
            let classification = classify(c, id);
            let ctx = RuleContext::new(c, id, &classification);
            evaluate(&ctx, &rules)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn rule_order_does_not_change_the_diagnostics(
        order in Just((0..catalogue().len()).collect::<Vec<usize>>()).prop_shuffle()
    ) {
        let c = compile_one(MIXED);
        let natural: Vec<usize> = (0..catalogue().len()).collect();
        prop_assert_eq!(
            fingerprint(&evaluate_in_order(&c, &order)),
            fingerprint(&evaluate_in_order(&c, &natural))
        );
    }

    #[test]
    fn file_order_does_not_change_the_report(reverse in any::<bool>(), rotate in 0usize..3) {
        let mut files = vec![
            ("Enum.cs", "[SmartEnum<int>] public class Level { public static Level Low = default; }"),
            ("Amount.cs", "[ValueObject<int>] public struct Amount { public int Value { get; set; } }"),
            ("Consumer.cs", "public class Consumer { public void Run() { Amount a = default; } }"),
        ];
        files.rotate_left(rotate);
        if reverse {
            files.reverse();
        }
        let report = sequential_engine().analyze(&compile(&files));
        let baseline = sequential_engine().analyze(&compile(&[
            ("Amount.cs", files.iter().find(|f| f.0 == "Amount.cs").map(|f| f.1).unwrap_or_default()),
            ("Consumer.cs", files.iter().find(|f| f.0 == "Consumer.cs").map(|f| f.1).unwrap_or_default()),
            ("Enum.cs", files.iter().find(|f| f.0 == "Enum.cs").map(|f| f.1).unwrap_or_default()),
        ]));
        prop_assert_eq!(report.diagnostics, baseline.diagnostics);
    }

    #[test]
    fn unmarked_declarations_are_never_classified(
        name in "[A-Z][a-z]{2,8}",
        field in "[a-z]{2,8}",
        is_struct in any::<bool>(),
    ) {
        let kind = if is_struct { "struct" } else { "class" };
        let src = format!(
            "public {kind} {name}Model\n{{\n    public static {name}Model _{field} = default;\n    public int _{field}Count {{ get; set; }}\n    public {name}Model(int value) {{ }}\n}}\n"
        );
        let c = compile_one(&src);
        for id in c.current_types() {
            prop_assert!(classify(&c, id).primary.is_none());
        }
        let report = sequential_engine().analyze(&c);
        prop_assert!(report.diagnostics.is_empty(), "{:#?}", report.diagnostics);
        prop_assert_eq!(report.declarations_classified, 0);
    }

    #[test]
    fn parser_and_engine_survive_arbitrary_fragments(
        fragments in prop::collection::vec(
            prop::sample::select(vec![
                "class", "struct", "partial", "public", "static", "readonly", "{", "}", "(", ")",
                "[SmartEnum<int>]", "[Union<string, int>]", "[ValueObject<int>]", "Foo", "Bar",
                "=", ";", "=>", ",", "<", ">", "\"text", "'c'", "// note\n", "/*", "*/", "@",
                "#pragma warning disable TTRESG001\n", "default", "new", "1.5", "$\"x{", "?", ".",
                "\n", " ",
            ]),
            0..60,
        )
    ) {
        let src = fragments.join(" ");
        let c = compile_one(&src);
        let _ = sequential_engine().analyze(&c);
    }
}

#[test]
fn direct_read_only_violations_are_errors_and_inherited_ones_warnings() {
    let direct = compile_one(indoc! {"
        public partial class TestEnum : IValidatableEnum<string>
        {
            public static TestEnum Item1 = default;
            public int Counter;
        }
    "});
    let report = sequential_engine().analyze(&direct);
    let fields: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|x| x.id == d::FIELD_MUST_BE_READ_ONLY)
        .collect();
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().all(|x| x.severity == Severity::Error));

    let base = Arc::new(SourceFile::parse(
        "Base.cs",
        indoc! {"
            namespace Lib;
            public class EnumBase
            {
                public int Counter;
            }
        "},
    ));
    let current = Arc::new(SourceFile::parse(
        "Test.cs",
        indoc! {"
            using Lib;
            public partial class TestEnum : EnumBase, IValidatableEnum<string>
            {
                public static readonly TestEnum Item1 = default;
            }
        "},
    ));
    let inherited = Compilation::new(
        Assembly::new("App", vec![current]),
        vec![Assembly::new("Lib", vec![base])],
        CompilationOptions::default(),
    );
    let report = sequential_engine().analyze(&inherited);
    let fields: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|x| x.id == d::FIELD_MUST_BE_READ_ONLY)
        .collect();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].args, vec!["Counter".to_string(), "EnumBase".to_string()]);
    assert_eq!(fields[0].severity, Severity::Warning);
}

#[test]
fn parallel_evaluation_matches_sequential() {
    let c = compile_one(MIXED);
    let parallel = Engine::default().analyze(&c);
    let sequential = sequential_engine().analyze(&c);
    assert_eq!(parallel.diagnostics, sequential.diagnostics);
    assert!(!parallel.diagnostics.is_empty());
}
