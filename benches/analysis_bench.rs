//! Benchmarks for catalogue evaluation, sequential versus on the rayon pool,
//! and for a full fix run.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use patternlint::config::PatternLintConfig;
use patternlint::engine::Engine;
use patternlint::semantic::Compilation;
use std::hint::black_box;

/// One smart enum, one value object and one consumer per file.
fn create_sources(num_files: usize) -> Vec<(String, String)> {
    (0..num_files)
        .map(|i| {
            let text = format!(
                r#"
[SmartEnum<string>]
public partial class Status{i}
{{
    public static readonly Status{i} Active = default;
    public static Status{i} Inactive = default;
}}

[ValueObject<int>]
public partial struct Amount{i}
{{
    public int Extra {{ get; set; }}
}}

public class Consumer{i}
{{
    public int Run(Status{i} status, int factor)
    {{
        Amount{i} amount = default;
        return status.Switch(active: () => factor, inactive: () => factor * 2);
    }}
}}
"#
            );
            (format!("File{i}.cs"), text)
        })
        .collect()
}

fn compile(sources: &[(String, String)]) -> Compilation {
    let borrowed: Vec<(&str, &str)> = sources.iter().map(|(p, t)| (p.as_str(), t.as_str())).collect();
    Compilation::from_sources("Bench", &borrowed)
}

fn engine(parallel: bool) -> Engine {
    let mut config = PatternLintConfig::default();
    config.analysis.parallel = parallel;
    Engine::new(config)
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for &size in &[5, 25, 100] {
        let compilation = compile(&create_sources(size));
        group.throughput(Throughput::Elements(size as u64));
        for (label, parallel) in [("sequential", false), ("parallel", true)] {
            let engine = engine(parallel);
            group.bench_with_input(BenchmarkId::new(label, size), &compilation, |b, compilation| {
                b.iter(|| black_box(engine.analyze(compilation)));
            });
        }
    }

    group.finish();
}

fn benchmark_fix_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("fix_all");
    group.sample_size(10);

    for &size in &[5, 25] {
        let compilation = compile(&create_sources(size));
        let engine = engine(true);
        group.bench_with_input(BenchmarkId::from_parameter(size), &compilation, |b, compilation| {
            b.iter(|| black_box(engine.fix_all(compilation)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_analysis, benchmark_fix_all);
criterion_main!(benches);
