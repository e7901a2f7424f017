//! Benchmarks for docfmt import and rule pipeline performance.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docfmt::{
    ConfigSource, ImportOptions, ImporterRegistry, Preset, ProcessOptions, Processor, RuleRegistry,
};

/// Create a Markdown source with the given number of sections.
fn create_test_markdown(sections: usize) -> String {
    let mut content = String::from("# Benchmark Report\n\n");

    for i in 0..sections {
        content.push_str(&format!("## Section {}\n\n", i + 1));
        content.push_str(
            "Body text with **bold**, *italic* and `code`. The energy is $E=mc^2$ here.\n\n",
        );
        content.push_str("$$\\frac{a}{b} + \\sqrt{x^2 + y^2}$$\n\n");
        content.push_str("- first item\n- second item\n\n");
        content.push_str("| Name | Value |\n|---|---|\n| alpha | 1 |\n| beta | 2 |\n\n");
    }

    content
}

/// Every built-in rule except the external diagram renderer.
fn bench_config() -> ConfigSource {
    let mut preset = Preset::from_registry(RuleRegistry::global());
    preset.rules.disable("mermaid_render");
    ConfigSource::from(preset)
}

/// Benchmark Markdown import at various sizes.
fn bench_markdown_import(c: &mut Criterion) {
    let registry = ImporterRegistry::with_defaults();
    let options = ImportOptions::default();
    let mut group = c.benchmark_group("markdown_import");

    for sections in [1, 10, 50].iter() {
        let source = create_test_markdown(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| {
                registry
                    .import_bytes(black_box(source.as_bytes()), "md", &options)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark the full pipeline: import, every rule, serialize.
fn bench_full_pipeline(c: &mut Criterion) {
    let processor = Processor::new();
    let config = bench_config();
    let options = ProcessOptions::default();
    let mut group = c.benchmark_group("full_pipeline");
    group.sample_size(20);

    for sections in [1, 10].iter() {
        let source = create_test_markdown(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| {
                processor
                    .process_bytes(black_box(source.as_bytes()), "bench.md", &config, &options)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark re-running the pipeline over an already formatted package.
fn bench_converged_rerun(c: &mut Criterion) {
    let processor = Processor::new();
    let config = bench_config();
    let options = ProcessOptions::default();
    let formatted = processor
        .process_bytes(create_test_markdown(10).as_bytes(), "bench.md", &config, &options)
        .unwrap()
        .bytes;

    c.bench_function("converged_rerun", |b| {
        b.iter(|| {
            processor
                .process_bytes(black_box(&formatted), "bench.docx", &config, &options)
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_markdown_import,
    bench_full_pipeline,
    bench_converged_rerun,
);
criterion_main!(benches);
