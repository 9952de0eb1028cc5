//! Benchmarks for diagram extraction and full parse cycles.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pumldown_config::{DiagramsConfig, MarkdownConfig};
use pumldown_diagrams::{DiagramBackend, DiagramErrorKind, DiagramOutput, PlaceholderExtractor};
use pumldown_document::{Document, markdown_pipeline};

struct StaticBackend;

impl DiagramBackend for StaticBackend {
    fn name(&self) -> &'static str {
        "static"
    }

    fn render(&self, _source: &str) -> Result<DiagramOutput, DiagramErrorKind> {
        Ok(DiagramOutput::Rendered(
            "<svg><rect width=\"10\" height=\"10\"/></svg>".to_owned(),
        ))
    }
}

/// Generate markdown with `sections` sections, each holding one diagram.
fn generate_markdown(sections: usize) -> String {
    let mut md = String::from("# Design Notes\n\n");
    for i in 0..sections {
        md.push_str(&format!("## Component {i}\n\n"));
        md.push_str("Some **bold** text, a [link](https://example.com) and `code` :rocket:.\n\n");
        md.push_str(&format!(
            "@startuml Component{i}\nactor User\nUser -> Service{i}: request\nService{i} --> User: response\n@enduml\n\n"
        ));
        md.push_str("| key | value |\n|-----|-------|\n| a | b |\n\n");
    }
    md
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let extractor = PlaceholderExtractor::plantuml();

    for sections in [1, 10, 100] {
        let markdown = generate_markdown(sections);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &markdown, |b, md| {
            b.iter(|| extractor.extract(black_box(md)));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let pipeline = Arc::new(markdown_pipeline(MarkdownConfig {
        line_markers: true,
        emoji: true,
        front_matter: true,
    }));
    let diagrams = DiagramsConfig {
        cache_enabled: false,
        ..DiagramsConfig::default()
    };

    for sections in [1, 10, 50] {
        let markdown = generate_markdown(sections);
        let revision = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&revision);
        // Append a revision comment so every parse does real work
        let mut doc = Document::new(
            move || {
                let n = counter.fetch_add(1, Ordering::Relaxed);
                format!("{markdown}<!-- rev {n} -->")
            },
            Arc::clone(&pipeline),
            diagrams.clone(),
        )
        .with_backend(Arc::new(StaticBackend));

        group.bench_function(BenchmarkId::from_parameter(sections), |b| {
            b.iter(|| doc.parse());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_parse);
criterion_main!(benches);
