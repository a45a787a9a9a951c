//! Benchmarks for Markdown conversion and the preview render step.

use std::path::Path;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use livemark::document::{Convert, MarkdownConverter};
use livemark::preview::{DocumentSource, PreviewPipeline, PreviewSurface};
use livemark::theme::{Stylesheets, Theme};

struct Text(&'static str);

impl DocumentSource for Text {
    fn current_text(&self) -> String {
        self.0.to_string()
    }

    fn current_path(&self) -> Option<&Path> {
        None
    }
}

struct Discard;

impl PreviewSurface for Discard {
    fn set_base_path(&mut self, _base: &Path) {}

    fn set_html(&mut self, html: &str) -> std::io::Result<()> {
        black_box(html);
        Ok(())
    }
}

fn bench_convert_simple(c: &mut Criterion) {
    let converter = MarkdownConverter::new();
    let md = "# Hello\n\n- [x] World";
    c.bench_function("convert_simple", |b| {
        b.iter(|| converter.convert(black_box(md)).unwrap())
    });
}

fn bench_convert_sample(c: &mut Criterion) {
    let converter = MarkdownConverter::new();
    let md = include_str!("../tests/fixtures/sample.md");
    c.bench_function("convert_sample", |b| {
        b.iter(|| converter.convert(black_box(md)).unwrap())
    });
}

fn bench_render_now(c: &mut Criterion) {
    let doc = Text(include_str!("../tests/fixtures/sample.md"));
    let mut pipeline = PreviewPipeline::new(Stylesheets::bundled(), Theme::Dark, 300);
    let mut surface = Discard;
    c.bench_function("render_now_sample", |b| {
        b.iter(|| pipeline.render_now(&doc, &mut surface).unwrap())
    });
}

criterion_group!(
    benches,
    bench_convert_simple,
    bench_convert_sample,
    bench_render_now
);
criterion_main!(benches);
