use criterion::{criterion_group, criterion_main, Criterion};
use sandpen::document::render_document;
use sandpen::{Panes, Playground, PlaygroundConfig, Theme};

fn bench_render_document(c: &mut Criterion) {
    let panes = Panes::default();
    c.bench_function("render_document", |b| {
        b.iter(|| {
            let _ = render_document(&panes, Theme::Dark, Some("red"), 1, true);
        })
    });
}

fn bench_run_default_panes(c: &mut Criterion) {
    let mut playground = Playground::new(PlaygroundConfig::default());
    c.bench_function("run_default_panes", |b| {
        b.iter(|| {
            playground.run().expect("run failed");
        })
    });
}

criterion_group!(benches, bench_render_document, bench_run_default_panes);
criterion_main!(benches);
