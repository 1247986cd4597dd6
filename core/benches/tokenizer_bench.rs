use criterion::{criterion_group, criterion_main, Criterion};
use docsearch_core::tokenizer::tokenize;

fn bench_tokenize(c: &mut Criterion) {
    let text = "Die Klage wird abgewiesen. Der Kläger trägt die Kosten des Verfahrens. ".repeat(200);
    c.bench_function("tokenize_paragraphs", |b| b.iter(|| tokenize(&text)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
