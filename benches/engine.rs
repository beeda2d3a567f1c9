//! Engine benchmarks: tokenization, index build, lookups and selection growth.
//!
//! # Usage
//!
//! ```bash
//! cargo bench --bench engine
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tagspan::{tokenize, Annotation, AnnotationStore, Selection, Span};

const SENTENCE: &str =
    "Marie Curie met Pierre Curie in Paris, France, in 1894.\tThey married a year later.\n";

fn document(sentences: usize) -> String {
    SENTENCE.repeat(sentences)
}

/// One annotation on every fifth word run, two tokens wide where possible.
fn annotations_for(text: &str) -> Vec<Annotation> {
    let tokens = tokenize(text);
    tokens
        .iter()
        .step_by(5)
        .filter_map(|t| {
            let end = tokens.get(t.index() + 2).map_or(t.end(), |n| n.end());
            Annotation::new(Span::new(t.start(), end), "ENT").ok()
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for sentences in [10, 100, 1000] {
        let text = document(sentences);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sentences), &text, |b, text| {
            b.iter(|| tokenize(black_box(text)));
        });
    }
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_tokens_and_annotations");
    for sentences in [10, 100, 1000] {
        let text = document(sentences);
        let tokens = tokenize(&text);
        let annotations = annotations_for(&text);
        group.throughput(Throughput::Elements(annotations.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(sentences),
            &(tokens, annotations),
            |b, (tokens, annotations)| {
                b.iter(|| {
                    let mut store = AnnotationStore::new();
                    store
                        .set_tokens_and_annotations(tokens.clone(), annotations.clone())
                        .unwrap();
                    black_box(store.len())
                });
            },
        );
    }
    group.finish();
}

fn bench_lookups(c: &mut Criterion) {
    let text = document(1000);
    let mut store = AnnotationStore::with_tokens(tokenize(&text));
    store.set_annotations(annotations_for(&text)).unwrap();
    let n = store.tokens().len();

    c.bench_function("annotations_touching", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 7) % n;
            black_box(store.annotations_touching(i).len())
        });
    });

    c.bench_function("add_or_update_existing", |b| {
        let existing = store.annotations()[store.len() / 2].clone();
        b.iter(|| black_box(store.add(&existing).unwrap()));
    });
}

fn bench_selection(c: &mut Criterion) {
    let text = "word ".repeat(200) + &" ".repeat(200) + "end";
    let store = AnnotationStore::with_tokens(tokenize(&text));
    let last = store.tokens()[store.tokens().len() - 1].clone();
    let first = store.tokens()[store.tokens().len() - 203].clone();

    c.bench_function("selection_jump_200_spaces", |b| {
        b.iter(|| {
            let mut selection = Selection::default();
            selection.start(&first);
            if selection.can_add(&store, &last) {
                selection.add(&store, &last);
            }
            black_box(selection.len())
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_index_build,
    bench_lookups,
    bench_selection
);
criterion_main!(benches);
