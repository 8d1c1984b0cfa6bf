#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use rust_bitranslator::pipelines::segmentation::{chunk_text, segment, DEFAULT_MAX_CHUNK_CHARS};

fn create_long_text(sentences: usize) -> String {
    let english = [
        "The quick brown fox jumps over the lazy dog.",
        "Did the dog wake up?",
        "No, it kept sleeping under the old oak tree!",
    ];
    let chinese = ["今天天气很好。", "我们去公园散步吧！", "你觉得怎么样？"];
    (0..sentences)
        .map(|index| {
            if index % 2 == 0 {
                english[index % english.len()]
            } else {
                chinese[index % chinese.len()]
            }
        })
        .collect::<Vec<&str>>()
        .join(" ")
}

fn bench_segmentation(c: &mut Criterion) {
    let short_text = create_long_text(10);
    let long_text = create_long_text(5000);

    c.bench_function("Segment short text", |b| {
        b.iter(|| black_box(segment(&short_text).count()))
    });

    c.bench_function("Segment long text", |b| {
        b.iter(|| black_box(segment(&long_text).count()))
    });

    c.bench_function("Chunk long text", |b| {
        b.iter(|| black_box(chunk_text(&long_text, DEFAULT_MAX_CHUNK_CHARS)))
    });
}

criterion_group! {
name = benches;
config = Criterion::default().sample_size(20);
targets = bench_segmentation
}

criterion_main!(benches);
