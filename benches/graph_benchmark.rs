//! Benchmarks for graph building and resolution.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic result pages shaped like form analysis
//! output: one PAGE block, LINE and WORD blocks, and KEY/VALUE containers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use untextract::{Block, BlockGraph, ResultPage};

/// Creates result pages with `fields` form fields spread over `pages` pages.
fn create_form_pages(pages: usize, fields: usize) -> Vec<ResultPage> {
    let per_page = fields / pages.max(1);
    let mut result = Vec::with_capacity(pages);

    for p in 0..pages {
        let mut blocks = Vec::with_capacity(per_page * 6 + 1);
        let mut page_children = Vec::with_capacity(per_page);

        for f in 0..per_page {
            let id = format!("{}-{}", p, f);
            let key = format!("k{}", id);
            let value = format!("v{}", id);
            let line = format!("l{}", id);
            let words = [format!("kw{}", id), format!("vw{}", id)];

            page_children.push(line.clone());
            blocks.push(
                Block::line(line.as_str(), format!("Field {} value {}", id, f))
                    .with_children(words.iter().map(String::as_str)),
            );
            blocks.push(
                Block::key(key.as_str())
                    .with_values([value.as_str()])
                    .with_children([words[0].as_str()]),
            );
            blocks.push(Block::value(value.as_str()).with_children([words[1].as_str()]));
            blocks.push(Block::word(words[0].as_str(), format!("Field {}", id)));
            blocks.push(Block::word(words[1].as_str(), format!("value {}", f)));
        }

        blocks.insert(
            0,
            Block::new(format!("page-{}", p), untextract::BlockType::Page)
                .with_children(page_children)
                .on_page(p as u32 + 1),
        );
        result.push(ResultPage::with_blocks(blocks));
    }

    result
}

/// Benchmark graph construction at various sizes.
fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for fields in [10, 100, 1000].iter() {
        let pages = create_form_pages(4, *fields);

        group.bench_function(format!("{}_fields", fields), |b| {
            b.iter(|| BlockGraph::build(black_box(pages.clone())));
        });
    }

    group.finish();
}

/// Benchmark key/value pairing.
fn bench_extract_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_pairs");

    for fields in [10, 100, 1000].iter() {
        let graph = BlockGraph::build(create_form_pages(4, *fields));

        group.bench_function(format!("{}_fields", fields), |b| {
            b.iter(|| untextract::graph::extract_pairs(black_box(&graph)));
        });
    }

    group.finish();
}

/// Benchmark line text flattening.
fn bench_line_texts(c: &mut Criterion) {
    let graph = BlockGraph::build(create_form_pages(4, 1000));

    c.bench_function("line_texts_1000", |b| {
        b.iter(|| black_box(&graph).line_texts());
    });

    c.bench_function("resolve_page_text", |b| {
        b.iter(|| {
            let page = graph.lookup("page-0").unwrap();
            untextract::resolve_text(black_box(&graph), page)
        });
    });
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_extract_pairs,
    bench_line_texts,
);
criterion_main!(benches);
