//! Criterion benchmarks for vulnpair-core.
//!
//! ## Benchmark groups
//!
//! 1. **extraction**: parse + extract a synthetic C file.
//! 2. **similarity**: full ratio vs. the bounded check on function-sized text.
//! 3. **callgraph**: callee/caller map construction over many records.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/vulnpair-core/Cargo.toml
//! cargo bench --manifest-path crates/vulnpair-core/Cargo.toml -- similarity
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use _vulnpair_core::chunker::extract::extract_unit;
use _vulnpair_core::chunker::languages::Language;
use _vulnpair_core::chunker::parser::{parse_bytes, ParsedUnit};
use _vulnpair_core::matcher::callgraph::build_maps;
use _vulnpair_core::matcher::similarity::{exceeds, ratio};
use _vulnpair_core::models::FunctionRecord;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn synthetic_c(functions: usize) -> String {
    let mut source = String::from("#include <string.h>\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            "static int handler_{i}(char *buf, int len) {{\n    if (len > {i}) {{\n        memcpy(buf, scratch, len);\n        return handler_{next}(buf, len - 1);\n    }}\n    return check_{i}(buf);\n}}\n\n",
            next = (i + 1) % functions
        ));
    }
    source
}

fn synthetic_records(n: usize) -> Vec<FunctionRecord> {
    (0..n)
        .map(|i| FunctionRecord {
            file_path: format!("src/f{}.c", i % 50),
            signature: format!("int fn_{i} (int x)"),
            callees: vec![
                format!("fn_{}", (i + 1) % n),
                format!("fn_{}", (i * 7) % n),
                "memcpy".to_string(),
            ],
            body: String::new(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    for n in [10usize, 100, 500] {
        let source = synthetic_c(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &source, |b, source| {
            b.iter(|| {
                let content = source.as_bytes().to_vec();
                let tree = parse_bytes(Language::C, &content).unwrap();
                let unit = ParsedUnit {
                    path: "bench.c".to_string(),
                    language: Language::C,
                    content,
                    tree,
                };
                black_box(extract_unit(&unit))
            })
        });
    }
    group.finish();
}

fn bench_similarity(c: &mut Criterion) {
    let a = synthetic_c(3);
    let b = a.replace("memcpy", "memmove").replace("len - 1", "len - 2");
    let unrelated = "void idle(void) { for (;;) { wait_event(); } }".repeat(8);

    let mut group = c.benchmark_group("similarity");
    group.bench_function("ratio_close", |bench| {
        bench.iter(|| black_box(ratio(&a, &b)))
    });
    group.bench_function("exceeds_close", |bench| {
        bench.iter(|| black_box(exceeds(&a, &b, 0.9)))
    });
    group.bench_function("exceeds_unrelated", |bench| {
        bench.iter(|| black_box(exceeds(&a, &unrelated, 0.9)))
    });
    group.finish();
}

fn bench_callgraph(c: &mut Criterion) {
    let mut group = c.benchmark_group("callgraph");
    for n in [1_000usize, 10_000] {
        let records = synthetic_records(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter(|| black_box(build_maps(records)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_similarity, bench_callgraph);
criterion_main!(benches);
