//! Benchmarks do parser de saída estruturada e do conjunto de findings.
//!
//! Testa performance de:
//! - Extração de JSON (bloco cercado, texto puro, trecho em prosa)
//! - Deduplicação de findings
//! - Relatório de fallback
//!
//! Executar: `cargo bench --bench parser_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use research_agent::agent::FindingSet;
use research_agent::report::fallback_report;
use research_agent::utils::{extract_findings, extract_json};
use research_agent::Finding;

fn findings_array(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"fact": "Fact number {} with [brackets] and {{braces}}", "source": "Source {}", "url": "https://example.com/{}"}}"#,
                i,
                i % 7,
                i % 7
            )
        })
        .collect();
    format!("[{}]", items.join(", "))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: extract_json
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_extract_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_json");

    for n in [1usize, 10, 50] {
        let array = findings_array(n);
        let fenced = format!("Here are the findings:\n```json\n{}\n```\nLet me know!", array);
        let prose = format!("Sure! Note [1] first. The findings are {} and that is all.", array);

        group.throughput(Throughput::Bytes(fenced.len() as u64));
        group.bench_with_input(BenchmarkId::new("fenced", n), &fenced, |b, text| {
            b.iter(|| black_box(extract_json(black_box(text))))
        });
        group.bench_with_input(BenchmarkId::new("plain", n), &array, |b, text| {
            b.iter(|| black_box(extract_json(black_box(text))))
        });
        group.bench_with_input(BenchmarkId::new("prose_scan", n), &prose, |b, text| {
            b.iter(|| black_box(extract_json(black_box(text))))
        });
    }

    let truncated = format!("```json\n{}", &findings_array(20)[..400]);
    group.bench_function("truncated", |b| {
        b.iter(|| black_box(extract_json(black_box(&truncated))))
    });

    group.finish();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Findings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_findings(c: &mut Criterion) {
    let mut group = c.benchmark_group("findings");

    let text = findings_array(50);
    group.bench_function("extract_findings_50", |b| {
        b.iter(|| black_box(extract_findings(black_box(&text))))
    });

    // Metade duplicada
    let batch: Vec<Finding> = (0..200)
        .map(|i| {
            Finding::new(
                format!("fact {}", i % 100),
                "source",
                format!("https://example.com/{}", i % 13),
            )
        })
        .collect();

    group.bench_function("dedup_200", |b| {
        b.iter(|| {
            let mut set = FindingSet::new();
            set.extend(batch.iter().cloned());
            black_box((set.len(), set.sources_count()))
        })
    });

    group.bench_function("fallback_report_200", |b| {
        b.iter(|| black_box(fallback_report("benchmark topic", black_box(&batch))))
    });

    group.finish();
}

criterion_group!(benches, bench_extract_json, bench_findings);
criterion_main!(benches);
