//! Benchmark end-to-end do loop de pesquisa com clientes mock.
//!
//! Mede o overhead do próprio agente (prompts, parsing, deduplicação,
//! relatório) sem rede.
//!
//! Executar: `cargo bench --bench research_bench`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use research_agent::llm::MockLlmClient;
use research_agent::search::MockSearchClient;
use research_agent::{ResearchAgent, SearchResult};

fn bench_research_run(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    // Mesmo texto para todas as fases: plano vazio (cai para o tópico),
    // um finding na extração, nenhum gap e relatório não vazio.
    let llm = MockLlmClient::always(
        r#"```json
[{"fact": "Rust has no garbage collector", "source": "Rust Book", "url": "https://doc.rust-lang.org/book/"}]
```"#,
    );
    let search = MockSearchClient::with_results(vec![
        SearchResult::new("Rust Book", "https://doc.rust-lang.org/book/", "Ownership rules..."),
        SearchResult::new("Rustonomicon", "https://doc.rust-lang.org/nomicon/", "Unsafe code..."),
    ]);
    let agent = ResearchAgent::new(Arc::new(llm), Arc::new(search));

    c.bench_function("research_single_iteration", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(agent.research("memory safety in Rust").await) })
    });
}

criterion_group!(benches, bench_research_run);
criterion_main!(benches);
