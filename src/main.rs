// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RESEARCH AGENT CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Uso:
//   research-agent-cli "AI agents in enterprise software"
//   research-agent-cli --json "edge computing"     (envelope JSON no stdout)
//   research-agent-cli --server --port 3000        (requer feature `server`)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use research_agent::prelude::*;
use research_agent::{
    create_tokio_runtime, handle_request, load_research_config, load_runtime_config,
};

/// Agente de pesquisa iterativa com relatório citado
#[derive(Parser, Debug)]
#[command(name = "research-agent-cli", version, about, long_about = None)]
struct Cli {
    /// Tópico da pesquisa
    topic: Vec<String>,

    /// Imprime o envelope JSON em vez do relatório
    #[arg(long)]
    json: bool,

    /// Modelo do LLM (sobrescreve LLM_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Sobe o servidor HTTP em vez de pesquisar (feature `server`)
    #[arg(long)]
    server: bool,

    /// Porta do servidor HTTP
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Token Bearer exigido pelo servidor
    #[arg(long)]
    secret: Option<String>,
}

/// Tenta carregar o arquivo .env de múltiplos locais possíveis
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from("../.env")];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!(
                        "✓ Carregado .env de: {:?}",
                        path.canonicalize().unwrap_or_else(|_| path.clone())
                    );
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }

    if dotenvy::dotenv().is_err() {
        eprintln!(
            "⚠ Nenhum arquivo .env encontrado. Certifique-se de que ANTHROPIC_API_KEY e TAVILY_API_KEY estão definidas."
        );
    }
}

fn main() -> anyhow::Result<()> {
    // Carregar .env PRIMEIRO, antes de qualquer coisa
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let runtime = create_tokio_runtime(&load_runtime_config())?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut llm = AnthropicClient::from_config(&load_llm_config()?)?;
    if let Some(model) = &cli.model {
        llm = llm.with_model(model);
    }
    let search = TavilyClient::from_config(&load_search_config()?)?;

    let agent = ResearchAgent::new(Arc::new(llm), Arc::new(search))
        .with_config(load_research_config()?);

    if cli.server {
        return run_server(agent, cli.port, cli.secret).await;
    }

    let topic = cli.topic.join(" ");
    if topic.trim().is_empty() {
        anyhow::bail!("Topic is required. Uso: research-agent-cli <tópico>");
    }

    if cli.json {
        let body = serde_json::json!({ "topic": topic }).to_string();
        let response = handle_request(&agent, &body).await;
        println!("{}", response.body);
        if response.status_code != 200 {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(" RESEARCH AGENT v{}", research_agent::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("Tópico: {}", topic.trim());
    println!();

    let agent = agent.with_status_callback(Arc::new(|msg: &str| println!("  → {}", msg)));
    let result = agent.research(&topic).await?;

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", result.report);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Findings: {} | Fontes: {} | Iterações: {}",
        result.findings_count, result.sources_count, result.iterations
    );
    println!("{}", result.timing.summary());

    Ok(())
}

#[cfg(feature = "server")]
async fn run_server(agent: ResearchAgent, port: u16, secret: Option<String>) -> anyhow::Result<()> {
    use research_agent::server::{start_server, AppState};
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let state = Arc::new(AppState { agent, secret });
    start_server(addr, state).await
}

#[cfg(not(feature = "server"))]
async fn run_server(_agent: ResearchAgent, _port: u16, _secret: Option<String>) -> anyhow::Result<()> {
    anyhow::bail!("Servidor indisponível: compile com `--features server`")
}
