use std::env;
use std::path::PathBuf;

use cityqa_core::config::{expand_path, Config};
use cityqa_rag::engine::{EngineOptions, RagEngine};
use cityqa_rag::ingest;
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ask|ingest|stats|demo> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

async fn build_engine(config: &Config) -> RagEngine {
    let db_dir: String = config
        .get("store.db_dir")
        .unwrap_or_else(|_| "./data/cityqa_db".to_string());
    let collection: String = config
        .get("store.collection")
        .unwrap_or_else(|_| "city_documents".to_string());
    let model_name: String = config
        .get("embedding.model")
        .unwrap_or_else(|_| "all-MiniLM-L6-v2".to_string());
    let model_dir: Option<String> = config.get("embedding.model_dir").ok();
    let dimension: usize = config.get("embedding.dimension").unwrap_or(384);
    let default_k: usize = config.get("search.default_k").unwrap_or(5);

    RagEngine::bootstrap(EngineOptions {
        db_dir: expand_path(&db_dir),
        collection,
        model_dir: model_dir.as_deref().map(expand_path),
        model_name,
        dimension,
        default_k,
        generator: None,
    })
    .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();

    match cmd.as_str() {
        "ask" => {
            let question = args.join(" ");
            if question.is_empty() {
                eprintln!("Usage: cityqa ask \"<question>\"");
                std::process::exit(1);
            }
            let engine = build_engine(&config).await;
            let response = engine.ask(&question, false).await;
            println!("Q: {}", response.question);
            println!("\n{}", response.answer);
            println!("\n📎 {} source documents", response.sources.len());
        }
        "ingest" => {
            let Some(raw_path) = args.first() else {
                eprintln!("Usage: cityqa ingest <file.txt|file.pdf|directory>");
                std::process::exit(1);
            };
            let path: PathBuf = expand_path(raw_path);
            let engine = build_engine(&config).await;
            if path.is_dir() {
                let files = ingest::directory_files(&path)?;
                if files.is_empty() {
                    println!("No .txt/.md files found under {}.", path.display());
                    return Ok(());
                }
                let bar = ProgressBar::new(files.len() as u64);
                for file in &files {
                    engine.add_text_file(file).await?;
                    bar.inc(1);
                }
                bar.finish();
                println!("✅ Ingested {} files from {}", files.len(), path.display());
            } else if path.extension().and_then(|e| e.to_str()) == Some("pdf") {
                let ids = engine.add_pdf(&path).await?;
                println!("✅ Ingested {} PDF pages from {}", ids.len(), path.display());
            } else {
                let id = engine.add_text_file(&path).await?;
                println!("✅ Ingested {} ({})", path.display(), &id[..8]);
            }
        }
        "stats" => {
            let engine = build_engine(&config).await;
            let stats = engine.statistics().await;
            println!("📊 Knowledge base statistics");
            println!("Total documents: {}", stats.total_documents);
            println!("Collection: {}", stats.collection_name);
            println!("Embedding model: {}", stats.embedding_model);
            println!("Backend: {}", stats.backend_name);
            for (category, count) in &stats.categories {
                println!("  {}: {}", category, count);
            }
        }
        "demo" => {
            let engine = build_engine(&config).await;
            let stats = engine.statistics().await;
            println!(
                "📊 {} documents across {} categories",
                stats.total_documents,
                stats.categories.len()
            );
            for question in [
                "What is Revere Beach?",
                "How do I get to Boston from Revere?",
                "What schools are in Revere?",
            ] {
                let response = engine.ask(question, false).await;
                println!("\nQ: {}", question);
                println!("A: {}", response.answer);
                println!("Sources: {} documents found", response.sources.len());
            }
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
