//! Neurolit — neurodegenerative-disease literature monitor.
//! Entry point for the command-line binary.
//!
//! Usage: neurolit [all | 1-11] ["1 day" | "3 days" | "1 week" | "1 month"] [--chat]

mod config;

use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use neurolit_common::CancelToken;
use neurolit_ingestion::query::{Recency, Topic, FACET_LABELS};
use neurolit_ingestion::sources::pubmed::PubMedClient;
use neurolit_llm::backend::GeminiBackend;
use neurolit_llm::chat::ChatSession;
use neurolit_llm::enrich::GeminiEnricher;
use neurolit_pipeline::{run_search, SearchJob};

fn parse_args() -> (Topic, Recency, bool) {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let chat = args.iter().any(|a| a == "--chat");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let topic = match positional.first().map(|s| s.as_str()) {
        None | Some("all") => Topic::All,
        Some(n) => match n.parse::<usize>() {
            Ok(i) if (1..=FACET_LABELS.len()).contains(&i) => {
                Topic::Facet(FACET_LABELS[i - 1].to_string())
            }
            _ => Topic::Facet(n.to_string()),
        },
    };
    let recency = positional
        .get(1)
        .map(|s| Recency::from_label(s))
        .unwrap_or(Recency::OneWeek);
    (topic, recency, chat)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("neurolit=info,warn")),
        )
        .init();

    info!("Neurolit v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load()?;
    let api_key = config.gemini_api_key();
    if api_key.trim().is_empty() {
        anyhow::bail!(
            "Gemini API key missing: set NEUROLIT_GEMINI_API_KEY or llm.api_key in neurolit.toml"
        );
    }

    let (topic, recency, chat) = parse_args();
    info!(?topic, days = recency.days(), "Search parameters");

    let source = PubMedClient::new(config.search.pubmed_api_key.clone())?;
    let backend = GeminiBackend::new(api_key, config.llm.model.clone());
    let enricher = GeminiEnricher::new(GeminiBackend::new(
        config.gemini_api_key(),
        config.llm.model.clone(),
    ));

    // Ctrl-C cancels the in-flight search instead of killing the process.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Cancellation requested");
                cancel.cancel();
            }
        });
    }

    // Mirror stage progress onto the log.
    let (tx, mut rx) = tokio::sync::broadcast::channel::<neurolit_pipeline::SearchProgress>(32);
    tokio::spawn(async move {
        while let Ok(ev) = rx.recv().await {
            info!(stage = %ev.stage, "{}", ev.message);
        }
    });

    let job = SearchJob { topic, recency };
    let outcome = match run_search(job, &source, &enricher, &cancel, Some(tx)).await {
        Ok(o) => o,
        Err(e) => {
            // Total-failure conditions and cancellation are informational.
            println!("{e}");
            return Ok(());
        }
    };

    if !outcome.failed_batches.is_empty() {
        warn!(batches = ?outcome.failed_batches, "Some enrichment batches failed");
    }

    println!(
        "\n检索 \"{}\"（近 {} 天）: {} 条索引, {} 篇详情, {} 篇入选\n",
        outcome.query,
        outcome.lookback_days,
        outcome.pmids_found,
        outcome.records_fetched,
        outcome.papers.len()
    );
    for (i, p) in outcome.papers.iter().enumerate() {
        println!(
            "{:>3}. [{}] {} / {}\n     {} ({}) IF: {}  {}",
            i + 1,
            p.disease_type,
            p.title_en,
            p.title_zh,
            p.journal,
            p.publish_date,
            p.impact_factor,
            p.pmid_doi,
        );
    }
    if !outcome.citations.is_empty() {
        println!("\n依据来源:");
        for c in &outcome.citations {
            println!("  - {} <{}>", c.title, c.uri);
        }
    }

    if chat && !outcome.papers.is_empty() {
        run_chat(Arc::new(backend), &outcome.papers).await?;
    }

    Ok(())
}

/// Interactive follow-up loop seeded with the ranked papers.
async fn run_chat(
    backend: Arc<GeminiBackend>,
    papers: &[neurolit_llm::models::EnrichedPaper],
) -> anyhow::Result<()> {
    let mut session = ChatSession::new(backend, papers);
    println!("\n进入追问模式，输入空行退出。");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let turn = line.trim();
        if turn.is_empty() {
            break;
        }
        match session.send(turn).await {
            Ok(reply) => println!("{reply}\n"),
            Err(e) => warn!(error = %e, "Chat turn failed"),
        }
    }
    Ok(())
}
