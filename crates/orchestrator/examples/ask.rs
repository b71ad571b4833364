//! Ask the council a single question.
//!
//! Run with: cargo run -p arc-orchestrator --example ask -- "your question"
//!
//! Configuration via .env file or environment variables:
//!   OPENAI_API_KEY, GROQ_API_KEY, ...  - Provider credentials (any subset)
//!   ARC_MODELS_<PROVIDER>              - Comma-separated model overrides
//!   ARC_COUNCIL=1                      - Force a council run
//!   ARC_DEBUG=1                        - Print the council transcript

use std::env;
use std::sync::Arc;

use arc_orchestrator::{Orchestrator, QueryRequest};
use arc_tools::InMemoryImageSource;
use tracing::info;

fn flag(name: &str) -> bool {
    matches!(env::var(name).as_deref(), Ok("1") | Ok("true"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arc_orchestrator=debug".parse()?)
                .add_directive("arc_providers=info".parse()?)
                .add_directive("arc_tools=info".parse()?),
        )
        .init();

    let message = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let message = if message.trim().is_empty() {
        "What's the weather like today?".to_string()
    } else {
        message
    };

    let orchestrator = Orchestrator::from_env(Arc::new(InMemoryImageSource::new()))?;

    for (provider, candidate) in orchestrator.candidates() {
        info!(
            "{:<12} key={} callable={} models={}",
            provider.as_str(),
            candidate.key_present,
            candidate.callable,
            candidate.models.join(",")
        );
    }

    let mut request = QueryRequest::new(message);
    if flag("ARC_COUNCIL") {
        request = request.force_council(orchestrator.config().default_rounds);
    }
    if flag("ARC_DEBUG") {
        request = request.with_debug();
    }

    let response = orchestrator.handle(request).await;

    if let Some(events) = &response.council {
        for event in events {
            println!("--- {} ---", event.role);
            match &event.error {
                Some(error) => println!("(error: {})", error),
                None => println!("{}", event.text),
            }
        }
        println!();
    }

    match (response.ok, response.text) {
        (true, Some(text)) => println!("{}", text),
        _ => {
            eprintln!(
                "No answer: {}",
                response.error.as_deref().unwrap_or("council produced no text")
            );
            if let Some(attempts) = response.attempts {
                eprintln!("{}", serde_json::to_string_pretty(&attempts)?);
            }
        }
    }

    if let Some(last) = orchestrator.last_tried() {
        info!("Last tried: {} ({})", last.provider, last.model);
    }

    Ok(())
}
