use clap::Parser;
use earnings_query_orchestrator::{config::AppConfig, QueryPipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ask one question about a public company and print the answer
#[derive(Debug, Parser)]
#[command(name = "ask", version)]
struct Cli {
    /// The question, e.g. "Summarize Spotify's latest conference call"
    #[arg(required = true)]
    prompt: Vec<String>,

    /// Stop after aggregation and print the intent, symbols and evidence
    #[arg(long)]
    dry_run: bool,

    /// Print machine-readable JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let prompt = cli.prompt.join(" ");

    let config = AppConfig::from_env()?;
    let pipeline = QueryPipeline::from_config(&config)?;

    info!(prompt = %prompt, dry_run = cli.dry_run, "Running query");

    if cli.dry_run {
        let prepared = pipeline.prepare(&prompt).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&prepared)?);
        } else {
            println!("Category: {}", prepared.intent.category);
            println!("Companies: {}", prepared.intent.companies.join(", "));
            println!("Symbols: {}", prepared.symbols.join(", "));
            println!("Topic: {}", prepared.intent.topic);
            println!("\n=== EVIDENCE ({} chars) ===\n{}", prepared.evidence.len(), prepared.evidence);
        }
        return Ok(());
    }

    let answer = pipeline.answer(&prompt).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", answer.response);
    }

    Ok(())
}
