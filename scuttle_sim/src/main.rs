//! Scuttle fixture generator CLI
//!
//! Generate a deterministic social-network fixture into an output directory.

use clap::Parser;
use scuttle_core::Frequencies;
use scuttle_sim::exporter::{export_all, ExportOptions};
use scuttle_sim::{random_seed, FixtureConfig, FixtureWorld, GenerationRunner, RunError};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Deterministic social-network fixture generator
#[derive(Parser, Debug)]
#[command(name = "scuttle-fixtures")]
#[command(about = "Generate deterministic social-network fixtures", long_about = None)]
struct Args {
    /// Seed string (random if omitted)
    #[arg(short, long)]
    seed: Option<String>,

    /// Number of messages to generate
    #[arg(short, long, default_value_t = scuttle_sim::world::DEFAULT_MESSAGES)]
    messages: usize,

    /// Number of participants
    #[arg(short, long, default_value_t = scuttle_sim::world::DEFAULT_AUTHORS)]
    authors: usize,

    /// Directory for the generated files
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// 1-based position of the LATESTMSG post, to extend an earlier fixture
    #[arg(long)]
    latestmsg: Option<usize>,

    /// Skip report.md
    #[arg(long = "no-report")]
    no_report: bool,

    /// Write follow-graph.json
    #[arg(long)]
    follow_graph: bool,

    /// Write a secret file for every participant
    #[arg(long)]
    allkeys: bool,

    /// JSON file overriding the tuned frequencies
    #[arg(long)]
    frequencies: Option<PathBuf>,

    /// Log progress while generating
    #[arg(long)]
    progress: bool,

    /// Verbose output (debug logs and every record)
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Timestamp records with the wall clock
    #[arg(long)]
    realtime: bool,
}

fn load_frequencies(path: &Option<PathBuf>) -> Result<Frequencies, RunError> {
    let Some(path) = path else {
        return Ok(Frequencies::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| RunError::Frequencies {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Frequencies::from_json(&text).map_err(|e| RunError::Frequencies {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

async fn generate(args: &Args) -> Result<bool, RunError> {
    let config = FixtureConfig {
        seed: args.seed.clone().unwrap_or_else(random_seed),
        messages: args.messages,
        authors: args.authors,
        latest_msg: args.latestmsg,
        report: !args.no_report,
        follow_graph: args.follow_graph,
        all_keys: args.allkeys,
        verbose: args.verbose,
        progress: args.progress,
        realtime: args.realtime,
        output_dir: args.output_dir.clone(),
        frequencies: load_frequencies(&args.frequencies)?,
    };

    let world = FixtureWorld::new(config);
    let output = GenerationRunner::new(&world).run().await?;

    let options = ExportOptions {
        report: world.config.report,
        follow_graph: world.config.follow_graph,
        all_keys: world.config.all_keys,
    };
    export_all(
        &world.config.output_dir,
        &output.records,
        &output.state,
        &output.report(&world),
        &world.identities,
        options,
    )?;

    let summary = &output.summary;
    if args.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for (kind, count) in &summary.per_type {
            info!("  {:<8} {}", kind, count);
        }
        if summary.passed() {
            info!("✓ seed={} {} messages, log consistent", summary.seed, summary.messages);
        } else {
            error!(
                "✗ seed={} {} oracle violations",
                summary.seed,
                summary.verdict.violations.len()
            );
        }
    }
    Ok(summary.passed())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    match generate(&args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
