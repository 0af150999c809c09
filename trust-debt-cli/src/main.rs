//! trust-debt - grade intent/reality drift and gate actions on it

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trust_debt_cli::{commands, Args, Command, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Logs go to stderr; stdout carries the JSON report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let settings = Settings::load(args.config.as_deref())?;
    debug!(
        taxonomy = %args.taxonomy.display(),
        corpus = %args.corpus.display(),
        threshold = settings.permission.threshold,
        "Settings loaded"
    );

    match &args.command {
        Command::Grade => print(&commands::grade(&args, &settings).await?),
        Command::Check { subject, action } => {
            let report = commands::check(&args, &settings, subject, action).await?;
            print(&report)?;
            if !report.decision.allowed {
                std::process::exit(2);
            }
            Ok(())
        }
        Command::Orthogonality => print(&commands::orthogonality(&args, &settings)?),
        Command::History => match args.history.as_deref() {
            Some(path) => print(&commands::history(path).await?),
            None => anyhow::bail!("no history file configured"),
        },
        Command::Actions => print(&commands::actions(&settings)),
    }
}

fn print<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
