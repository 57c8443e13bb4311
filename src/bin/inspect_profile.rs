use anyhow::{Context, Result};
use clap::Parser;
use profile_fetch::config::SummaryFormat;
use profile_fetch::core::summary::load_summary;
use profile_fetch::utils::logger;
use profile_fetch::LocalStorage;

/// Summarize `profile` and `strings` files previously written by profile-fetch.
#[derive(Debug, Parser)]
#[command(name = "inspect_profile")]
struct Args {
    /// Directory holding the `profile` and `strings` files
    #[arg(default_value = ".")]
    dir: String,

    /// Number of scopes to list
    #[arg(long, default_value = "10")]
    top: usize,

    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    format: SummaryFormat,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::debug!("Inspecting {}", args.dir);
    let storage = LocalStorage::new(args.dir.clone());
    let summary = load_summary(&storage, args.top)
        .await
        .with_context(|| format!("failed to summarize capture in {}", args.dir))?;

    match args.format {
        SummaryFormat::Text => print!("{}", summary),
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
