use std::io;

use anyhow::{Context, Result};
use clap::Args;
use statehouse_lib::{scrape_session, Diagnostics, ScrapeConfig};

use crate::output::{print_bills_table, print_warning_summary, JsonLinesSink, OutputFormat, TableSink};

#[derive(Args)]
pub struct ScrapeArgs {
    /// General Assembly number (128 or later)
    #[arg(long)]
    pub session: u32,

    /// Override the feed base URL (also STATEHOUSE_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override the archive base URL (also STATEHOUSE_ARCHIVE_URL)
    #[arg(long)]
    pub archive_url: Option<String>,
}

pub async fn run(args: &ScrapeArgs, format: &OutputFormat) -> Result<()> {
    let mut config = ScrapeConfig::from_env();
    if let Some(ref url) = args.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(ref url) = args.archive_url {
        config.archive_base_url = url.clone();
    }

    let mut diag = Diagnostics::new();
    let stats = match format {
        OutputFormat::Json => {
            let mut sink = JsonLinesSink::new(io::stdout());
            scrape_session(&config, args.session, &mut sink, &mut diag).await
        }
        OutputFormat::Table => {
            let mut sink = TableSink::default();
            let stats = scrape_session(&config, args.session, &mut sink, &mut diag).await;
            print_bills_table(sink.rows());
            stats
        }
    }
    .with_context(|| format!("scrape of session {} failed", args.session))?;

    eprintln!(
        "Session {}: {} bills, {} votes",
        args.session, stats.bills, stats.votes
    );
    print_warning_summary(&diag);
    Ok(())
}
