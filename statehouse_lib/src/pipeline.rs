//! Session routing and the JSON-feed pipeline.

use statehouse_api::types::VersionRecord;
use statehouse_api::{Client, RetryConfig};

use crate::bills::{BillFeed, BillVersionAggregator, VersionGroupsBuilder};
use crate::config::{ScrapeConfig, SessionEra};
use crate::diagnostics::Diagnostics;
use crate::documents::AuxiliaryDocuments;
use crate::error::ScrapeError;
use crate::feed::{decode_items, FeedReader};
use crate::legacy::LegacyPipeline;
use crate::legislators::LegislatorDirectory;
use crate::sink::{emit_all, RunStats, Sink};
use crate::vocabulary::Vocabulary;

/// Reconstructs one session with whichever pipeline covers it.
pub async fn scrape_session(
    config: &ScrapeConfig,
    session: u32,
    sink: &mut dyn Sink,
    diag: &mut Diagnostics,
) -> Result<RunStats, ScrapeError> {
    let era = SessionEra::for_session(session)?;
    let vocab = Vocabulary::load()?;
    tracing::info!("Scraping session {} ({:?} pipeline)", session, era);
    match era {
        SessionEra::Feed => {
            let client = Client::with_base_url(&config.api_base_url)
                .with_timeout(config.feed_timeout)
                .with_retry_config(RetryConfig::from_env());
            ModernPipeline::new(&client, &vocab, config)
                .run(session, sink, diag)
                .await
        }
        SessionEra::Legacy => {
            let client = Client::with_base_url(&config.archive_base_url)
                .with_timeout(config.request_timeout)
                .with_retry_config(RetryConfig::from_env());
            LegacyPipeline::new(&client, &vocab, config)
                .run(session, sink, diag)
                .await
        }
    }
}

/// Sessions served by the JSON feed.
pub struct ModernPipeline<'a> {
    client: &'a Client,
    vocab: &'a Vocabulary,
    config: &'a ScrapeConfig,
}

impl<'a> ModernPipeline<'a> {
    pub fn new(client: &'a Client, vocab: &'a Vocabulary, config: &'a ScrapeConfig) -> Self {
        Self {
            client,
            vocab,
            config,
        }
    }

    pub async fn run(
        &self,
        session: u32,
        sink: &mut dyn Sink,
        diag: &mut Diagnostics,
    ) -> Result<RunStats, ScrapeError> {
        let assembly_url = self.config.assembly_url(session);
        let directory = LegislatorDirectory::fetch(self.client, &assembly_url, diag).await?;
        let documents = AuxiliaryDocuments::build(self.client, &assembly_url, diag).await?;
        let aggregator = BillVersionAggregator::new(
            self.client,
            self.vocab,
            &directory,
            &documents,
            session,
            &assembly_url,
        );

        let mut stats = RunStats::default();
        for feed in BillFeed::ALL {
            let mut groups = VersionGroupsBuilder::default();
            let mut reader = FeedReader::new(self.client, format!("{}{}", assembly_url, feed.endpoint()));
            while let Some(page) = reader.next_page().await? {
                let versions: Vec<VersionRecord> = decode_items(page.items, feed.endpoint(), diag);
                for version in versions {
                    groups.push(version, diag);
                }
            }
            tracing::info!(
                "Read {} {} across {} pages",
                groups.len(),
                feed.endpoint(),
                reader.pages_read()
            );
            for group in groups.finish() {
                let items = aggregator.reconcile(feed, group, diag).await?;
                emit_all(sink, &mut stats, items)?;
            }
        }
        tracing::info!("Session {}: {} bills, {} votes", session, stats.bills, stats.votes);
        Ok(stats)
    }
}
