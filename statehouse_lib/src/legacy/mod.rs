//! Sessions before the JSON feed: status-report workbooks plus the HTML
//! archive.

mod archive;
mod sheet;

use std::collections::HashSet;

use statehouse_api::Client;

pub use self::archive::{
    archive_key, archive_path, is_missing_page, roll_call_vote, status_report_links, ArchivePage,
    RollCall,
};
pub use self::sheet::{
    bills_from_sheet, date_from_serial, plan_action_columns, ActionColumn, SheetCell, StatusSheet,
};

use crate::config::ScrapeConfig;
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::error::ScrapeError;
use crate::model::{Bill, Scraped};
use crate::sink::{emit_all, RunStats, Sink};
use crate::vocabulary::Vocabulary;

pub struct LegacyPipeline<'a> {
    client: &'a Client,
    vocab: &'a Vocabulary,
    config: &'a ScrapeConfig,
}

impl<'a> LegacyPipeline<'a> {
    /// `client` resolves archive paths, so its base URL is the archive root.
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
        let index_url = &self.config.status_report_url;
        let index = self.client.get_text(index_url).await?;
        let reports = status_report_links(&index, session, index_url)?;
        if reports.is_empty() {
            diag.warn(
                WarningKind::ResourceUnavailable,
                format!("No status reports listed for session {} at {}", session, index_url),
            );
        }

        let mut stats = RunStats::default();
        for url in reports {
            let bytes = match self.client.get_bytes(&url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    diag.warn(
                        WarningKind::ResourceUnavailable,
                        format!("Missing report {} ({})", url, e),
                    );
                    continue;
                }
            };
            let sheet = StatusSheet::from_workbook_bytes(bytes)?;
            let bills = self.process_sheet(&sheet, session, &url, diag).await?;
            for items in bills {
                emit_all(sink, &mut stats, items)?;
            }
        }
        tracing::info!("Session {}: {} bills, {} votes", session, stats.bills, stats.votes);
        Ok(stats)
    }

    /// Bills of one status report, each preceded by its roll-call votes.
    pub async fn process_sheet(
        &self,
        sheet: &StatusSheet,
        session: u32,
        source_url: &str,
        diag: &mut Diagnostics,
    ) -> Result<Vec<Vec<Scraped>>, ScrapeError> {
        let mut out = Vec::new();
        for mut bill in bills_from_sheet(sheet, session, source_url, self.vocab, diag) {
            let mut items = self.enrich(&mut bill, session, diag).await?;
            items.push(Scraped::Bill(Box::new(bill)));
            out.push(items);
        }
        Ok(out)
    }

    /// Adds archive versions to `bill` and returns its roll-call votes.
    async fn enrich(
        &self,
        bill: &mut Bill,
        session: u32,
        diag: &mut Diagnostics,
    ) -> Result<Vec<Scraped>, ScrapeError> {
        let Some(path) = archive_path(session, &bill.number) else {
            diag.warn(
                WarningKind::MissingArchivePage,
                format!("{} has no archive key", bill.identifier),
            );
            return Ok(Vec::new());
        };
        let url = self.client.url(&path);
        let Some(page) = self.fetch_page(&url, diag).await? else {
            return Ok(Vec::new());
        };

        self.add_version(bill, &page, diag);
        let mut visited: HashSet<&str> = HashSet::from([path.as_str()]);
        for link in &page.related {
            if !visited.insert(link.as_str()) {
                continue;
            }
            if let Some(related) = self.fetch_page(&self.client.url(link), diag).await? {
                self.add_version(bill, &related, diag);
            }
        }

        let reference = bill.reference();
        let mut votes = Vec::new();
        for roll_call in &page.roll_calls {
            if let Some(vote) = roll_call_vote(roll_call, &reference, &url, diag)? {
                votes.push(Scraped::Vote(Box::new(vote)));
            }
        }
        Ok(votes)
    }

    async fn fetch_page(
        &self,
        url: &str,
        diag: &mut Diagnostics,
    ) -> Result<Option<ArchivePage>, ScrapeError> {
        let html = match self.client.get_text(url).await {
            Ok(html) => html,
            Err(e) => {
                diag.warn(
                    WarningKind::ResourceUnavailable,
                    format!("Archive page {} unavailable ({})", url, e),
                );
                return Ok(None);
            }
        };
        if is_missing_page(&html) {
            diag.warn(WarningKind::MissingArchivePage, format!("missing page: {}", url));
            return Ok(None);
        }
        ArchivePage::parse(&html).map(Some)
    }

    fn add_version(&self, bill: &mut Bill, page: &ArchivePage, diag: &mut Diagnostics) {
        let (Some(name), Some((link, media_type))) = (&page.title, page.version_document()) else {
            diag.warn(
                WarningKind::MissingField,
                format!("An archive page of {} offers no version document", bill.identifier),
            );
            return;
        };
        bill.add_version_link(name, &self.client.url(link), media_type);
    }
}
