//! Output boundary for reconciled records.

use crate::error::ScrapeError;
use crate::model::Scraped;

/// Receives records in emission order: each bill's votes, then the bill.
pub trait Sink {
    fn emit(&mut self, item: Scraped) -> Result<(), ScrapeError>;
}

impl Sink for Vec<Scraped> {
    fn emit(&mut self, item: Scraped) -> Result<(), ScrapeError> {
        self.push(item);
        Ok(())
    }
}

/// Bill and vote totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub bills: usize,
    pub votes: usize,
}

impl RunStats {
    pub(crate) fn count(&mut self, item: &Scraped) {
        match item {
            Scraped::Bill(_) => self.bills += 1,
            Scraped::Vote(_) => self.votes += 1,
        }
    }
}

/// Forwards `items` to `sink`, counting them.
pub(crate) fn emit_all(
    sink: &mut dyn Sink,
    stats: &mut RunStats,
    items: Vec<Scraped>,
) -> Result<(), ScrapeError> {
    for item in items {
        stats.count(&item);
        sink.emit(item)?;
    }
    Ok(())
}
