use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;
use statehouse_lib::{Bill, Diagnostics, ScrapeError, Scraped, Sink};
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Writes one JSON object per record.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn emit(&mut self, item: Scraped) -> Result<(), ScrapeError> {
        let line = serde_json::to_string(&item).map_err(|e| ScrapeError::Output(e.to_string()))?;
        writeln!(self.out, "{}", line).map_err(|e| ScrapeError::Output(e.to_string()))
    }
}

#[derive(Tabled, Serialize)]
pub struct BillRow {
    #[tabled(rename = "Bill")]
    identifier: String,
    #[tabled(rename = "Chamber")]
    chamber: String,
    #[tabled(rename = "Type")]
    classification: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Actions")]
    actions: usize,
    #[tabled(rename = "Versions")]
    versions: usize,
    #[tabled(rename = "Documents")]
    documents: usize,
    #[tabled(rename = "Votes")]
    votes: usize,
    #[tabled(rename = "Last Action")]
    last_action: String,
}

/// Collects one summary row per bill. Votes arrive before their bill.
#[derive(Default)]
pub struct TableSink {
    rows: Vec<BillRow>,
    pending_votes: HashMap<String, usize>,
}

impl TableSink {
    pub fn rows(&self) -> &[BillRow] {
        &self.rows
    }
}

impl Sink for TableSink {
    fn emit(&mut self, item: Scraped) -> Result<(), ScrapeError> {
        match item {
            Scraped::Vote(vote) => {
                *self
                    .pending_votes
                    .entry(vote.bill().identifier.clone())
                    .or_default() += 1;
            }
            Scraped::Bill(bill) => {
                let votes = self.pending_votes.remove(&bill.identifier).unwrap_or(0);
                self.rows.push(build_bill_row(&bill, votes));
            }
        }
        Ok(())
    }
}

fn build_bill_row(bill: &Bill, votes: usize) -> BillRow {
    BillRow {
        identifier: bill.identifier.clone(),
        chamber: bill.chamber.to_string(),
        classification: bill.classification.to_string(),
        title: truncate(&bill.title, 60),
        actions: bill.actions.len(),
        versions: bill.versions.len(),
        documents: bill.documents.len(),
        votes,
        last_action: bill
            .actions
            .last()
            .map(|a| format!("{} {}", a.date, a.description))
            .unwrap_or_default(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}

pub fn print_bills_table(rows: &[BillRow]) {
    println!("{}", Table::new(rows));
}

#[derive(Tabled)]
struct WarningRow {
    #[tabled(rename = "Warning")]
    kind: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Warning counts by kind, on stderr so JSON output stays clean.
pub fn print_warning_summary(diag: &Diagnostics) {
    if diag.is_empty() {
        eprintln!("No warnings");
        return;
    }
    eprintln!("{}", Table::new(warning_rows(diag)));
}

fn warning_rows(diag: &Diagnostics) -> Vec<WarningRow> {
    diag.summary()
        .into_iter()
        .map(|(kind, count)| WarningRow {
            kind: kind.to_string(),
            count,
        })
        .collect()
}
