//! Status-report workbooks: one row per bill, one column per action type.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Days, NaiveDate};

use crate::bills::display_identifier;
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::error::ScrapeError;
use crate::model::{Action, ActionTag, Bill, BillClassification, Chamber, SponsorshipRole};
use crate::vocabulary::Vocabulary;

const ID_COL: usize = 0;
const SPONSOR_COL: usize = 1;
const COSPONSOR_COL: usize = 2;
const TITLE_COL: usize = 3;
const FIRST_ACTION_COL: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Empty,
    Number(f64),
    Text(String),
}

impl SheetCell {
    /// Cell rendered as text; whole numbers print without a fraction.
    pub fn text(&self) -> String {
        match self {
            SheetCell::Empty => String::new(),
            SheetCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            SheetCell::Number(n) => n.to_string(),
            SheetCell::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&Data> for SheetCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => SheetCell::Empty,
            Data::Float(n) => SheetCell::Number(*n),
            Data::Int(n) => SheetCell::Number(*n as f64),
            Data::DateTime(dt) => SheetCell::Number(dt.as_f64()),
            Data::String(s) if s.trim().is_empty() => SheetCell::Empty,
            Data::String(s) => SheetCell::Text(s.clone()),
            other => SheetCell::Text(other.to_string()),
        }
    }
}

/// First worksheet of a status report, addressed from A1.
#[derive(Debug, Clone, Default)]
pub struct StatusSheet {
    rows: Vec<Vec<SheetCell>>,
}

impl StatusSheet {
    pub fn from_rows(rows: Vec<Vec<SheetCell>>) -> Self {
        Self { rows }
    }

    /// Reads the first worksheet of an `.xls`/`.xlsx` workbook.
    pub fn from_workbook_bytes(bytes: Vec<u8>) -> Result<Self, ScrapeError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ScrapeError::Spreadsheet("workbook has no worksheets".into()))??;

        // Data may not begin at A1.
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<SheetCell>> = (0..start_row).map(|_| Vec::new()).collect();
        for row in range.rows() {
            let mut cells: Vec<SheetCell> = (0..start_col).map(|_| SheetCell::Empty).collect();
            cells.extend(row.iter().map(SheetCell::from));
            rows.push(cells);
        }
        Ok(Self { rows })
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Out-of-range cells read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &SheetCell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&SheetCell::Empty)
    }
}

/// Converts a 1900-system date serial to a calendar date. The time of day is
/// dropped. Serials below 1 and the fictitious 1900-02-29 (60) have no date.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor() as i64;
    let epoch = match days {
        d if d < 1 || d == 60 => return None,
        d if d < 60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(days as u64))
}

/// What one action column means, resolved once per sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionColumn {
    pub col: usize,
    pub description: String,
    pub tags: Vec<ActionTag>,
    pub actor: Chamber,
}

/// Walks the header row left to right. A header starting with House/Senate or
/// naming the governor sets the actor for itself and every following column
/// until the next such header. Unlabelled columns still count as "other"
/// actions of the current actor. The last column is not an action column.
pub fn plan_action_columns(sheet: &StatusSheet, vocab: &Vocabulary) -> Vec<ActionColumn> {
    let mut actor = Chamber::Unknown;
    let mut columns = Vec::new();
    for col in FIRST_ACTION_COL..sheet.ncols().saturating_sub(1) {
        let header = sheet.cell(0, col).text();
        if let Some(next) = header_actor(&header) {
            actor = next;
        }
        let meaning = vocab.legacy_header(&header);
        columns.push(ActionColumn {
            col,
            description: meaning.description,
            tags: meaning.tags,
            actor,
        });
    }
    columns
}

fn header_actor(header: &str) -> Option<Chamber> {
    let words: Vec<&str> = header.split_whitespace().collect();
    let first = words.first().copied()?;
    let last = words.last().copied()?;
    match (first, last) {
        ("House", _) => Some(Chamber::Lower),
        ("Senate", _) => Some(Chamber::Upper),
        (_, "Governor") | ("Gov.", _) | (_, "Gov.") => Some(Chamber::Executive),
        _ => None,
    }
}

/// Bills of one status report, in row order. Rows without an id or title are
/// skipped.
pub fn bills_from_sheet(
    sheet: &StatusSheet,
    session: u32,
    source_url: &str,
    vocab: &Vocabulary,
    diag: &mut Diagnostics,
) -> Vec<Bill> {
    let columns = plan_action_columns(sheet, vocab);
    let session = session.to_string();
    let mut bills = Vec::new();

    for row in 1..sheet.nrows() {
        let raw_id = sheet.cell(row, ID_COL).text();
        let title = sheet.cell(row, TITLE_COL).text();
        if raw_id.is_empty() {
            if !title.is_empty() {
                diag.warn(
                    WarningKind::MissingField,
                    format!("Row {} of {} has no bill id, skipping", row, source_url),
                );
            }
            continue;
        }
        if title.is_empty() {
            diag.warn(
                WarningKind::MissingTitle,
                format!("Missing title for {}, not emitting it", raw_id),
            );
            continue;
        }

        let number: String = raw_id.split_whitespace().collect();
        let classification = if number.contains('R') {
            BillClassification::Resolution
        } else {
            BillClassification::Bill
        };
        let chamber = if number.contains('H') {
            Chamber::Lower
        } else {
            Chamber::Upper
        };
        let mut bill = Bill::new(
            &session,
            &number,
            display_identifier(&number),
            chamber,
            title,
            classification,
        );
        bill.add_source(source_url);

        let sponsor = sheet.cell(row, SPONSOR_COL).text();
        if !sponsor.is_empty() {
            bill.add_sponsorship(sponsor, SponsorshipRole::Primary);
        }
        let cosponsor = sheet.cell(row, COSPONSOR_COL).text();
        if !cosponsor.is_empty() {
            bill.add_sponsorship(cosponsor, SponsorshipRole::Cosponsor);
        }

        for column in &columns {
            let SheetCell::Number(serial) = sheet.cell(row, column.col) else {
                continue;
            };
            match date_from_serial(*serial) {
                Some(date) => bill.add_action(Action {
                    description: column.description.clone(),
                    date,
                    actor: column.actor,
                    classification: column.tags.clone(),
                }),
                None => diag.warn(
                    WarningKind::InvalidDate,
                    format!(
                        "{}: {:?} holds {} which is not a date",
                        bill.identifier, column.description, serial
                    ),
                ),
            }
        }
        bills.push(bill);
    }
    bills
}
