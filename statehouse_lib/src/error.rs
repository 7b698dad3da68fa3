//! Error types for the scraping core.
//!
//! Only run-halting conditions are errors. Item- and resource-level problems
//! are recorded in [`crate::diagnostics::Diagnostics`] and skipped.

use std::fmt;

use crate::vocabulary::VocabularyError;

#[derive(Debug)]
pub enum ScrapeError {
    /// A feed or page that the run cannot continue without failed to load.
    Api(statehouse_api::Error),
    /// The embedded vocabulary tables are invalid.
    Vocabulary(VocabularyError),
    /// No pipeline covers this session.
    UnsupportedSession(u32),
    /// A veto or disapproval was found; the taxonomy has no safe mapping for it.
    UnhandledEvent { kind: &'static str, url: String },
    /// A legacy roll call named a chamber other than House or Senate.
    UnexpectedChamber(String),
    /// A status-report workbook could not be read.
    Spreadsheet(String),
    /// Archive markup could not be scanned.
    Parse(String),
    /// The output collaborator rejected a record.
    Output(String),
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Vocabulary(e) => write!(f, "Vocabulary error: {}", e),
            Self::UnsupportedSession(s) => write!(f, "No data for session {}", s),
            Self::UnhandledEvent { kind, url } => write!(
                f,
                "Found a {} record, which is not modeled yet; refusing to emit incomplete data: {}",
                kind, url
            ),
            Self::UnexpectedChamber(c) => write!(f, "Unexpected chamber in roll call: {:?}", c),
            Self::Spreadsheet(msg) => write!(f, "Spreadsheet error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for ScrapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Vocabulary(e) => Some(e),
            _ => None,
        }
    }
}

impl From<statehouse_api::Error> for ScrapeError {
    fn from(e: statehouse_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<VocabularyError> for ScrapeError {
    fn from(e: VocabularyError) -> Self {
        Self::Vocabulary(e)
    }
}

impl From<calamine::Error> for ScrapeError {
    fn from(e: calamine::Error) -> Self {
        Self::Spreadsheet(e.to_string())
    }
}
