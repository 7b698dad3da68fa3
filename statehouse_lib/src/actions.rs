//! Action history ingestion and classification.

use chrono::{NaiveDate, NaiveDateTime};
use statehouse_api::types::ActionRecord;
use statehouse_api::Client;

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::feed::decode_items;
use crate::model::{Action, ActionTag, Chamber};
use crate::vocabulary::{Classification, Vocabulary};

/// Source timestamp format. The wall-clock time is already local to the
/// legislature, so only the calendar date is kept.
pub const ACTION_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Maps action codes to canonical tags through the vocabulary table.
#[derive(Debug, Clone, Copy)]
pub struct ActionClassifier<'v> {
    vocab: &'v Vocabulary,
}

impl<'v> ActionClassifier<'v> {
    pub fn new(vocab: &'v Vocabulary) -> Self {
        Self { vocab }
    }

    /// Tags for `code`. An unknown code is `[unclassified]` and raises one
    /// warning per call.
    pub fn classify(&self, code: &str, diag: &mut Diagnostics) -> Vec<ActionTag> {
        let classification = self.vocab.action(code);
        if classification == Classification::Unknown {
            diag.warn(
                WarningKind::UnknownActionCode,
                format!("Unknown action code {:?}; recorded as unclassified", code),
            );
        }
        classification.tags()
    }

    /// Converts an action document, given newest first, into actions oldest
    /// first. Records without a description or a readable date are skipped.
    pub fn ingest(&self, records: Vec<ActionRecord>, diag: &mut Diagnostics) -> Vec<Action> {
        records
            .into_iter()
            .rev()
            .filter_map(|record| self.convert(record, diag))
            .collect()
    }

    fn convert(&self, record: ActionRecord, diag: &mut Diagnostics) -> Option<Action> {
        let Some(description) = record.description.filter(|d| !d.trim().is_empty()) else {
            diag.warn(WarningKind::MissingField, "Action without a description, skipping");
            return None;
        };

        let Some(date) = record.datetime.as_deref().and_then(parse_action_date) else {
            diag.warn(
                WarningKind::InvalidDate,
                format!(
                    "Action {:?} has an unreadable timestamp {:?}, skipping",
                    description, record.datetime
                ),
            );
            return None;
        };

        let actor = match record.chamber.as_deref() {
            Some(name) => self.vocab.chamber(name).unwrap_or_else(|| {
                diag.warn(
                    WarningKind::UnknownChamber,
                    format!("Unknown chamber {:?} on action {:?}", name, description),
                );
                Chamber::Unknown
            }),
            None => Chamber::Unknown,
        };

        let classification = self.classify(record.actioncode.as_deref().unwrap_or(""), diag);

        Some(Action {
            description: description.trim().to_string(),
            date,
            actor,
            classification,
        })
    }
}

pub fn parse_action_date(timestamp: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(timestamp.trim(), ACTION_TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

/// Fetches an action document. An unreachable document is a warning and no
/// actions.
pub async fn fetch_action_records(
    client: &Client,
    url: &str,
    diag: &mut Diagnostics,
) -> Vec<ActionRecord> {
    match client.get_json::<statehouse_api::types::FeedPage>(url).await {
        Ok(page) => decode_items(page.items, "action", diag),
        Err(e) => {
            diag.warn(
                WarningKind::ResourceUnavailable,
                format!("Action document {} unavailable ({}); bill has no actions", url, e),
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, datetime: &str, description: &str) -> ActionRecord {
        ActionRecord {
            chamber: Some("House".into()),
            description: Some(description.into()),
            actioncode: Some(code.into()),
            datetime: Some(datetime.into()),
        }
    }

    #[test]
    fn classifies_single_and_double_tags() {
        let vocab = Vocabulary::load().unwrap();
        let classifier = ActionClassifier::new(&vocab);
        let mut diag = Diagnostics::new();
        assert_eq!(classifier.classify("pass_300", &mut diag), vec![ActionTag::Passage]);
        assert_eq!(
            classifier.classify("intro_102", &mut diag),
            vec![ActionTag::Introduction, ActionTag::Passage]
        );
        assert!(classifier.classify("crpt_301", &mut diag).is_empty());
        assert!(diag.is_empty());
    }

    #[test]
    fn unknown_code_warns_exactly_once() {
        let vocab = Vocabulary::load().unwrap();
        let classifier = ActionClassifier::new(&vocab);
        let mut diag = Diagnostics::new();
        assert_eq!(
            classifier.classify("new_code_999", &mut diag),
            vec![ActionTag::Unclassified]
        );
        assert_eq!(diag.count(WarningKind::UnknownActionCode), 1);
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn ingest_reverses_into_chronological_order() {
        let vocab = Vocabulary::load().unwrap();
        let classifier = ActionClassifier::new(&vocab);
        let mut diag = Diagnostics::new();
        let actions = classifier.ingest(
            vec![
                record("pass_300", "2015-03-20T14:00:00", "Passed"),
                record("ref_ctte_100", "2015-02-11T10:30:00", "Referred to committee"),
                record("intro_100", "2015-02-10T00:00:00", "Introduced"),
            ],
            &mut diag,
        );
        let descriptions: Vec<&str> = actions.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Introduced", "Referred to committee", "Passed"]);
        assert_eq!(actions[0].date, NaiveDate::from_ymd_opt(2015, 2, 10).unwrap());
        assert_eq!(actions[0].actor, Chamber::Lower);
        assert_eq!(actions[1].classification, vec![ActionTag::ReferralCommittee]);
        assert!(diag.is_empty());
    }

    #[test]
    fn bad_dates_and_chambers_degrade() {
        let vocab = Vocabulary::load().unwrap();
        let classifier = ActionClassifier::new(&vocab);
        let mut diag = Diagnostics::new();
        let mut odd_chamber = record("intro_100", "2015-02-10T00:00:00", "Introduced");
        odd_chamber.chamber = Some("Assembly".into());
        let actions = classifier.ingest(
            vec![record("pass_300", "03/20/2015", "Passed"), odd_chamber],
            &mut diag,
        );
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].actor, Chamber::Unknown);
        assert_eq!(diag.count(WarningKind::InvalidDate), 1);
        assert_eq!(diag.count(WarningKind::UnknownChamber), 1);
    }

    #[test]
    fn parses_timestamp_to_calendar_date() {
        assert_eq!(
            parse_action_date("2016-12-31T23:59:59"),
            NaiveDate::from_ymd_opt(2016, 12, 31)
        );
        assert_eq!(parse_action_date("2016-12-31"), None);
    }
}
