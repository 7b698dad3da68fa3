//! Vote documents → canonical vote events.
//!
//! A vote document is a page of items. Each item either carries ballots
//! inline or points one hop further to a payload that does. Everything that
//! cannot be placed in the record (no date, truncated ballot lists) is warned
//! about and skipped; nothing here is fatal.

use chrono::NaiveDate;
use serde_json::Value;
use statehouse_api::types::{ballot_id, BallotField, FeedPage, VoteItem, VoteRecord};
use statehouse_api::Client;

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::legislators::LegislatorDirectory;
use crate::model::{BallotOption, BillRef, Chamber, VoteEvent, VoteResult};
use crate::vocabulary::Vocabulary;

const VOTE_DATE_FORMATS: [&str; 2] = ["%m/%d/%y", "%m/%d/%Y"];

pub struct VoteRecordBuilder<'a> {
    client: &'a Client,
    vocab: &'a Vocabulary,
    directory: &'a LegislatorDirectory,
}

impl<'a> VoteRecordBuilder<'a> {
    pub fn new(
        client: &'a Client,
        vocab: &'a Vocabulary,
        directory: &'a LegislatorDirectory,
    ) -> Self {
        Self {
            client,
            vocab,
            directory,
        }
    }

    /// All vote events of the vote document at `url`, in item order.
    pub async fn build(&self, url: &str, bill: &BillRef, diag: &mut Diagnostics) -> Vec<VoteEvent> {
        let page: FeedPage<VoteItem> = match self.client.get_json(url).await {
            Ok(page) => page,
            Err(e) => {
                diag.warn(
                    WarningKind::ResourceUnavailable,
                    format!("Vote document {} unavailable ({}), skipping", url, e),
                );
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        for item in page.items {
            let record = match item {
                VoteItem::Ballots(record) => record,
                VoteItem::Pointer(pointer) => match self.follow(&pointer.link, diag).await {
                    Some(record) => record,
                    None => continue,
                },
                VoteItem::Other(value) => {
                    diag.warn(
                        WarningKind::MalformedVote,
                        format!("No vote info available in {}, skipping: {}", url, keys_of(&value)),
                    );
                    continue;
                }
            };
            if let Some(event) = normalize_vote(&record, bill, url, self.vocab, self.directory, diag)
            {
                events.push(event);
            }
        }
        events
    }

    /// Resolves a one-hop pointer. The target must carry ballots itself.
    async fn follow(&self, link: &str, diag: &mut Diagnostics) -> Option<Box<VoteRecord>> {
        let url = self.client.url(link);
        match self.client.get_json::<VoteItem>(&url).await {
            Ok(VoteItem::Ballots(record)) => Some(record),
            Ok(_) => {
                diag.warn(
                    WarningKind::MalformedVote,
                    format!("No vote info available at {}, skipping", url),
                );
                None
            }
            Err(e) => {
                diag.warn(
                    WarningKind::ResourceUnavailable,
                    format!("Vote payload {} unavailable ({}), skipping", url, e),
                );
                None
            }
        }
    }
}

/// Builds one vote event from a ballot-carrying record, or `None` (with a
/// warning) when the record cannot be placed.
pub fn normalize_vote(
    record: &VoteRecord,
    bill: &BillRef,
    source: &str,
    vocab: &Vocabulary,
    directory: &LegislatorDirectory,
    diag: &mut Diagnostics,
) -> Option<VoteEvent> {
    let revno = record.revno.as_deref().unwrap_or("?");

    let Some(chamber) = resolve_chamber(record, vocab) else {
        diag.warn(
            WarningKind::UnknownChamber,
            format!("Vote (revno {}) names no chamber, skipping", revno),
        );
        return None;
    };

    let Some(date) = resolve_date(record) else {
        diag.warn(
            WarningKind::InvalidDate,
            format!("No date found for vote (revno {}), skipping", revno),
        );
        return None;
    };

    let motion = [&record.action, &record.motiontype]
        .into_iter()
        .flatten()
        .map(|m| m.trim())
        .find(|m| !m.is_empty())
        .unwrap_or("");

    let nays_raw = record.nays.as_ref().is_some_and(BallotField::is_raw);
    if motion.is_empty() && record.yeas.is_raw() && nays_raw {
        diag.warn(
            WarningKind::MalformedVote,
            format!("Malformed JSON found for vote (revno {}); skipping", revno),
        );
        return None;
    }

    let categories = [
        (BallotOption::Yes, Some(&record.yeas)),
        (BallotOption::No, record.nays.as_ref()),
        (BallotOption::Absent, record.absent.as_ref()),
        (BallotOption::Excused, record.excused.as_ref()),
    ];
    if categories
        .iter()
        .any(|(_, field)| field.is_some_and(BallotField::is_raw))
    {
        diag.warn(
            WarningKind::MalformedVote,
            format!("Vote (revno {}) has a ballot list encoded as text; skipping", revno),
        );
        return None;
    }

    let yes = ballot_count(Some(&record.yeas));
    let no = ballot_count(record.nays.as_ref());
    let result = resolve_result(record, yes, no, vocab, revno, diag);

    let mut event = VoteEvent::new(bill.clone(), chamber, date, motion.to_string(), result);
    for (option, field) in categories {
        for id in field.and_then(BallotField::ids).unwrap_or(&[]) {
            let voter = match directory.resolve(id) {
                Some(name) => name.to_string(),
                None => {
                    diag.warn(
                        WarningKind::UnknownLegislator,
                        format!("Unknown legislator id {:?} in vote (revno {})", id, revno),
                    );
                    id.clone()
                }
            };
            event.record(option, voter);
        }
    }

    for (key, value) in &record.extra {
        if let Some(first) = value.as_array().and_then(|list| list.first()).and_then(ballot_id) {
            if directory.contains(&first) {
                diag.warn(
                    WarningKind::PossibleBallotCategory,
                    format!("{} looks like a vote type that's not being counted. Double check it?", key),
                );
            }
        }
    }

    event.add_source(source);
    Some(event)
}

fn resolve_chamber(record: &VoteRecord, vocab: &Vocabulary) -> Option<Chamber> {
    if let Some(chamber) = record.chamber.as_deref().and_then(|c| vocab.chamber(c)) {
        return Some(chamber);
    }
    record.apn.as_deref().map(|apn| {
        if apn.to_lowercase().contains("house") {
            Chamber::Lower
        } else {
            Chamber::Upper
        }
    })
}

fn resolve_date(record: &VoteRecord) -> Option<NaiveDate> {
    [&record.date, &record.occurred]
        .into_iter()
        .flatten()
        .find_map(|raw| parse_vote_date(raw))
}

pub fn parse_vote_date(raw: &str) -> Option<NaiveDate> {
    VOTE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

/// `results`, then `passed`, then the larger ballot list (ties fail).
fn resolve_result(
    record: &VoteRecord,
    yes: usize,
    no: usize,
    vocab: &Vocabulary,
    revno: &str,
    diag: &mut Diagnostics,
) -> VoteResult {
    let inferred = VoteResult::from_passed(yes > no);
    let token = [&record.results, &record.passed]
        .into_iter()
        .flatten()
        .find_map(|t| t.normalized());
    match token {
        Some(token) => vocab.vote_result(&token).unwrap_or_else(|| {
            diag.warn(
                WarningKind::UnknownVoteResult,
                format!(
                    "Unknown vote result {:?} (revno {}); inferred {} from ballots",
                    token, revno, inferred
                ),
            );
            inferred
        }),
        None => inferred,
    }
}

fn ballot_count(field: Option<&BallotField>) -> usize {
    field.and_then(BallotField::ids).map_or(0, <[String]>::len)
}

fn keys_of(value: &Value) -> String {
    match value.as_object() {
        Some(map) => map.keys().cloned().collect::<Vec<_>>().join(","),
        None => value.to_string(),
    }
}
