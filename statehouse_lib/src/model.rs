//! Canonical bill and vote records produced by both pipelines.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Acting or originating body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    Lower,
    Upper,
    Executive,
    Unknown,
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lower => write!(f, "lower"),
            Self::Upper => write!(f, "upper"),
            Self::Executive => write!(f, "executive"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillClassification {
    Bill,
    Resolution,
}

impl fmt::Display for BillClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bill => write!(f, "bill"),
            Self::Resolution => write!(f, "resolution"),
        }
    }
}

/// Canonical action taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionTag {
    ReferralCommittee,
    Introduction,
    #[serde(rename = "reading-1")]
    Reading1,
    #[serde(rename = "reading-3")]
    Reading3,
    Passage,
    AmendmentPassage,
    AmendmentFailure,
    ExecutiveReceipt,
    ExecutiveSignature,
    Other,
    /// The source code is not in the action table.
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorshipRole {
    Primary,
    Cosponsor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsorship {
    pub name: String,
    pub classification: SponsorshipRole,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub description: String,
    pub date: NaiveDate,
    pub actor: Chamber,
    /// Zero or more tags; `[unclassified]` when the code was not recognized.
    pub classification: Vec<ActionTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Amendment,
    Fiscal,
    Synopsis,
    Analysis,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 4] = [
        DocumentCategory::Amendment,
        DocumentCategory::Fiscal,
        DocumentCategory::Synopsis,
        DocumentCategory::Analysis,
    ];

    /// Feed endpoint name under the general assembly root. The plural
    /// spellings are the service's own.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Amendment => "amendments",
            Self::Fiscal => "fiscals",
            Self::Synopsis => "synopsiss",
            Self::Analysis => "analysiss",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amendment => write!(f, "amendment"),
            Self::Fiscal => write!(f, "fiscal"),
            Self::Synopsis => write!(f, "synopsis"),
            Self::Analysis => write!(f, "analysis"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub link: String,
    pub media_type: String,
    pub category: DocumentCategory,
    /// Resolved legacy stage label, when the source carried a non-empty one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLink {
    pub name: String,
    pub link: String,
    pub media_type: String,
}

/// One canonical bill per (session, number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub session: String,
    /// Compact source number, e.g. `hb1`.
    pub number: String,
    /// Display identifier, e.g. `HB 1`.
    pub identifier: String,
    pub chamber: Chamber,
    pub title: String,
    pub classification: BillClassification,
    pub subjects: Vec<String>,
    pub sponsorships: Vec<Sponsorship>,
    pub actions: Vec<Action>,
    pub documents: Vec<Document>,
    pub versions: Vec<VersionLink>,
    pub sources: Vec<String>,
}

impl Bill {
    pub fn new(
        session: &str,
        number: &str,
        identifier: String,
        chamber: Chamber,
        title: String,
        classification: BillClassification,
    ) -> Self {
        Self {
            session: session.to_string(),
            number: number.to_string(),
            identifier,
            chamber,
            title,
            classification,
            subjects: Vec::new(),
            sponsorships: Vec::new(),
            actions: Vec::new(),
            documents: Vec::new(),
            versions: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Adds a subject unless it is blank or already present.
    pub fn add_subject(&mut self, subject: &str) {
        let subject = subject.trim();
        if subject.is_empty() || self.subjects.iter().any(|s| s == subject) {
            return;
        }
        self.subjects.push(subject.to_string());
    }

    pub fn add_sponsorship(&mut self, name: String, role: SponsorshipRole) {
        self.sponsorships.push(Sponsorship {
            name,
            classification: role,
            primary: role == SponsorshipRole::Primary,
        });
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Appends a version link unless the same name and link are already on
    /// record. Distinct versions sharing one document each keep an entry.
    pub fn add_version_link(&mut self, name: &str, link: &str, media_type: &str) -> bool {
        if self.versions.iter().any(|v| v.name == name && v.link == link) {
            return false;
        }
        self.versions.push(VersionLink {
            name: name.to_string(),
            link: link.to_string(),
            media_type: media_type.to_string(),
        });
        true
    }

    pub fn add_source(&mut self, url: &str) {
        if !self.sources.iter().any(|s| s == url) {
            self.sources.push(url.to_string());
        }
    }

    pub fn reference(&self) -> BillRef {
        BillRef {
            session: self.session.clone(),
            identifier: self.identifier.clone(),
        }
    }
}

/// Identifies the bill a vote belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillRef {
    pub session: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteResult {
    Pass,
    Fail,
}

impl VoteResult {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl fmt::Display for VoteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallotOption {
    Yes,
    No,
    Absent,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub option: BallotOption,
    pub voter: String,
}

/// Tallies derived from recorded ballots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub yes: usize,
    pub no: usize,
    pub absent: usize,
    pub excused: usize,
}

/// A roll call on one motion, attached to exactly one bill.
///
/// Ballots can only be added through [`VoteEvent::record`], which keeps
/// `counts` equal to the number of ballots per option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    bill: BillRef,
    chamber: Chamber,
    date: NaiveDate,
    motion_text: String,
    result: VoteResult,
    ballots: Vec<Ballot>,
    counts: VoteCounts,
    sources: Vec<String>,
}

impl VoteEvent {
    pub fn new(
        bill: BillRef,
        chamber: Chamber,
        date: NaiveDate,
        motion_text: String,
        result: VoteResult,
    ) -> Self {
        Self {
            bill,
            chamber,
            date,
            motion_text,
            result,
            ballots: Vec::new(),
            counts: VoteCounts::default(),
            sources: Vec::new(),
        }
    }

    pub fn record(&mut self, option: BallotOption, voter: String) {
        match option {
            BallotOption::Yes => self.counts.yes += 1,
            BallotOption::No => self.counts.no += 1,
            BallotOption::Absent => self.counts.absent += 1,
            BallotOption::Excused => self.counts.excused += 1,
        }
        self.ballots.push(Ballot { option, voter });
    }

    pub fn add_source(&mut self, url: &str) {
        self.sources.push(url.to_string());
    }

    pub fn bill(&self) -> &BillRef {
        &self.bill
    }

    pub fn chamber(&self) -> Chamber {
        self.chamber
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn motion_text(&self) -> &str {
        &self.motion_text
    }

    pub fn result(&self) -> VoteResult {
        self.result
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn counts(&self) -> VoteCounts {
        self.counts
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Voters recorded under `option`, in recording order.
    pub fn voters(&self, option: BallotOption) -> Vec<&str> {
        self.ballots
            .iter()
            .filter(|b| b.option == option)
            .map(|b| b.voter.as_str())
            .collect()
    }
}

/// One record handed to the output collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scraped {
    Bill(Box<Bill>),
    Vote(Box<VoteEvent>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bill() -> Bill {
        Bill::new(
            "131",
            "hb1",
            "HB 1".to_string(),
            Chamber::Lower,
            "Broadband".to_string(),
            BillClassification::Bill,
        )
    }

    #[test]
    fn subjects_are_deduplicated() {
        let mut bill = sample_bill();
        bill.add_subject("Taxation");
        bill.add_subject(" Taxation ");
        bill.add_subject("");
        bill.add_subject("Schools");
        assert_eq!(bill.subjects, vec!["Taxation", "Schools"]);
    }

    #[test]
    fn version_links_accumulate_per_version() {
        let mut bill = sample_bill();
        assert!(bill.add_version_link("As Introduced", "http://x/1.pdf", "application/pdf"));
        assert!(!bill.add_version_link("As Introduced", "http://x/1.pdf", "application/pdf"));
        assert!(bill.add_version_link("As Reported", "http://x/1.pdf", "application/pdf"));
        assert_eq!(bill.versions.len(), 2);
        assert_eq!(bill.versions[1].name, "As Reported");
    }

    #[test]
    fn sponsorship_primary_flag_follows_role() {
        let mut bill = sample_bill();
        bill.add_sponsorship("Rick Carfagna".into(), SponsorshipRole::Primary);
        bill.add_sponsorship("Jay Edwards".into(), SponsorshipRole::Cosponsor);
        assert!(bill.sponsorships[0].primary);
        assert!(!bill.sponsorships[1].primary);
        assert_eq!(bill.sponsorships[1].classification, SponsorshipRole::Cosponsor);
    }

    #[test]
    fn counts_track_recorded_ballots() {
        let date = NaiveDate::from_ymd_opt(2015, 3, 14).unwrap();
        let mut vote = VoteEvent::new(
            sample_bill().reference(),
            Chamber::Lower,
            date,
            "Third Consideration".into(),
            VoteResult::Pass,
        );
        for name in ["A", "B", "C"] {
            vote.record(BallotOption::Yes, name.into());
        }
        vote.record(BallotOption::Excused, "D".into());
        assert_eq!(
            vote.counts(),
            VoteCounts {
                yes: 3,
                no: 0,
                absent: 0,
                excused: 1
            }
        );
        assert_eq!(vote.voters(BallotOption::Yes), vec!["A", "B", "C"]);
    }

    #[test]
    fn action_tags_serialize_to_taxonomy_names() {
        let tags = vec![
            ActionTag::ReferralCommittee,
            ActionTag::Reading1,
            ActionTag::Reading3,
            ActionTag::AmendmentFailure,
            ActionTag::ExecutiveSignature,
        ];
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(
            json,
            r#"["referral-committee","reading-1","reading-3","amendment-failure","executive-signature"]"#
        );
    }

    #[test]
    fn scraped_is_tagged() {
        let json = serde_json::to_value(Scraped::Bill(Box::new(sample_bill()))).unwrap();
        assert_eq!(json["type"], "bill");
        assert_eq!(json["identifier"], "HB 1");
        assert_eq!(json["chamber"], "lower");
    }
}
