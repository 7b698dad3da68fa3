//! Version grouping and canonical bill reconciliation for the JSON feed.

use std::collections::HashMap;

use statehouse_api::types::{FeedPage, ResourceLink, SponsorRecord, VersionRecord};
use statehouse_api::Client;

use crate::actions::{fetch_action_records, ActionClassifier};
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::documents::AuxiliaryDocuments;
use crate::error::ScrapeError;
use crate::legislators::LegislatorDirectory;
use crate::model::{Bill, BillClassification, Chamber, Scraped, SponsorshipRole};
use crate::vocabulary::Vocabulary;
use crate::votes::VoteRecordBuilder;

/// The two version feeds of a general assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillFeed {
    Bills,
    Resolutions,
}

impl BillFeed {
    pub const ALL: [BillFeed; 2] = [BillFeed::Bills, BillFeed::Resolutions];

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Bills => "bills",
            Self::Resolutions => "resolutions",
        }
    }

    pub fn classification(&self) -> BillClassification {
        match self {
            Self::Bills => BillClassification::Bill,
            Self::Resolutions => BillClassification::Resolution,
        }
    }
}

/// All versions of one bill, in arrival order, keyed by version id.
#[derive(Debug, Clone)]
pub struct VersionGroup {
    pub number: String,
    pub versions: Vec<(String, VersionRecord)>,
}

/// Groups a version feed by bill number. Bills keep the order in which their
/// first version arrived.
#[derive(Debug, Default)]
pub struct VersionGroupsBuilder {
    groups: Vec<VersionGroup>,
    index: HashMap<String, usize>,
}

impl VersionGroupsBuilder {
    pub fn push(&mut self, record: VersionRecord, diag: &mut Diagnostics) {
        let Some(number) = record.number.clone().filter(|n| !n.trim().is_empty()) else {
            diag.warn(
                WarningKind::MissingField,
                format!(
                    "Apparent bill has no information: {:?}",
                    record.shorttitle.as_deref().or(record.longtitle.as_deref())
                ),
            );
            return;
        };
        let Some(version_id) = record.versionid.clone() else {
            diag.warn(
                WarningKind::MissingField,
                format!("A version of {} has no version id, skipping", number),
            );
            return;
        };

        let slot = match self.index.get(&number) {
            Some(&slot) => slot,
            None => {
                self.groups.push(VersionGroup {
                    number: number.clone(),
                    versions: Vec::new(),
                });
                self.index.insert(number.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[slot];
        if group.versions.iter().any(|(id, _)| *id == version_id) {
            diag.warn(
                WarningKind::DuplicateVersion,
                format!(
                    "There are two versions of {} called {}; keeping the first",
                    number, version_id
                ),
            );
            return;
        }
        group.versions.push((version_id, record));
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn finish(self) -> Vec<VersionGroup> {
        self.groups
    }
}

/// "hb1" → "HB 1". Identifiers without a digit are only uppercased.
pub fn display_identifier(number: &str) -> String {
    let number = number.trim();
    match number.find(|c: char| c.is_ascii_digit()) {
        Some(idx) => format!("{} {}", &number[..idx], &number[idx..]).to_uppercase(),
        None => number.to_uppercase(),
    }
}

/// House bills carry an `h` in their compact number.
pub fn chamber_from_number(number: &str) -> Chamber {
    if number.contains('h') {
        Chamber::Lower
    } else {
        Chamber::Upper
    }
}

/// Non-empty short title, else long title, trimmed.
pub fn select_title(short: Option<&str>, long: Option<&str>) -> Option<String> {
    [short, long]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn sponsor_name(sponsor: &SponsorRecord) -> Option<String> {
    let parts: Vec<&str> = [sponsor.firstname.as_deref(), sponsor.lastname.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

pub fn version_media_type(link: &str) -> &'static str {
    if link.ends_with("pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// Builds one canonical bill per version group.
pub struct BillVersionAggregator<'a> {
    client: &'a Client,
    vocab: &'a Vocabulary,
    directory: &'a LegislatorDirectory,
    documents: &'a AuxiliaryDocuments,
    session: String,
    assembly_url: String,
}

impl<'a> BillVersionAggregator<'a> {
    pub fn new(
        client: &'a Client,
        vocab: &'a Vocabulary,
        directory: &'a LegislatorDirectory,
        documents: &'a AuxiliaryDocuments,
        session: u32,
        assembly_url: &str,
    ) -> Self {
        Self {
            client,
            vocab,
            directory,
            documents,
            session: session.to_string(),
            assembly_url: assembly_url.to_string(),
        }
    }

    /// Reconciles one bill. The first version fixes every version-independent
    /// attribute; every version contributes its text link. Returns the bill's
    /// votes followed by the bill, or nothing when the bill has no title.
    pub async fn reconcile(
        &self,
        feed: BillFeed,
        group: VersionGroup,
        diag: &mut Diagnostics,
    ) -> Result<Vec<Scraped>, ScrapeError> {
        let Some((_, first)) = group.versions.first() else {
            return Ok(Vec::new());
        };
        let Some(title) = select_title(first.shorttitle.as_deref(), first.longtitle.as_deref())
        else {
            diag.warn(
                WarningKind::MissingTitle,
                format!("Missing title for {}, not emitting it", group.number),
            );
            return Ok(Vec::new());
        };

        let mut bill = Bill::new(
            &self.session,
            &group.number,
            display_identifier(&group.number),
            chamber_from_number(&group.number),
            title,
            feed.classification(),
        );
        let mut output = Vec::new();
        self.initialize(&mut bill, feed, first, &mut output, diag).await?;

        for (version_id, version) in &group.versions {
            let Some(link) = version.pdf_download_link.as_deref().filter(|l| !l.is_empty())
            else {
                diag.warn(
                    WarningKind::MissingField,
                    format!("Version {} of {} has no document link", version_id, group.number),
                );
                continue;
            };
            let link = self.client.url(link);
            let name = version.version.as_deref().unwrap_or(version_id.as_str());
            if !bill.add_version_link(name, &link, version_media_type(&link)) {
                diag.warn(
                    WarningKind::DuplicateVersion,
                    format!("{} lists {:?} at {} twice, keeping one", bill.identifier, name, link),
                );
            }
        }

        output.push(Scraped::Bill(Box::new(bill)));
        Ok(output)
    }

    async fn initialize(
        &self,
        bill: &mut Bill,
        feed: BillFeed,
        version: &VersionRecord,
        output: &mut Vec<Scraped>,
        diag: &mut Diagnostics,
    ) -> Result<(), ScrapeError> {
        for subject in &version.subjectindexes {
            for entry in [&subject.primary, &subject.secondary].into_iter().flatten() {
                bill.add_subject(entry);
            }
        }

        let source = format!("{}{}/{}", self.assembly_url, feed.endpoint(), bill.number);
        bill.add_source(&source);

        let roles = [
            (SponsorshipRole::Primary, &version.sponsors),
            (SponsorshipRole::Cosponsor, &version.cosponsors),
        ];
        for (role, sponsors) in roles {
            for sponsor in sponsors {
                match sponsor_name(sponsor) {
                    Some(name) => bill.add_sponsorship(name, role),
                    None => diag.warn(
                        WarningKind::MissingField,
                        format!("Nameless sponsor on {}", bill.identifier),
                    ),
                }
            }
        }

        if let Some(link) = first_link(&version.action) {
            let records = fetch_action_records(self.client, &self.client.url(link), diag).await;
            for action in ActionClassifier::new(self.vocab).ingest(records, diag) {
                bill.add_action(action);
            }
        }

        self.documents.attach(self.client, bill, self.vocab, diag).await;

        let builder = VoteRecordBuilder::new(self.client, self.vocab, self.directory);
        let reference = bill.reference();
        for links in [&version.votes, &version.cmtevotes] {
            if let Some(link) = first_link(links) {
                let url = self.client.url(link);
                for vote in builder.build(&url, &reference, diag).await {
                    output.push(Scraped::Vote(Box::new(vote)));
                }
            }
        }

        self.guard_unmodeled("veto", version.veto.as_deref()).await?;
        self.guard_unmodeled("disapprove", version.disapprove.as_deref())
            .await?;
        Ok(())
    }

    /// Fails the run when a veto or disapproval document has any item, or
    /// cannot be read at all.
    async fn guard_unmodeled(
        &self,
        kind: &'static str,
        links: Option<&[ResourceLink]>,
    ) -> Result<(), ScrapeError> {
        let Some(link) = links.and_then(first_link) else {
            return Ok(());
        };
        let url = self.client.url(link);
        match self.client.get_json::<FeedPage>(&url).await {
            Ok(page) if !page.items.is_empty() => Err(ScrapeError::UnhandledEvent { kind, url }),
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!("Could not check {} document {}: {}", kind, url, e);
                Err(ScrapeError::Api(e))
            }
        }
    }
}

fn first_link(links: &[ResourceLink]) -> Option<&str> {
    links
        .first()
        .map(|l| l.link.as_str())
        .filter(|l| !l.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(number: Option<&str>, id: Option<&str>) -> VersionRecord {
        VersionRecord {
            number: number.map(str::to_string),
            versionid: id.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn display_identifier_inserts_space_before_first_digit() {
        assert_eq!(display_identifier("hb1"), "HB 1");
        assert_eq!(display_identifier("sr23"), "SR 23");
        assert_eq!(display_identifier("S120"), "S 120");
        assert_eq!(display_identifier("hcr"), "HCR");
    }

    #[test]
    fn chamber_follows_lowercase_h() {
        assert_eq!(chamber_from_number("hb1"), Chamber::Lower);
        assert_eq!(chamber_from_number("hjr2"), Chamber::Lower);
        assert_eq!(chamber_from_number("sb5"), Chamber::Upper);
        assert_eq!(chamber_from_number("scr3"), Chamber::Upper);
    }

    #[test]
    fn title_prefers_short_then_long() {
        assert_eq!(
            select_title(Some("  Broadband  "), Some("Long")).as_deref(),
            Some("Broadband")
        );
        assert_eq!(select_title(Some("   "), Some(" Long ")).as_deref(), Some("Long"));
        assert_eq!(select_title(None, Some("")), None);
        assert_eq!(select_title(None, None), None);
    }

    #[test]
    fn sponsor_name_joins_first_and_last() {
        let sponsor = SponsorRecord {
            firstname: Some("Rick".into()),
            lastname: Some("Carfagna".into()),
        };
        assert_eq!(sponsor_name(&sponsor).as_deref(), Some("Rick Carfagna"));
        assert_eq!(sponsor_name(&SponsorRecord::default()), None);
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(version_media_type("http://x/hb1.pdf"), "application/pdf");
        assert_eq!(version_media_type("http://x/hb1.docx"), "application/octet-stream");
    }

    #[test]
    fn groups_versions_and_keeps_first_duplicate() {
        let mut diag = Diagnostics::new();
        let mut builder = VersionGroupsBuilder::default();
        let mut first = version(Some("hb1"), Some("101"));
        first.shorttitle = Some("first".into());
        let mut dup = version(Some("hb1"), Some("101"));
        dup.shorttitle = Some("dup".into());
        builder.push(first, &mut diag);
        builder.push(version(Some("sb2"), Some("201")), &mut diag);
        builder.push(dup, &mut diag);
        builder.push(version(Some("hb1"), Some("102")), &mut diag);
        builder.push(version(None, Some("9")), &mut diag);
        builder.push(version(Some("hb3"), None), &mut diag);

        let groups = builder.finish();
        let numbers: Vec<&str> = groups.iter().map(|g| g.number.as_str()).collect();
        assert_eq!(numbers, vec!["hb1", "sb2"]);
        let ids: Vec<&str> = groups[0].versions.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["101", "102"]);
        assert_eq!(groups[0].versions[0].1.shorttitle.as_deref(), Some("first"));
        assert_eq!(diag.count(WarningKind::DuplicateVersion), 1);
        assert_eq!(diag.count(WarningKind::MissingField), 2);
    }
}
