//! Ballot identifier → display name directory, fetched once per run.

use std::collections::HashMap;

use statehouse_api::types::LegislatorRecord;
use statehouse_api::Client;

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::error::ScrapeError;
use crate::feed::{decode_items, FeedReader};

/// Source chamber names as used in the legislator feed path.
const CHAMBERS: [&str; 2] = ["House", "Senate"];

#[derive(Debug, Clone, Default)]
pub struct LegislatorDirectory {
    names: HashMap<String, String>,
}

impl LegislatorDirectory {
    /// Reads the legislator feed of both chambers. A later entry for the same
    /// identifier replaces an earlier one.
    pub async fn fetch(
        client: &Client,
        assembly_url: &str,
        diag: &mut Diagnostics,
    ) -> Result<Self, ScrapeError> {
        let mut directory = Self::default();
        for chamber in CHAMBERS {
            let url = format!("{}chamber/{}/legislators?per_page=100", assembly_url, chamber);
            let mut reader = FeedReader::new(client, url);
            while let Some(page) = reader.next_page().await? {
                let records: Vec<LegislatorRecord> = decode_items(page.items, "legislator", diag);
                for record in records {
                    directory.insert_record(record, diag);
                }
            }
        }
        tracing::info!("Loaded {} legislators", directory.len());
        Ok(directory)
    }

    fn insert_record(&mut self, record: LegislatorRecord, diag: &mut Diagnostics) {
        match (record.med_id, record.displayname) {
            (Some(id), Some(name)) if !id.is_empty() => {
                self.names.insert(id, name.trim().to_string());
            }
            (id, _) => diag.warn(
                WarningKind::MissingField,
                format!("Legislator record without id or name: {:?}", id),
            ),
        }
    }

    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LegislatorDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_records_are_skipped() {
        let mut diag = Diagnostics::new();
        let mut directory = LegislatorDirectory::default();
        directory.insert_record(
            LegislatorRecord {
                med_id: Some("1234".into()),
                displayname: Some(" Jane Doe ".into()),
            },
            &mut diag,
        );
        directory.insert_record(
            LegislatorRecord {
                med_id: Some("5678".into()),
                displayname: None,
            },
            &mut diag,
        );
        assert_eq!(directory.resolve("1234"), Some("Jane Doe"));
        assert!(!directory.contains("5678"));
        assert_eq!(diag.count(WarningKind::MissingField), 1);
    }

    #[test]
    fn collects_from_pairs() {
        let directory: LegislatorDirectory = [("L1", "Alice"), ("L2", "Bob")].into_iter().collect();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.resolve("L2"), Some("Bob"));
        assert_eq!(directory.resolve("L3"), None);
    }
}
