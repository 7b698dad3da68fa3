//! Lookup tables for the source's vocabulary: action codes, chamber names,
//! vote-result words, legacy document stages and status-report headers.
//!
//! The tables live in `seed_data/vocabulary.yml` and are embedded at compile
//! time, following the same `include_str!` pattern as the other seed files.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{ActionTag, Chamber, VoteResult};

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Failed to parse vocabulary YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Duplicate entry in {table}: {key}")]
    Duplicate { table: &'static str, key: String },
    #[error("Action code {0} lists more than two tags")]
    TooManyTags(String),
    #[error("Chamber name {0} must map to lower or upper")]
    InvalidChamber(String),
}

#[derive(Deserialize, Debug)]
struct VocabularyFile {
    action_codes: Vec<ActionCodeEntry>,
    chambers: Vec<ChamberEntry>,
    vote_results: Vec<VoteResultEntry>,
    legacy_versions: Vec<LegacyVersionEntry>,
    legacy_headers: Vec<LegacyHeaderEntry>,
}

#[derive(Deserialize, Debug)]
struct ActionCodeEntry {
    code: String,
    tags: Vec<ActionTag>,
}

#[derive(Deserialize, Debug)]
struct ChamberEntry {
    name: String,
    chamber: Chamber,
}

#[derive(Deserialize, Debug)]
struct VoteResultEntry {
    token: String,
    result: VoteResult,
}

#[derive(Deserialize, Debug)]
struct LegacyVersionEntry {
    code: String,
    label: String,
}

#[derive(Deserialize, Debug, Clone)]
struct LegacyHeaderEntry {
    header: String,
    #[serde(default)]
    description: Option<String>,
    tags: Vec<ActionTag>,
}

/// Result of looking up an action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// A known code with zero, one or two tags.
    Known(&'a [ActionTag]),
    /// A code missing from the table.
    Unknown,
}

impl Classification<'_> {
    /// Tags to store on an action; unknown codes become `[unclassified]`.
    pub fn tags(&self) -> Vec<ActionTag> {
        match self {
            Classification::Known(tags) => tags.to_vec(),
            Classification::Unknown => vec![ActionTag::Unclassified],
        }
    }
}

/// Meaning of a status-report column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMeaning {
    pub description: String,
    pub tags: Vec<ActionTag>,
}

/// The loaded vocabulary. Built once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    action_codes: HashMap<String, Vec<ActionTag>>,
    chambers: HashMap<String, Chamber>,
    vote_results: HashMap<String, VoteResult>,
    legacy_versions: HashMap<String, String>,
    legacy_headers: HashMap<String, LegacyHeaderEntry>,
}

impl Vocabulary {
    /// Load the embedded vocabulary.
    pub fn load() -> Result<Self, VocabularyError> {
        let yaml_content = include_str!("../../seed_data/vocabulary.yml");
        Self::parse(yaml_content)
    }

    /// Parse and validate vocabulary tables from YAML content.
    pub fn parse(yaml_content: &str) -> Result<Self, VocabularyError> {
        let file: VocabularyFile = serde_yml::from_str(yaml_content)?;

        let mut action_codes = HashMap::new();
        for entry in file.action_codes {
            if entry.tags.len() > 2 {
                return Err(VocabularyError::TooManyTags(entry.code));
            }
            if action_codes.contains_key(&entry.code) {
                return Err(VocabularyError::Duplicate {
                    table: "action_codes",
                    key: entry.code,
                });
            }
            action_codes.insert(entry.code, entry.tags);
        }

        let mut chambers = HashMap::new();
        for entry in file.chambers {
            if !matches!(entry.chamber, Chamber::Lower | Chamber::Upper) {
                return Err(VocabularyError::InvalidChamber(entry.name));
            }
            if chambers.insert(entry.name.clone(), entry.chamber).is_some() {
                return Err(VocabularyError::Duplicate {
                    table: "chambers",
                    key: entry.name,
                });
            }
        }

        let mut vote_results = HashMap::new();
        for entry in file.vote_results {
            let token = entry.token.to_lowercase();
            if vote_results.insert(token.clone(), entry.result).is_some() {
                return Err(VocabularyError::Duplicate {
                    table: "vote_results",
                    key: token,
                });
            }
        }

        let mut legacy_versions = HashMap::new();
        for entry in file.legacy_versions {
            if legacy_versions.insert(entry.code.clone(), entry.label).is_some() {
                return Err(VocabularyError::Duplicate {
                    table: "legacy_versions",
                    key: entry.code,
                });
            }
        }

        let mut legacy_headers = HashMap::new();
        for entry in file.legacy_headers {
            let key = entry.header.clone();
            if legacy_headers.insert(key.clone(), entry).is_some() {
                return Err(VocabularyError::Duplicate {
                    table: "legacy_headers",
                    key,
                });
            }
        }

        Ok(Self {
            action_codes,
            chambers,
            vote_results,
            legacy_versions,
            legacy_headers,
        })
    }

    pub fn action(&self, code: &str) -> Classification<'_> {
        match self.action_codes.get(code) {
            Some(tags) => Classification::Known(tags),
            None => Classification::Unknown,
        }
    }

    /// Chamber for a source chamber name ("House", "senate", ...).
    pub fn chamber(&self, name: &str) -> Option<Chamber> {
        self.chambers.get(name).copied()
    }

    /// Result for a lowercased result word.
    pub fn vote_result(&self, token: &str) -> Option<VoteResult> {
        self.vote_results.get(&token.to_lowercase()).copied()
    }

    /// Label for a legacy stage code. `Some("")` is a known code with no label.
    pub fn legacy_version(&self, code: &str) -> Option<&str> {
        self.legacy_versions.get(code).map(String::as_str)
    }

    /// Description and tags for a status-report header; unknown headers are "other".
    pub fn legacy_header(&self, header: &str) -> HeaderMeaning {
        match self.legacy_headers.get(header) {
            Some(entry) => HeaderMeaning {
                description: entry
                    .description
                    .clone()
                    .unwrap_or_else(|| header.to_string()),
                tags: entry.tags.clone(),
            },
            None => HeaderMeaning {
                description: header.to_string(),
                tags: vec![ActionTag::Other],
            },
        }
    }

    pub fn action_code_count(&self) -> usize {
        self.action_codes.len()
    }
}
