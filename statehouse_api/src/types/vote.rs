//! Vote payloads. The feed has served several shapes over the years; each one
//! is an explicit variant here instead of being probed key by key.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{lenient_string, ResourceLink};

/// An entry of a vote document.
///
/// Most entries carry ballots directly. Some are only a pointer to the real
/// payload one request away. Anything else is kept raw for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VoteItem {
    Ballots(Box<VoteRecord>),
    Pointer(ResourceLink),
    Other(Value),
}

/// A roll call with ballots inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub yeas: BallotField,
    #[serde(default)]
    pub nays: Option<BallotField>,
    #[serde(default)]
    pub absent: Option<BallotField>,
    #[serde(default)]
    pub excused: Option<BallotField>,

    #[serde(default)]
    pub chamber: Option<String>,
    /// Alternate identifier that embeds the chamber name (e.g. `house-...`).
    #[serde(default)]
    pub apn: Option<String>,

    /// `%m/%d/%y`
    #[serde(default)]
    pub date: Option<String>,
    /// `%m/%d/%y`, used by older payloads instead of `date`.
    #[serde(default)]
    pub occurred: Option<String>,

    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub motiontype: Option<String>,

    #[serde(default)]
    pub results: Option<ResultToken>,
    #[serde(default)]
    pub passed: Option<ResultToken>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub revno: Option<String>,

    /// Every other field, kept for the unknown-ballot-category check.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A ballot list, or the bare string a truncated payload carries instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BallotField {
    Ids(#[serde(deserialize_with = "ballot_ids")] Vec<String>),
    Raw(String),
}

/// A legislator id as text. Some payloads send ids as bare numbers.
pub fn ballot_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ballot_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(|v| {
            ballot_id(v).ok_or_else(|| serde::de::Error::custom(format!("not a ballot id: {}", v)))
        })
        .collect()
}

impl BallotField {
    pub fn is_raw(&self) -> bool {
        matches!(self, BallotField::Raw(_))
    }

    /// The identifiers, or `None` for a raw string.
    pub fn ids(&self) -> Option<&[String]> {
        match self {
            BallotField::Ids(ids) => Some(ids),
            BallotField::Raw(_) => None,
        }
    }
}

/// A `results` / `passed` value: either a word like "Passed" or a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultToken {
    Flag(bool),
    Text(String),
}

impl ResultToken {
    /// Lowercased token used for synonym lookup; `None` for an empty string.
    pub fn normalized(&self) -> Option<String> {
        match self {
            ResultToken::Flag(b) => Some(b.to_string()),
            ResultToken::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_lowercase())
            }
        }
    }
}
