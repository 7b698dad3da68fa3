use serde::{Deserialize, Serialize};

use super::lenient_string;

/// An ancillary document (amendment, fiscal note, synopsis or analysis).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Compact number of the bill this document belongs to.
    #[serde(default, deserialize_with = "lenient_string")]
    pub billno: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amendnum: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Legacy version code such as `RH` or `PS`.
    #[serde(default)]
    pub legacyver: Option<String>,
}
