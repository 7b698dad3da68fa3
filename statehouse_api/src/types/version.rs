//! Bill and resolution version records from the `bills` / `resolutions` feeds.

use serde::{Deserialize, Serialize};

use super::{lenient_string, ResourceLink};

/// One published revision of a bill. Several records share a `number`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Compact bill number, e.g. `hb1`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub number: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub versionid: Option<String>,

    #[serde(default)]
    pub shorttitle: Option<String>,

    #[serde(default)]
    pub longtitle: Option<String>,

    #[serde(default)]
    pub subjectindexes: Vec<SubjectIndex>,

    #[serde(default)]
    pub sponsors: Vec<SponsorRecord>,

    #[serde(default)]
    pub cosponsors: Vec<SponsorRecord>,

    /// Link to the action history document.
    #[serde(default)]
    pub action: Vec<ResourceLink>,

    /// Link to the floor vote document.
    #[serde(default)]
    pub votes: Vec<ResourceLink>,

    /// Link to the committee vote document.
    #[serde(default)]
    pub cmtevotes: Vec<ResourceLink>,

    #[serde(default)]
    pub veto: Option<Vec<ResourceLink>>,

    #[serde(default)]
    pub disapprove: Option<Vec<ResourceLink>>,

    /// Version name, e.g. "As Introduced".
    #[serde(default)]
    pub version: Option<String>,

    #[serde(rename = "pdfDownloadLink", default)]
    pub pdf_download_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectIndex {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SponsorRecord {
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}
