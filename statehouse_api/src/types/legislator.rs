use serde::{Deserialize, Serialize};

use super::lenient_string;

/// A member entry from `chamber/{chamber}/legislators`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegislatorRecord {
    /// Short identifier used in ballot lists.
    #[serde(default, deserialize_with = "lenient_string")]
    pub med_id: Option<String>,
    #[serde(default)]
    pub displayname: Option<String>,
}
