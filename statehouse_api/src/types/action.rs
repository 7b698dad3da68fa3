use serde::{Deserialize, Serialize};

/// One entry of a bill's action history document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actioncode: Option<String>,
    /// Local wall-clock timestamp, `%Y-%m-%dT%H:%M:%S`.
    #[serde(default)]
    pub datetime: Option<String>,
}
