mod feed;
pub use self::feed::{FeedPage, ResourceLink};

mod version;
pub use self::version::{SponsorRecord, SubjectIndex, VersionRecord};

mod action;
pub use self::action::ActionRecord;

mod vote;
pub use self::vote::{ballot_id, BallotField, ResultToken, VoteItem, VoteRecord};

mod document;
pub use self::document::DocumentRecord;

mod legislator;
pub use self::legislator::LegislatorRecord;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a string, number or boolean and keeps it as text; anything else is `None`.
///
/// The feed is inconsistent about quoting identifiers such as `versionid`
/// and `amendnum`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
