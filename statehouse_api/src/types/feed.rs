use serde::{Deserialize, Serialize};

/// One page of a paginated feed: a batch of items plus an optional cursor.
///
/// Items default to raw JSON so a single malformed record cannot fail the
/// whole page; callers decode each item individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage<T = serde_json::Value> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Relative link to the next page. Absent on the last page.
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

impl<T> FeedPage<T> {
    /// The next-page link, treating an empty string the same as a missing one.
    pub fn next(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.trim().is_empty())
    }
}

/// A one-hop pointer to a sub-resource (`{"link": "/solarapi/v1/..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub link: String,
}
