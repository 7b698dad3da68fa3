//! Forward-only reader over a cursor-paginated feed.

use serde::de::DeserializeOwned;
use serde_json::Value;
use statehouse_api::types::FeedPage;
use statehouse_api::Client;

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::error::ScrapeError;

/// Lazily walks a feed by following each page's `nextLink`.
///
/// The reader cannot be restarted: once it has returned `Ok(None)` or an
/// error, every later call returns `Ok(None)`. A fetch failure is returned to
/// the caller; no partial page is produced.
pub struct FeedReader<'a> {
    client: &'a Client,
    next_url: Option<String>,
    pages_read: usize,
}

impl<'a> FeedReader<'a> {
    pub fn new(client: &'a Client, first_url: impl Into<String>) -> Self {
        Self {
            client,
            next_url: Some(first_url.into()),
            pages_read: 0,
        }
    }

    /// Fetches the next page, or `None` once the previous page had no next link.
    pub async fn next_page(&mut self) -> Result<Option<FeedPage>, ScrapeError> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };
        tracing::debug!("Fetching feed page {}", url);
        let page: FeedPage = self.client.get_json(&url).await?;
        self.next_url = page.next().map(|link| self.client.url(link));
        self.pages_read += 1;
        Ok(Some(page))
    }

    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_url.is_none()
    }
}

/// Decodes each raw item on its own, warning about and dropping the ones that
/// do not fit `T`.
pub fn decode_items<T: DeserializeOwned>(
    items: Vec<Value>,
    what: &str,
    diag: &mut Diagnostics,
) -> Vec<T> {
    let mut decoded = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(value) => decoded.push(value),
            Err(e) => diag.warn(
                WarningKind::MissingField,
                format!("Skipping unreadable {} record: {}", what, e),
            ),
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use statehouse_api::types::DocumentRecord;

    #[test]
    fn decode_items_skips_bad_records() {
        let mut diag = Diagnostics::new();
        let items = vec![
            json!({"billno": "hb1", "link": "/a"}),
            json!("not an object"),
            json!({"billno": "hb2"}),
        ];
        let docs: Vec<DocumentRecord> = decode_items(items, "amendment", &mut diag);
        assert_eq!(docs.len(), 2);
        assert_eq!(diag.count(WarningKind::MissingField), 1);
    }
}
