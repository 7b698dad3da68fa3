//! Ancillary documents (amendments, fiscal notes, synopses, analyses).
//!
//! Each document type is pulled in bulk from its own feed and bucketed by bill
//! number, which costs a handful of page requests instead of one request per
//! bill.

use std::collections::HashMap;

use statehouse_api::types::DocumentRecord;
use statehouse_api::Client;

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::error::ScrapeError;
use crate::feed::{decode_items, FeedReader};
use crate::model::{Bill, Document, DocumentCategory};
use crate::vocabulary::Vocabulary;

const PDF: &str = "application/pdf";

/// Accumulates document records by bill number. Arrival order is kept and
/// duplicates are not collapsed.
#[derive(Debug)]
pub struct DocumentIndexBuilder {
    category: DocumentCategory,
    by_bill: HashMap<String, Vec<DocumentRecord>>,
}

impl DocumentIndexBuilder {
    pub fn new(category: DocumentCategory) -> Self {
        Self {
            category,
            by_bill: HashMap::new(),
        }
    }

    pub fn push(&mut self, record: DocumentRecord, diag: &mut Diagnostics) {
        match record.billno.as_deref().map(str::trim) {
            Some(billno) if !billno.is_empty() => {
                self.by_bill
                    .entry(billno.to_string())
                    .or_default()
                    .push(record);
            }
            _ => diag.warn(
                WarningKind::MissingField,
                format!("{} record has no bill number: {:?}", self.category, record.link),
            ),
        }
    }

    pub fn finish(self) -> DocumentIndex {
        DocumentIndex {
            category: self.category,
            by_bill: self.by_bill,
        }
    }
}

/// Immutable bill-number → documents mapping for one document type.
#[derive(Debug)]
pub struct DocumentIndex {
    category: DocumentCategory,
    by_bill: HashMap<String, Vec<DocumentRecord>>,
}

impl DocumentIndex {
    /// Reads every page of the category's feed. A failure to fetch any page is
    /// fatal: a partial index would silently drop documents.
    pub async fn build(
        client: &Client,
        assembly_url: &str,
        category: DocumentCategory,
        diag: &mut Diagnostics,
    ) -> Result<Self, ScrapeError> {
        let mut builder = DocumentIndexBuilder::new(category);
        let mut reader = FeedReader::new(client, format!("{}{}", assembly_url, category.endpoint()));
        while let Some(page) = reader.next_page().await? {
            let records: Vec<DocumentRecord> =
                decode_items(page.items, &category.to_string(), diag);
            for record in records {
                builder.push(record, diag);
            }
        }
        let index = builder.finish();
        tracing::info!(
            "Indexed {} {} documents across {} bills",
            index.document_count(),
            category,
            index.bill_count()
        );
        Ok(index)
    }

    pub fn category(&self) -> DocumentCategory {
        self.category
    }

    /// Documents for a bill; a bill without any is an empty slice.
    pub fn documents_for(&self, bill_number: &str) -> &[DocumentRecord] {
        self.by_bill
            .get(bill_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn bill_count(&self) -> usize {
        self.by_bill.len()
    }

    pub fn document_count(&self) -> usize {
        self.by_bill.values().map(Vec::len).sum()
    }
}

/// The four document indices of one general assembly.
#[derive(Debug)]
pub struct AuxiliaryDocuments {
    indices: Vec<DocumentIndex>,
}

impl AuxiliaryDocuments {
    pub async fn build(
        client: &Client,
        assembly_url: &str,
        diag: &mut Diagnostics,
    ) -> Result<Self, ScrapeError> {
        let mut indices = Vec::with_capacity(DocumentCategory::ALL.len());
        for category in DocumentCategory::ALL {
            indices.push(DocumentIndex::build(client, assembly_url, category, diag).await?);
        }
        Ok(Self { indices })
    }

    pub fn from_indices(indices: Vec<DocumentIndex>) -> Self {
        Self { indices }
    }

    /// Attaches every reachable document of every category to `bill`.
    pub async fn attach(
        &self,
        client: &Client,
        bill: &mut Bill,
        vocab: &Vocabulary,
        diag: &mut Diagnostics,
    ) {
        for index in &self.indices {
            let number = bill.number.clone();
            for record in index.documents_for(&number) {
                if let Some(document) =
                    resolve_document(client, record, index.category(), vocab, diag).await
                {
                    bill.add_document(document);
                }
            }
        }
    }
}

async fn resolve_document(
    client: &Client,
    record: &DocumentRecord,
    category: DocumentCategory,
    vocab: &Vocabulary,
    diag: &mut Diagnostics,
) -> Option<Document> {
    let name = document_name(record, category);
    let Some(link) = record.link.as_deref().filter(|l| !l.trim().is_empty()) else {
        diag.warn(
            WarningKind::MissingField,
            format!("The {} document {} has no link, skipping", category, name),
        );
        return None;
    };
    let link = pdf_rendition(&client.url(link));
    if let Err(e) = client.head(&link).await {
        diag.warn(
            WarningKind::ResourceUnavailable,
            format!("The link to doc {} does not exist, skipping ({})", name, e),
        );
        return None;
    }

    let version_label = record
        .legacyver
        .as_deref()
        .and_then(|code| legacy_label(code, &link, vocab, diag));
    let name = match &version_label {
        Some(label) => format!("{}: {}", name, label),
        None => name,
    };

    Some(Document {
        name,
        link,
        media_type: PDF.to_string(),
        category,
        version_label,
    })
}

/// Amendments are named "<number> <version>"; everything else by its own name
/// or, failing that, its category.
pub fn document_name(record: &DocumentRecord, category: DocumentCategory) -> String {
    let non_empty = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let name = if category == DocumentCategory::Amendment {
        let parts: Vec<String> = [non_empty(&record.amendnum), non_empty(&record.version)]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    } else {
        non_empty(&record.name)
    };
    name.unwrap_or_else(|| category.to_string())
}

/// Requests the PDF rendition of a document link.
pub fn pdf_rendition(link: &str) -> String {
    let sep = if link.contains('?') { '&' } else { '?' };
    format!("{}{}format=pdf", link, sep)
}

fn legacy_label(
    code: &str,
    link: &str,
    vocab: &Vocabulary,
    diag: &mut Diagnostics,
) -> Option<String> {
    match vocab.legacy_version(code) {
        Some("") => None,
        Some(label) => Some(label.to_string()),
        None => {
            diag.warn(
                WarningKind::UnknownLegacyVersion,
                format!(
                    "New legacyver; check the type and add it to the vocabulary: {} ({})",
                    code, link
                ),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(billno: Option<&str>) -> DocumentRecord {
        DocumentRecord {
            billno: billno.map(str::to_string),
            link: Some("/doc".into()),
            ..Default::default()
        }
    }

    #[test]
    fn builder_buckets_in_arrival_order() {
        let mut diag = Diagnostics::new();
        let mut builder = DocumentIndexBuilder::new(DocumentCategory::Fiscal);
        let mut first = record(Some("hb1"));
        first.name = Some("first".into());
        let mut second = record(Some("hb1"));
        second.name = Some("second".into());
        builder.push(first, &mut diag);
        builder.push(record(Some("sb2")), &mut diag);
        builder.push(second.clone(), &mut diag);
        builder.push(second, &mut diag);
        builder.push(record(None), &mut diag);
        builder.push(record(Some("  ")), &mut diag);
        let index = builder.finish();

        let hb1 = index.documents_for("hb1");
        assert_eq!(hb1.len(), 3);
        assert_eq!(hb1[0].name.as_deref(), Some("first"));
        assert_eq!(hb1[2].name.as_deref(), Some("second"));
        assert_eq!(index.bill_count(), 2);
        assert_eq!(index.document_count(), 4);
        assert_eq!(diag.count(WarningKind::MissingField), 2);
    }

    #[test]
    fn missing_bill_is_empty_not_error() {
        let index = DocumentIndexBuilder::new(DocumentCategory::Synopsis).finish();
        assert!(index.documents_for("hb404").is_empty());
    }

    #[test]
    fn amendment_names() {
        let mut r = record(Some("hb1"));
        r.amendnum = Some("AM1234".into());
        r.version = Some("X1".into());
        assert_eq!(document_name(&r, DocumentCategory::Amendment), "AM1234 X1");
        r.version = None;
        assert_eq!(document_name(&r, DocumentCategory::Amendment), "AM1234");
        r.amendnum = None;
        assert_eq!(document_name(&r, DocumentCategory::Amendment), "amendment");
    }

    #[test]
    fn other_document_names_fall_back_to_category() {
        let mut r = record(Some("hb1"));
        assert_eq!(document_name(&r, DocumentCategory::Fiscal), "fiscal");
        r.name = Some("".into());
        assert_eq!(document_name(&r, DocumentCategory::Analysis), "analysis");
        r.name = Some("Fiscal Note - As Introduced".into());
        assert_eq!(
            document_name(&r, DocumentCategory::Fiscal),
            "Fiscal Note - As Introduced"
        );
    }

    #[test]
    fn pdf_rendition_appends_format() {
        assert_eq!(pdf_rendition("http://x/doc/1"), "http://x/doc/1?format=pdf");
        assert_eq!(pdf_rendition("http://x/doc?id=1"), "http://x/doc?id=1&format=pdf");
    }

    #[test]
    fn legacy_labels() {
        let vocab = Vocabulary::load().unwrap();
        let mut diag = Diagnostics::new();
        assert_eq!(
            legacy_label("PS", "l", &vocab, &mut diag).as_deref(),
            Some("Passed: Senate")
        );
        assert_eq!(legacy_label("RRH", "l", &vocab, &mut diag), None);
        assert!(diag.is_empty());
        assert_eq!(legacy_label("QQ", "l", &vocab, &mut diag), None);
        assert_eq!(diag.count(WarningKind::UnknownLegacyVersion), 1);
    }
}
