//! Scanning of archived bill pages and the status-report index.
//!
//! The archive is old table-layout HTML. Only a handful of conventions matter,
//! so the markup is scanned directly: anchors by regex, enclosing elements by
//! balancing open and close tags.

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::error::ScrapeError;
use crate::model::{BallotOption, BillRef, Chamber, VoteEvent, VoteResult};

const MISSING_MARKER: &str = "could not be found.";
const ROLL_CALL_DATE_FORMAT: &str = "%m/%d/%Y";

/// `HB1` → `HB_1`; whitespace is dropped first. `None` without a digit.
pub fn archive_key(bill_id: &str) -> Option<String> {
    let compact: String = bill_id.split_whitespace().collect();
    let idx = compact.find(|c: char| c.is_ascii_digit())?;
    Some(format!("{}_{}", &compact[..idx], &compact[idx..]))
}

/// Site-relative path of a bill's archive page.
pub fn archive_path(session: u32, bill_id: &str) -> Option<String> {
    let key = archive_key(bill_id)?;
    let page = if bill_id.contains('R') { "res" } else { "bills" };
    Some(format!("/{}.cfm?ID={}_{}", page, session, key))
}

pub fn is_missing_page(html: &str) -> bool {
    html.contains(MISSING_MARKER)
}

/// A link found in markup, with its text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
    start: usize,
}

/// One roll call as laid out on an archive page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollCall {
    pub date: String,
    /// "House - Third Consideration ..." style text next to the journal link.
    pub details: String,
    pub yeas: Vec<String>,
    pub nays: Vec<String>,
}

/// Everything read from one archive page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePage {
    pub title: Option<String>,
    pub html_link: Option<String>,
    pub pdf_link: Option<String>,
    /// Outbound bill and resolution pages, first occurrence order.
    pub related: Vec<String>,
    pub roll_calls: Vec<RollCall>,
}

impl ArchivePage {
    pub fn parse(html: &str) -> Result<Self, ScrapeError> {
        let anchors = anchors(html)?;
        let find_text = |text: &str| {
            anchors
                .iter()
                .find(|a| a.text == text)
                .map(|a| a.href.clone())
        };

        let mut related: Vec<String> = Vec::new();
        for anchor in &anchors {
            let is_page = anchor.href.starts_with("/bills.cfm") || anchor.href.starts_with("/res.cfm");
            if is_page && !related.contains(&anchor.href) {
                related.push(anchor.href.clone());
            }
        }

        let mut roll_calls = Vec::new();
        for anchor in anchors.iter().filter(|a| a.href.contains("JournalText")) {
            if let Some(roll_call) = roll_call_at(html, anchor)? {
                roll_calls.push(roll_call);
            }
        }

        Ok(Self {
            title: version_title(html)?,
            html_link: find_text("(.html format)"),
            pdf_link: find_text("(.pdf format)"),
            related,
            roll_calls,
        })
    }

    /// The preferred version document: HTML when offered, else PDF.
    pub fn version_document(&self) -> Option<(&str, &'static str)> {
        match (&self.html_link, &self.pdf_link) {
            (Some(link), _) => Some((link.as_str(), "text/html")),
            (None, Some(link)) => Some((link.as_str(), "application/pdf")),
            (None, None) => None,
        }
    }
}

/// Absolute "Excel" links from the status-report table for `session`.
pub fn status_report_links(
    html: &str,
    session: u32,
    page_url: &str,
) -> Result<Vec<String>, ScrapeError> {
    let div_re = Regex::new(r"(?is)<div\b[^>]*>([^<]*)</div>")
        .map_err(|e| ScrapeError::Parse(format!("regex compile error: {}", e)))?;
    let label = session.to_string();
    let Some(div) = div_re
        .captures_iter(html)
        .find(|cap| cap[1].contains(&label))
        .and_then(|cap| cap.get(0))
    else {
        return Ok(Vec::new());
    };

    let lower = html.to_ascii_lowercase();
    let Some(table_start) = lower[div.end()..].find("<table").map(|i| div.end() + i) else {
        return Ok(Vec::new());
    };
    let table_end = element_end(&lower, table_start, "table").unwrap_or(html.len());

    let base = Url::parse(page_url)
        .map_err(|e| ScrapeError::Parse(format!("invalid status report url {}: {}", page_url, e)))?;
    let mut links = Vec::new();
    for anchor in anchors(&html[table_start..table_end])? {
        if !anchor.text.contains("Excel") {
            continue;
        }
        if let Ok(url) = base.join(&anchor.href) {
            links.push(url.to_string());
        }
    }
    Ok(links)
}

/// Converts a roll call into a vote event. A date that cannot be read skips
/// the vote; a chamber other than House or Senate stops the run.
pub fn roll_call_vote(
    roll_call: &RollCall,
    bill: &BillRef,
    source: &str,
    diag: &mut Diagnostics,
) -> Result<Option<VoteEvent>, ScrapeError> {
    let mut parts = roll_call.details.split(" - ");
    let chamber = match parts.next().map(str::trim) {
        Some("House") => Chamber::Lower,
        Some("Senate") => Chamber::Upper,
        other => {
            return Err(ScrapeError::UnexpectedChamber(
                other.unwrap_or_default().to_string(),
            ))
        }
    };
    let motion = parts
        .next()
        .and_then(|m| m.lines().next())
        .map(str::trim)
        .unwrap_or_default();

    let Ok(date) = NaiveDate::parse_from_str(roll_call.date.trim(), ROLL_CALL_DATE_FORMAT) else {
        diag.warn(
            WarningKind::InvalidDate,
            format!(
                "Roll call on {} has unreadable date {:?}, skipping",
                bill.identifier, roll_call.date
            ),
        );
        return Ok(None);
    };

    let result = VoteResult::from_passed(roll_call.yeas.len() > roll_call.nays.len());
    let mut vote = VoteEvent::new(bill.clone(), chamber, date, motion.to_string(), result);
    for name in &roll_call.yeas {
        vote.record(BallotOption::Yes, name.clone());
    }
    for name in &roll_call.nays {
        vote.record(BallotOption::No, name.clone());
    }
    vote.add_source(source);
    Ok(Some(vote))
}

fn anchors(html: &str) -> Result<Vec<Anchor>, ScrapeError> {
    let anchor_re = Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
        .map_err(|e| ScrapeError::Parse(format!("regex compile error: {}", e)))?;
    Ok(anchor_re
        .captures_iter(html)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            Some(Anchor {
                href: decode_entities(cap[1].trim()),
                text: text_content(&cap[2]),
                start: whole.start(),
            })
        })
        .collect())
}

fn version_title(html: &str) -> Result<Option<String>, ScrapeError> {
    let title_re = Regex::new(
        r#"(?is)<font\b[^>]*\bsize\s*=\s*["']?2["']?[^>]*>\s*<a\b[^>]*>(.*?)</a>"#,
    )
    .map_err(|e| ScrapeError::Parse(format!("regex compile error: {}", e)))?;
    Ok(title_re
        .captures(html)
        .map(|cap| text_content(&cap[1]))
        .filter(|t| !t.is_empty()))
}

/// The journal link's row holds the details in its second cell; the row after
/// it holds the Yea and Nay name tables.
fn roll_call_at(html: &str, anchor: &Anchor) -> Result<Option<RollCall>, ScrapeError> {
    let lower = html.to_ascii_lowercase();
    let Some((row_start, row_end)) = enclosing(&lower, anchor.start, "tr") else {
        return Ok(None);
    };
    let row = &html[row_start..row_end];
    let details = cells(row)
        .get(1)
        .map(|cell| text_lines(cell))
        .unwrap_or_default();

    let Some(next_start) = find_open_tag(&lower[row_end..], "tr").map(|i| row_end + i) else {
        return Ok(None);
    };
    let next_end = element_end(&lower, next_start, "tr").unwrap_or(html.len());
    let next_row = &html[next_start..next_end];

    Ok(Some(RollCall {
        date: text_content(&anchor.text),
        details,
        yeas: names_in_div(next_row, "Yea")?,
        nays: names_in_div(next_row, "Nay")?,
    }))
}

fn names_in_div(row: &str, id_fragment: &str) -> Result<Vec<String>, ScrapeError> {
    let div_re = Regex::new(r#"(?is)<div\b[^>]*\bid\s*=\s*["']([^"']*)["']"#)
        .map_err(|e| ScrapeError::Parse(format!("regex compile error: {}", e)))?;
    let lower = row.to_ascii_lowercase();
    let Some(start) = div_re
        .captures_iter(row)
        .find(|cap| cap[1].contains(id_fragment))
        .and_then(|cap| cap.get(0))
        .map(|m| m.start())
    else {
        return Ok(Vec::new());
    };
    let end = element_end(&lower, start, "div").unwrap_or(row.len());
    Ok(cells(&row[start..end])
        .into_iter()
        .map(text_content)
        .filter(|name| !name.is_empty())
        .collect())
}

/// Inner markup of every `<td>` in `fragment`, outermost cells only.
fn cells(fragment: &str) -> Vec<&str> {
    let lower = fragment.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(offset) = find_open_tag(&lower[pos..], "td") {
        let start = pos + offset;
        let Some(end) = element_end(&lower, start, "td") else {
            break;
        };
        let inner_start = lower[start..].find('>').map_or(end, |i| start + i + 1);
        let inner_end = lower[..end].rfind("</td").unwrap_or(end).max(inner_start);
        out.push(&fragment[inner_start..inner_end]);
        pos = end;
    }
    out
}

/// Index of the first `<tag` that is a real tag (not a prefix of a longer name).
fn find_open_tag(lower: &str, tag: &str) -> Option<usize> {
    let needle = format!("<{}", tag);
    let mut pos = 0;
    while let Some(offset) = lower[pos..].find(&needle) {
        let at = pos + offset;
        let next = lower[at + needle.len()..].chars().next();
        if matches!(next, Some(c) if c == '>' || c == '/' || c.is_whitespace()) {
            return Some(at);
        }
        pos = at + needle.len();
    }
    None
}

/// End offset (past the closing `>`) of the element opened at `start`, with
/// nested elements of the same name balanced.
fn element_end(lower: &str, start: usize, tag: &str) -> Option<usize> {
    let close = format!("</{}", tag);
    let mut depth = 0usize;
    let mut pos = start;
    loop {
        let next_open = find_open_tag(&lower[pos..], tag).map(|i| pos + i);
        let next_close = lower[pos..].find(&close).map(|i| pos + i)?;
        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                pos = open + tag.len() + 1;
            }
            _ => {
                depth = depth.saturating_sub(1);
                let end = lower[next_close..].find('>').map_or(lower.len(), |i| next_close + i + 1);
                if depth == 0 {
                    return Some(end);
                }
                pos = end;
            }
        }
    }
}

/// Innermost `tag` element containing `offset`.
fn enclosing(lower: &str, offset: usize, tag: &str) -> Option<(usize, usize)> {
    let needle = format!("<{}", tag);
    let mut search_end = offset;
    while let Some(start) = lower[..search_end].rfind(&needle) {
        if find_open_tag(&lower[start..], tag) == Some(0) {
            if let Some(end) = element_end(lower, start, tag) {
                if end > offset {
                    return Some((start, end));
                }
            }
        }
        search_end = start;
    }
    None
}

fn strip_tags(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    decode_entities(&text)
}

/// Text with tags removed, entities decoded and whitespace collapsed.
fn text_content(markup: &str) -> String {
    strip_tags(markup)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`text_content`], but line breaks survive.
fn text_lines(markup: &str) -> String {
    strip_tags(markup)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<font size="2"><a href="/bills.cfm?ID=129_HB_7">Am. Sub. H. B. No. 7</a></font>
<a href="/BillText129/129_HB_7_I_Y.html">(.html format)</a>
<a href="/BillText129/129_HB_7_I_Y.pdf">(.pdf format)</a>
<a href="/bills.cfm?ID=129_HB_7_PH_N">As Passed by the House</a>
<a href="/bills.cfm?ID=129_HB_7_PH_N">As Passed by the House</a>
<a href="/res.cfm?ID=129_HCR_3">Related resolution</a>
<table>
  <tr>
    <td><font><a href="/JournalText129/HJ-03-14.pdf">03/14/2012</a></font></td>
    <td>House - Third Consideration
        Vote 60-30</td>
  </tr>
  <tr>
    <td><font>
      <div id="HYea1"><table><tr><td>Adams</td><td>Baker</td></tr><tr><td>Carter&nbsp;</td><td></td></tr></table></div>
      <div id="HNay1"><table><tr><td>Dunn</td></tr></table></div>
    </font></td>
  </tr>
  <tr>
    <td><font><a href="/JournalText129/SJ-04-02.pdf">04/02/2012</a></font></td>
    <td>Senate - Concurrence</td>
  </tr>
  <tr><td><font><div id="SYea2"><table><tr><td>Evans</td></tr></table></div></font></td></tr>
</table>
</body></html>
"#;

    fn bill() -> BillRef {
        BillRef {
            session: "129".into(),
            identifier: "HB 7".into(),
        }
    }

    #[test]
    fn archive_keys() {
        assert_eq!(archive_key("HB 7").as_deref(), Some("HB_7"));
        assert_eq!(archive_key("SJR12").as_deref(), Some("SJR_12"));
        assert_eq!(archive_key("HB"), None);
        assert_eq!(archive_path(129, "HB 7").as_deref(), Some("/bills.cfm?ID=129_HB_7"));
        assert_eq!(archive_path(130, "HCR 3").as_deref(), Some("/res.cfm?ID=130_HCR_3"));
    }

    #[test]
    fn parses_versions_and_links() {
        let page = ArchivePage::parse(PAGE).unwrap();
        assert_eq!(page.title.as_deref(), Some("Am. Sub. H. B. No. 7"));
        assert_eq!(
            page.version_document(),
            Some(("/BillText129/129_HB_7_I_Y.html", "text/html"))
        );
        assert_eq!(
            page.related,
            vec![
                "/bills.cfm?ID=129_HB_7",
                "/bills.cfm?ID=129_HB_7_PH_N",
                "/res.cfm?ID=129_HCR_3"
            ]
        );
    }

    #[test]
    fn pdf_is_used_without_html() {
        let page = ArchivePage {
            pdf_link: Some("/x.pdf".into()),
            ..Default::default()
        };
        assert_eq!(page.version_document(), Some(("/x.pdf", "application/pdf")));
        assert_eq!(ArchivePage::default().version_document(), None);
    }

    #[test]
    fn parses_roll_calls() {
        let page = ArchivePage::parse(PAGE).unwrap();
        assert_eq!(page.roll_calls.len(), 2);
        let house = &page.roll_calls[0];
        assert_eq!(house.date, "03/14/2012");
        assert_eq!(house.yeas, vec!["Adams", "Baker", "Carter"]);
        assert_eq!(house.nays, vec!["Dunn"]);
        assert_eq!(house.details, "House - Third Consideration\nVote 60-30");
        let senate = &page.roll_calls[1];
        assert_eq!(senate.yeas, vec!["Evans"]);
        assert!(senate.nays.is_empty());
    }

    #[test]
    fn roll_call_becomes_majority_vote() {
        let mut diag = Diagnostics::new();
        let roll_call = RollCall {
            date: "03/14/2012".into(),
            details: "House - Third Consideration\nVote 60-30".into(),
            yeas: vec!["Adams".into(), "Baker".into()],
            nays: vec!["Dunn".into()],
        };
        let vote = roll_call_vote(&roll_call, &bill(), "http://archive/p", &mut diag)
            .unwrap()
            .unwrap();
        assert_eq!(vote.chamber(), Chamber::Lower);
        assert_eq!(vote.motion_text(), "Third Consideration");
        assert_eq!(vote.result(), VoteResult::Pass);
        assert_eq!(vote.counts().yes, 2);
        assert_eq!(vote.counts().no, 1);
        assert_eq!(vote.date(), NaiveDate::from_ymd_opt(2012, 3, 14).unwrap());
    }

    #[test]
    fn unexpected_chamber_is_fatal() {
        let mut diag = Diagnostics::new();
        let roll_call = RollCall {
            date: "03/14/2012".into(),
            details: "Conference Committee - Report".into(),
            yeas: vec![],
            nays: vec![],
        };
        let err = roll_call_vote(&roll_call, &bill(), "src", &mut diag).unwrap_err();
        assert!(matches!(err, ScrapeError::UnexpectedChamber(c) if c == "Conference Committee"));
    }

    #[test]
    fn tie_fails_and_bad_date_skips() {
        let mut diag = Diagnostics::new();
        let mut roll_call = RollCall {
            date: "03/14/2012".into(),
            details: "Senate - Concurrence".into(),
            yeas: vec!["A".into()],
            nays: vec!["B".into()],
        };
        let vote = roll_call_vote(&roll_call, &bill(), "src", &mut diag).unwrap().unwrap();
        assert_eq!(vote.result(), VoteResult::Fail);
        roll_call.date = "March 14".into();
        assert!(roll_call_vote(&roll_call, &bill(), "src", &mut diag).unwrap().is_none());
        assert_eq!(diag.count(WarningKind::InvalidDate), 1);
    }

    #[test]
    fn status_report_links_for_session() {
        let html = r#"
<div class="label">130th General Assembly</div>
<table><tr><td><a href="/Assets/130/House.xlsx">House Status Report (Excel)</a></td>
<td><a href="/Assets/130/House.pdf">House Status Report (PDF)</a></td></tr></table>
<div class="label">129th General Assembly</div>
<table><tr><td><a href="/Assets/129/House.xls">Excel</a></td>
<td><a href="https://other.example/129/Senate.xls">Senate Excel</a></td></tr></table>
"#;
        let links =
            status_report_links(html, 129, "http://www.legislature.ohio.gov/legislation/status-reports")
                .unwrap();
        assert_eq!(
            links,
            vec![
                "http://www.legislature.ohio.gov/Assets/129/House.xls",
                "https://other.example/129/Senate.xls"
            ]
        );
        assert!(status_report_links(html, 127, "http://x/").unwrap().is_empty());
    }

    #[test]
    fn missing_marker() {
        assert!(is_missing_page("<p>The bill HB 9 could not be found.</p>"));
        assert!(!is_missing_page(PAGE));
    }
}
