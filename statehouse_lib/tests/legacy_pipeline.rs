use statehouse_api::Client;
use chrono::NaiveDate;
use statehouse_lib::legacy::{date_from_serial, SheetCell, StatusSheet};
use statehouse_lib::{
    ActionTag, BallotOption, Chamber, Diagnostics, LegacyPipeline, ScrapeConfig, ScrapeError,
    Scraped, VoteResult, Vocabulary, WarningKind,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, id: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("ID", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> ScrapeConfig {
    ScrapeConfig {
        archive_base_url: server.uri(),
        status_report_url: format!("{}/legislation/status-reports", server.uri()),
        ..ScrapeConfig::default()
    }
}

fn text(s: &str) -> SheetCell {
    SheetCell::Text(s.to_string())
}

fn status_sheet() -> StatusSheet {
    StatusSheet::from_rows(vec![
        vec![
            text("Bill No."),
            text("Sponsor"),
            text("Cosponsor"),
            text("Title"),
            text("House Intro. Date"),
            text("3rd Consideration"),
            text("Senate Intro. Date"),
            text("Notes"),
        ],
        vec![
            text("HB 7"),
            text("Rep. Adams"),
            text("Rep. Baker"),
            text("To revise school funding"),
            SheetCell::Number(40909.0),
            SheetCell::Number(40982.0),
            SheetCell::Empty,
            text("see journal"),
        ],
        vec![
            text("HB 9"),
            text("Rep. Cruz"),
            SheetCell::Empty,
            text("To designate a state fossil"),
            SheetCell::Number(40910.0),
        ],
    ])
}

#[tokio::test]
async fn sheet_rows_are_enriched_from_the_archive() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/bills.cfm",
        "129_HB_7",
        include_str!("fixtures/archive_hb7.html"),
    )
    .await;
    mount_page(
        &server,
        "/bills.cfm",
        "129_HB_7_PH_N",
        include_str!("fixtures/archive_hb7_ph.html"),
    )
    .await;
    mount_page(
        &server,
        "/bills.cfm",
        "129_HB_9",
        "<html><body>The bill HB 9 could not be found.</body></html>",
    )
    .await;

    let client = Client::with_base_url(&server.uri());
    let vocab = Vocabulary::load().unwrap();
    let config = config(&server);
    let pipeline = LegacyPipeline::new(&client, &vocab, &config);
    let mut diag = Diagnostics::new();
    let batches = pipeline
        .process_sheet(&status_sheet(), 129, "http://reports/129/House.xlsx", &mut diag)
        .await
        .unwrap();
    assert_eq!(batches.len(), 2);

    let hb7 = &batches[0];
    assert_eq!(hb7.len(), 2);
    let Scraped::Vote(vote) = &hb7[0] else {
        panic!("expected a vote first, got {:?}", hb7[0]);
    };
    assert_eq!(vote.chamber(), Chamber::Lower);
    assert_eq!(vote.motion_text(), "Third Consideration");
    assert_eq!(vote.result(), VoteResult::Pass);
    assert_eq!(vote.voters(BallotOption::Yes), vec!["Adams", "Baker"]);
    assert_eq!(vote.voters(BallotOption::No), vec!["Cruz"]);
    assert_eq!(vote.date().to_string(), "2012-03-14");

    let Scraped::Bill(bill) = &hb7[1] else {
        panic!("expected the bill, got {:?}", hb7[1]);
    };
    assert_eq!(bill.identifier, "HB 7");
    assert_eq!(bill.sources, vec!["http://reports/129/House.xlsx"]);
    let actions: Vec<(String, &str, &[ActionTag])> = bill
        .actions
        .iter()
        .map(|a| (a.date.to_string(), a.description.as_str(), a.classification.as_slice()))
        .collect();
    assert_eq!(
        actions,
        vec![
            ("2012-01-01".to_string(), "House Introduced", &[ActionTag::Introduction][..]),
            (
                "2012-03-14".to_string(),
                "3rd Consideration",
                &[ActionTag::Reading3, ActionTag::Passage][..]
            ),
        ]
    );
    let versions: Vec<(&str, &str)> = bill
        .versions
        .iter()
        .map(|v| (v.name.as_str(), v.media_type.as_str()))
        .collect();
    assert_eq!(
        versions,
        vec![
            ("As Introduced", "text/html"),
            ("As Passed by the House", "application/pdf"),
        ]
    );
    assert_eq!(
        bill.versions[0].link,
        format!("{}/BillText129/129_HB_7_I_Y.html", server.uri())
    );

    let hb9 = &batches[1];
    assert_eq!(hb9.len(), 1);
    assert!(matches!(&hb9[0], Scraped::Bill(b) if b.identifier == "HB 9" && b.versions.is_empty()));

    // The companion resolution page is not mounted.
    assert_eq!(diag.count(WarningKind::ResourceUnavailable), 1);
    assert_eq!(diag.count(WarningKind::MissingArchivePage), 1);
}

#[tokio::test]
async fn unexpected_roll_call_chamber_is_fatal() {
    let server = MockServer::start().await;
    let page = include_str!("fixtures/archive_hb7.html")
        .replace("House - Third Consideration", "Joint Session - Third Consideration");
    mount_page(&server, "/bills.cfm", "129_HB_7", &page).await;

    let client = Client::with_base_url(&server.uri());
    let vocab = Vocabulary::load().unwrap();
    let config = config(&server);
    let pipeline = LegacyPipeline::new(&client, &vocab, &config);
    let mut diag = Diagnostics::new();
    let result = pipeline
        .process_sheet(&status_sheet(), 129, "http://reports/x.xlsx", &mut diag)
        .await;
    assert!(matches!(result, Err(ScrapeError::UnexpectedChamber(c)) if c == "Joint Session"));
}

#[tokio::test]
async fn missing_report_download_is_skipped() {
    let server = MockServer::start().await;
    let index = r#"<html><body>
<div>129th General Assembly</div>
<table><tr><td><a href="/reports/129/House.xlsx">House (Excel)</a></td></tr></table>
</body></html>"#;
    Mock::given(method("GET"))
        .and(path("/legislation/status-reports"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/129/House.xlsx"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri());
    let vocab = Vocabulary::load().unwrap();
    let config = config(&server);
    let mut out: Vec<Scraped> = Vec::new();
    let mut diag = Diagnostics::new();
    let stats = LegacyPipeline::new(&client, &vocab, &config)
        .run(129, &mut out, &mut diag)
        .await
        .unwrap();
    assert_eq!(stats.bills, 0);
    assert!(out.is_empty());
    assert_eq!(diag.count(WarningKind::ResourceUnavailable), 1);
}

#[test]
fn workbook_is_read_from_a1_even_when_data_starts_later() {
    let bytes = include_bytes!("fixtures/status_report.xlsx").to_vec();
    let sheet = StatusSheet::from_workbook_bytes(bytes).unwrap();

    // Used range is B2:G3.
    assert_eq!(sheet.nrows(), 3);
    assert_eq!(sheet.ncols(), 7);
    assert_eq!(sheet.cell(0, 0), &SheetCell::Empty);
    assert_eq!(sheet.cell(1, 0), &SheetCell::Empty);
    assert_eq!(sheet.cell(1, 1).text(), "Bill No.");
    assert_eq!(sheet.cell(1, 5).text(), "House Intro. Date");
    assert_eq!(sheet.cell(2, 1).text(), "HB 7");
    assert_eq!(sheet.cell(2, 3), &SheetCell::Empty);

    let SheetCell::Number(serial) = sheet.cell(2, 5) else {
        panic!("expected a date serial, got {:?}", sheet.cell(2, 5));
    };
    assert_eq!(date_from_serial(*serial), NaiveDate::from_ymd_opt(2013, 1, 1));
    assert_eq!(sheet.cell(2, 6), &SheetCell::Number(12.0));
}

#[test]
fn garbage_bytes_are_a_spreadsheet_error() {
    let err = StatusSheet::from_workbook_bytes(b"not a workbook".to_vec()).unwrap_err();
    assert!(matches!(err, ScrapeError::Spreadsheet(_)));
}
