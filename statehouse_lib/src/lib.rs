//! Reconciliation core for Ohio General Assembly bills and votes.
//!
//! Reads the legislature's paginated JSON feed (sessions 131+) or the legacy
//! status reports and HTML archive (sessions 128–130) and produces one
//! canonical [`Bill`] per bill number plus its [`VoteEvent`]s.

pub mod actions;
pub mod bills;
pub mod config;
pub mod diagnostics;
pub mod documents;
pub mod error;
pub mod feed;
pub mod legacy;
pub mod legislators;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod vocabulary;
pub mod votes;

pub use statehouse_api;

pub use actions::ActionClassifier;
pub use bills::{BillFeed, BillVersionAggregator, VersionGroup, VersionGroupsBuilder};
pub use config::{ScrapeConfig, SessionEra};
pub use diagnostics::{Diagnostics, Warning, WarningKind};
pub use documents::{AuxiliaryDocuments, DocumentIndex};
pub use error::ScrapeError;
pub use feed::FeedReader;
pub use legacy::LegacyPipeline;
pub use legislators::LegislatorDirectory;
pub use model::{
    Action, ActionTag, Ballot, BallotOption, Bill, BillClassification, BillRef, Chamber, Document,
    DocumentCategory, Scraped, Sponsorship, SponsorshipRole, VersionLink, VoteCounts, VoteEvent,
    VoteResult,
};
pub use pipeline::{scrape_session, ModernPipeline};
pub use sink::{RunStats, Sink};
pub use vocabulary::{Vocabulary, VocabularyError};
pub use votes::VoteRecordBuilder;
