//! Run configuration: source locations, timeouts and session routing.

use std::time::Duration;

use crate::error::ScrapeError;

pub const DEFAULT_API_BASE_URL: &str = "http://search-prod.lis.state.oh.us";
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "http://archives.legislature.state.oh.us";
pub const DEFAULT_STATUS_REPORT_URL: &str =
    "http://www.legislature.ohio.gov/legislation/status-reports";

/// First session with any data at all.
pub const FIRST_SUPPORTED_SESSION: u32 = 128;
/// First session served by the JSON feed.
pub const FIRST_FEED_SESSION: u32 = 131;

/// Which pipeline reconstructs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEra {
    /// Spreadsheet status reports plus the HTML archive.
    Legacy,
    /// The paginated JSON feed.
    Feed,
}

impl SessionEra {
    pub fn for_session(session: u32) -> Result<Self, ScrapeError> {
        if session < FIRST_SUPPORTED_SESSION {
            Err(ScrapeError::UnsupportedSession(session))
        } else if session < FIRST_FEED_SESSION {
            Ok(Self::Legacy)
        } else {
            Ok(Self::Feed)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub api_base_url: String,
    pub archive_base_url: String,
    pub status_report_url: String,
    /// Applied to every feed request; the bills endpoint can take minutes.
    pub feed_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            status_report_url: DEFAULT_STATUS_REPORT_URL.to_string(),
            feed_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ScrapeConfig {
    /// Defaults overridden by `STATEHOUSE_API_URL`, `STATEHOUSE_ARCHIVE_URL`,
    /// `STATEHOUSE_STATUS_REPORT_URL`, `STATEHOUSE_FEED_TIMEOUT_SECS` and
    /// `STATEHOUSE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env_string("STATEHOUSE_API_URL", defaults.api_base_url),
            archive_base_url: env_string("STATEHOUSE_ARCHIVE_URL", defaults.archive_base_url),
            status_report_url: env_string(
                "STATEHOUSE_STATUS_REPORT_URL",
                defaults.status_report_url,
            ),
            feed_timeout: env_secs("STATEHOUSE_FEED_TIMEOUT_SECS", defaults.feed_timeout),
            request_timeout: env_secs("STATEHOUSE_TIMEOUT_SECS", defaults.request_timeout),
        }
    }

    /// Root of one general assembly in the feed, with a trailing slash.
    pub fn assembly_url(&self, session: u32) -> String {
        format!(
            "{}/solarapi/v1/general_assembly_{}/",
            self.api_base_url.trim_end_matches('/'),
            session
        )
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
