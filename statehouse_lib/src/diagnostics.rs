//! Operator-visible warnings collected over a run.
//!
//! Every non-fatal condition is logged through `tracing` and also kept here,
//! so the binary can print a summary and tests can assert on it.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningKind {
    /// A feed item lacked a required field and was skipped.
    MissingField,
    /// Two versions of one bill share a version id.
    DuplicateVersion,
    /// A bill had no usable title and was not emitted.
    MissingTitle,
    UnknownActionCode,
    UnknownChamber,
    UnknownVoteResult,
    UnknownLegacyVersion,
    InvalidDate,
    /// A document, vote link or archive page could not be fetched.
    ResourceUnavailable,
    MalformedVote,
    /// A list-valued vote field looks like an uncounted ballot category.
    PossibleBallotCategory,
    UnknownLegislator,
    /// A legacy bill has no page in the archive.
    MissingArchivePage,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingField => "missing field",
            Self::DuplicateVersion => "duplicate version",
            Self::MissingTitle => "missing title",
            Self::UnknownActionCode => "unknown action code",
            Self::UnknownChamber => "unknown chamber",
            Self::UnknownVoteResult => "unknown vote result",
            Self::UnknownLegacyVersion => "unknown legacy version",
            Self::InvalidDate => "invalid date",
            Self::ResourceUnavailable => "resource unavailable",
            Self::MalformedVote => "malformed vote",
            Self::PossibleBallotCategory => "possible ballot category",
            Self::UnknownLegislator => "unknown legislator",
            Self::MissingArchivePage => "missing archive page",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}: {}", kind, message);
        self.warnings.push(Warning { kind, message });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warning counts per kind, in a stable order.
    pub fn summary(&self) -> BTreeMap<WarningKind, usize> {
        let mut counts = BTreeMap::new();
        for w in &self.warnings {
            *counts.entry(w.kind).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_groups_by_kind() {
        let mut diag = Diagnostics::new();
        diag.warn(WarningKind::MalformedVote, "revno 3");
        diag.warn(WarningKind::MissingField, "no number");
        diag.warn(WarningKind::MalformedVote, "revno 4");
        assert_eq!(diag.count(WarningKind::MalformedVote), 2);
        let summary = diag.summary();
        assert_eq!(summary.get(&WarningKind::MissingField), Some(&1));
        assert_eq!(summary.len(), 2);
        assert_eq!(diag.warnings()[1].message, "no number");
    }
}
