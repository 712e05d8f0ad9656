use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::scheduler::ScheduleVerdict;

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Deliverable,
    Undeliverable,
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deliverable => "deliverable",
            Self::Undeliverable => "undeliverable",
            Self::Unknown => "unknown",
        })
    }
}

/// Domain-level override from the allow/deny lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainRule {
    Allow,
    Deny,
}

/// What the probe phase saw. Empty when the probe never ran.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmtpSubcheck {
    pub verdict: Option<ScheduleVerdict>,
    pub last_reason: Option<String>,
    pub attempts: usize,
    pub exchangers_tried: Vec<String>,
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subchecks {
    pub format: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Vec::is_empty", default))]
    pub format_reasons: Vec<String>,
    /// `None` when no resolution happened.
    pub mx: Option<bool>,
    pub typo: bool,
    pub typo_suggestion: Option<String>,
    pub disposable: bool,
    pub smtp: SmtpSubcheck,
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationVerdict {
    pub email: String,
    pub status: Status,
    pub will_bounce: bool,
    pub reason: String,
    pub subchecks: Subchecks,
}
