use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::smtp::{ProbeOutcome, ProbeTarget};

/// Limits applied by [`run_probes`](super::run_probes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Ports tried for every exchanger, in order.
    pub ports: Vec<u16>,
    /// Attempts per (exchanger, port) pair; values below 1 count as 1.
    pub attempts_per_target: u32,
    /// Hard cap on attempts across all targets.
    pub max_total_attempts: Option<u32>,
    /// Wall-clock ceiling for the whole loop.
    pub total_budget: Duration,
}

/// One attempt as observed by the scheduler.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub target: ProbeTarget,
    /// 1-based attempt number for this target.
    pub attempt: u32,
    pub outcome: ProbeOutcome,
}

/// How the scheduling loop ended.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleVerdict {
    /// An attempt returned `Accepted` or `Rejected`.
    Decisive { outcome: ProbeOutcome },
    /// Every planned attempt (or the attempt cap) was used without a decisive
    /// answer.
    Exhausted { last_reason: String },
    /// The wall-clock budget ran out.
    DeadlineReached { last_reason: Option<String> },
    /// The MX list was empty; nothing was probed.
    NoExchangers,
    /// The caller cancelled the request.
    Cancelled,
}

impl fmt::Display for ScheduleVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decisive { outcome } => write!(f, "{outcome}"),
            Self::Exhausted { last_reason } => write!(f, "attempts exhausted ({last_reason})"),
            Self::DeadlineReached {
                last_reason: Some(reason),
            } => write!(f, "time budget exhausted ({reason})"),
            Self::DeadlineReached { last_reason: None } => f.write_str("time budget exhausted"),
            Self::NoExchangers => f.write_str("no mail exchangers"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub verdict: ScheduleVerdict,
    pub attempts: Vec<AttemptRecord>,
}

impl ProbeReport {
    /// Reason of the most recent inconclusive attempt.
    pub fn last_reason(&self) -> Option<&str> {
        super::last_indeterminate(&self.attempts)
    }

    /// Exchangers contacted, in probe order, without repeats.
    pub fn exchangers_tried(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.attempts
            .iter()
            .map(|record| &record.target.exchanger.hostname)
            .filter(|host| seen.insert(host.as_str()))
            .cloned()
            .collect()
    }
}
