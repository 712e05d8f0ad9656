//! Verdict aggregation.
//!
//! [`aggregate`] is pure: it folds the domain rule, the static checks, the
//! MX resolution and the probe report into one [`VerificationVerdict`].
//! Rules apply in order and the first match wins:
//!
//! 1. allowlisted domain: deliverable, `"domain rule"`
//! 2. denylisted domain: undeliverable, `"domain rule"`
//! 3. failed format check: undeliverable, `"invalid format"`
//! 4. probe rejected: undeliverable, with the server's reply as reason
//! 5. probe accepted: deliverable, `"smtp accepted"`
//! 6. anything else: unknown

mod types;

pub use types::{DomainRule, SmtpSubcheck, Status, Subchecks, VerificationVerdict};

use crate::checks::StaticCheckResults;
use crate::scheduler::{ProbeReport, ScheduleVerdict};
use crate::smtp::ProbeOutcome;

pub const REASON_DOMAIN_RULE: &str = "domain rule";
pub const REASON_INVALID_FORMAT: &str = "invalid format";
pub const REASON_SMTP_ACCEPTED: &str = "smtp accepted";
pub const REASON_NO_EXCHANGERS: &str = "no mail exchangers";
pub const REASON_BUDGET_EXHAUSTED: &str = "budget exhausted";
pub const REASON_CANCELLED: &str = "cancelled";

/// Everything the aggregator looks at for one request.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub domain_rule: Option<DomainRule>,
    pub checks: &'a StaticCheckResults,
    /// Number of exchangers resolved, `None` if resolution was skipped.
    pub exchangers: Option<usize>,
    pub probe: Option<&'a ProbeReport>,
}

pub fn aggregate(email: &str, signals: Signals<'_>, unknown_means_bounce: bool) -> VerificationVerdict {
    let (status, reason) = classify(&signals);
    let will_bounce = match status {
        Status::Deliverable => false,
        Status::Undeliverable => true,
        Status::Unknown => unknown_means_bounce,
    };

    let checks = signals.checks;
    VerificationVerdict {
        email: email.to_string(),
        status,
        will_bounce,
        reason,
        subchecks: Subchecks {
            format: checks.format_valid,
            format_reasons: checks.format_reasons.clone(),
            mx: signals.exchangers.map(|count| count > 0),
            typo: checks.typo_valid,
            typo_suggestion: checks.typo_suggestion.clone(),
            disposable: checks.disposable_valid,
            smtp: signals.probe.map(smtp_subcheck).unwrap_or_default(),
        },
    }
}

fn classify(signals: &Signals<'_>) -> (Status, String) {
    match signals.domain_rule {
        Some(DomainRule::Allow) => return (Status::Deliverable, REASON_DOMAIN_RULE.into()),
        Some(DomainRule::Deny) => return (Status::Undeliverable, REASON_DOMAIN_RULE.into()),
        None => {}
    }
    if !signals.checks.format_valid {
        return (Status::Undeliverable, REASON_INVALID_FORMAT.into());
    }

    let unknown = |reason: &str| (Status::Unknown, reason.to_string());
    match signals.probe.map(|report| &report.verdict) {
        Some(ScheduleVerdict::Decisive {
            outcome: ProbeOutcome::Rejected(detail),
        }) => (Status::Undeliverable, detail.clone()),
        Some(ScheduleVerdict::Decisive {
            outcome: ProbeOutcome::Accepted,
        }) => (Status::Deliverable, REASON_SMTP_ACCEPTED.into()),
        Some(ScheduleVerdict::Cancelled) => unknown(REASON_CANCELLED),
        Some(ScheduleVerdict::NoExchangers) | None => unknown(REASON_NO_EXCHANGERS),
        Some(
            ScheduleVerdict::Exhausted { .. }
            | ScheduleVerdict::DeadlineReached { .. }
            | ScheduleVerdict::Decisive {
                outcome: ProbeOutcome::Indeterminate(_),
            },
        ) => unknown(REASON_BUDGET_EXHAUSTED),
    }
}

fn smtp_subcheck(report: &ProbeReport) -> SmtpSubcheck {
    SmtpSubcheck {
        verdict: Some(report.verdict.clone()),
        last_reason: report.last_reason().map(str::to_string),
        attempts: report.attempts.len(),
        exchangers_tried: report.exchangers_tried(),
    }
}
