//! Fan-out of SMTP attempts over exchangers, ports and retries.

mod types;

pub use types::{AttemptRecord, ProbeReport, SchedulePolicy, ScheduleVerdict};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::mx::MailExchanger;
use crate::smtp::{ProbeOutcome, ProbeTarget, TranscriptClient};

const LOG_TARGET: &str = "mailprobe::scheduler";

/// Ordered probe plan: exchangers by ascending priority (stable), then ports
/// in policy order, then attempt number.
pub fn plan(exchangers: &[MailExchanger], policy: &SchedulePolicy) -> Vec<(ProbeTarget, u32)> {
    let attempts = policy.attempts_per_target.max(1);
    let mut ordered: Vec<&MailExchanger> = exchangers.iter().collect();
    ordered.sort_by_key(|exchanger| exchanger.priority);

    let mut out = Vec::with_capacity(ordered.len() * policy.ports.len() * attempts as usize);
    for exchanger in ordered {
        for &port in &policy.ports {
            for attempt in 1..=attempts {
                out.push((ProbeTarget::new(exchanger.clone(), port), attempt));
            }
        }
    }
    out
}

/// Runs attempts one at a time until one is decisive, the plan or a budget
/// is used up, or `cancel` fires.
pub async fn run_probes<C>(
    client: &C,
    exchangers: &[MailExchanger],
    recipient: &str,
    policy: &SchedulePolicy,
    cancel: &CancellationToken,
) -> ProbeReport
where
    C: TranscriptClient,
{
    if exchangers.is_empty() {
        debug!(target: LOG_TARGET, recipient, "no exchangers, skipping probe");
        return ProbeReport {
            verdict: ScheduleVerdict::NoExchangers,
            attempts: Vec::new(),
        };
    }

    let deadline = Instant::now() + policy.total_budget;
    let mut attempts: Vec<AttemptRecord> = Vec::new();
    let finish = |verdict: ScheduleVerdict, attempts: Vec<AttemptRecord>| ProbeReport {
        verdict,
        attempts,
    };

    for (target, attempt) in plan(exchangers, policy) {
        if cancel.is_cancelled() {
            info!(target: LOG_TARGET, recipient, "probe cancelled");
            return finish(ScheduleVerdict::Cancelled, attempts);
        }
        if policy
            .max_total_attempts
            .is_some_and(|cap| attempts.len() >= cap as usize)
        {
            break;
        }
        if Instant::now() >= deadline {
            return deadline_reached(recipient, attempts);
        }

        debug!(target: LOG_TARGET, probe = %target, attempt, "starting attempt");
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(target: LOG_TARGET, recipient, probe = %target, "probe cancelled mid-attempt");
                return finish(ScheduleVerdict::Cancelled, attempts);
            }
            _ = tokio::time::sleep_until(deadline) => {
                return deadline_reached(recipient, attempts);
            }
            outcome = client.probe(&target, recipient) => outcome,
        };

        let decisive = outcome.is_decisive();
        attempts.push(AttemptRecord {
            target: target.clone(),
            attempt,
            outcome: outcome.clone(),
        });

        if decisive {
            info!(target: LOG_TARGET, recipient, probe = %target, %outcome, "decisive answer");
            return finish(ScheduleVerdict::Decisive { outcome }, attempts);
        }
        debug!(target: LOG_TARGET, probe = %target, attempt, %outcome, "inconclusive attempt");
    }

    let last_reason = last_indeterminate(&attempts)
        .unwrap_or("no attempt made")
        .to_string();
    warn!(
        target: LOG_TARGET,
        recipient,
        attempts = attempts.len(),
        last_reason = %last_reason,
        "probe attempts exhausted"
    );
    finish(ScheduleVerdict::Exhausted { last_reason }, attempts)
}

fn deadline_reached(recipient: &str, attempts: Vec<AttemptRecord>) -> ProbeReport {
    let last_reason = last_indeterminate(&attempts).map(str::to_string);
    warn!(
        target: LOG_TARGET,
        recipient,
        attempts = attempts.len(),
        "probe time budget exhausted"
    );
    ProbeReport {
        verdict: ScheduleVerdict::DeadlineReached { last_reason },
        attempts,
    }
}

pub(crate) fn last_indeterminate(attempts: &[AttemptRecord]) -> Option<&str> {
    attempts.iter().rev().find_map(|record| match &record.outcome {
        ProbeOutcome::Indeterminate(reason) => Some(reason.as_str()),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) mod tests;
