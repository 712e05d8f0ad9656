//! Request orchestration: domain policy, static checks, one MX resolution,
//! the probe schedule and the final verdict.

mod error;

pub use error::VerifyError;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::checks::{DefaultStaticChecks, StaticChecks, parse_address};
use crate::config::VerifierConfig;
use crate::mx::{DnsMxResolver, LookupMx, resolve_exchangers};
use crate::scheduler::{ProbeReport, ScheduleVerdict, run_probes};
use crate::smtp::{SmtpTranscriptClient, TranscriptClient};
use crate::verdict::{DomainRule, Signals, VerificationVerdict, aggregate};

const LOG_TARGET: &str = "mailprobe::verify";

/// Verifies addresses with a fixed configuration. Holds no per-request
/// state, so one instance can serve any number of requests.
#[derive(Debug, Clone)]
pub struct Verifier<R = DnsMxResolver, C = SmtpTranscriptClient, S = DefaultStaticChecks> {
    config: VerifierConfig,
    resolver: R,
    client: C,
    checks: S,
}

impl Verifier {
    /// Validates `config` and wires the system DNS resolver, the TCP
    /// transcript client and the built-in static checks.
    pub fn from_config(config: VerifierConfig) -> Result<Self, VerifyError> {
        config.validate()?;
        let resolver =
            DnsMxResolver::from_system_conf(config.dns_timeout()).map_err(VerifyError::resolver)?;
        let client = SmtpTranscriptClient::new(config.transcript_options());
        let checks = DefaultStaticChecks::new(
            config.validation_mode,
            config.extra_disposable_domains.clone(),
        );
        Ok(Self {
            config,
            resolver,
            client,
            checks,
        })
    }
}

impl<R, C, S> Verifier<R, C, S>
where
    R: LookupMx,
    C: TranscriptClient,
    S: StaticChecks,
{
    pub fn with_components(
        config: VerifierConfig,
        resolver: R,
        client: C,
        checks: S,
    ) -> Result<Self, VerifyError> {
        config.validate()?;
        Ok(Self {
            config,
            resolver,
            client,
            checks,
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub async fn verify_email(&self, address: &str) -> Result<VerificationVerdict, VerifyError> {
        self.verify_email_with_cancel(address, &CancellationToken::new())
            .await
    }

    /// Like [`Verifier::verify_email`]; cancelling `cancel` drops any open
    /// connection and yields an `unknown` verdict with reason `"cancelled"`.
    pub async fn verify_email_with_cancel(
        &self,
        address: &str,
        cancel: &CancellationToken,
    ) -> Result<VerificationVerdict, VerifyError> {
        let email = address.trim();
        if email.is_empty() {
            return Err(VerifyError::EmptyAddress);
        }

        let checks = self.checks.check(email);
        let parsed = parse_address(email);
        let domain_rule = parsed.as_ref().and_then(|p| {
            let listed = |f: fn(&VerifierConfig, &str) -> bool| {
                f(&self.config, &p.domain) || f(&self.config, &p.ascii_domain)
            };
            if listed(VerifierConfig::is_allowlisted) {
                Some(DomainRule::Allow)
            } else if listed(VerifierConfig::is_denylisted) {
                Some(DomainRule::Deny)
            } else {
                None
            }
        });
        let unknown_means_bounce = self.config.unknown_means_bounce;

        // Plain SMTP without SMTPUTF8: the envelope carries the IDNA domain.
        let (recipient, domain) = match parsed {
            Some(p) if domain_rule.is_none() && checks.format_valid => {
                (format!("{}@{}", p.local, p.ascii_domain), p.ascii_domain)
            }
            _ => {
                info!(
                    target: LOG_TARGET,
                    email,
                    ?domain_rule,
                    format_valid = checks.format_valid,
                    "decided without network"
                );
                let signals = Signals {
                    domain_rule,
                    checks: &checks,
                    exchangers: None,
                    probe: None,
                };
                return Ok(aggregate(email, signals, unknown_means_bounce));
            }
        };

        let exchangers = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            found = resolve_exchangers(&self.resolver, &domain, self.config.dns_timeout()) => Some(found),
        };
        let report = match &exchangers {
            Some(exchangers) => {
                debug!(target: LOG_TARGET, email, count = exchangers.len(), "exchangers resolved");
                run_probes(
                    &self.client,
                    exchangers,
                    &recipient,
                    &self.config.schedule_policy(),
                    cancel,
                )
                .await
            }
            None => {
                info!(target: LOG_TARGET, email, "cancelled during MX resolution");
                ProbeReport {
                    verdict: ScheduleVerdict::Cancelled,
                    attempts: Vec::new(),
                }
            }
        };

        let signals = Signals {
            domain_rule: None,
            checks: &checks,
            exchangers: exchangers.as_ref().map(Vec::len),
            probe: Some(&report),
        };
        let verdict = aggregate(email, signals, unknown_means_bounce);
        info!(
            target: LOG_TARGET,
            email,
            status = %verdict.status,
            reason = %verdict.reason,
            attempts = report.attempts.len(),
            "verification finished"
        );
        Ok(verdict)
    }
}

/// One-shot verification with [`VerifierConfig::default`].
pub async fn verify_email(address: &str) -> Result<VerificationVerdict, VerifyError> {
    Verifier::from_config(VerifierConfig::default())?
        .verify_email(address)
        .await
}
