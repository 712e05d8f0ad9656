//! Verifier configuration.
//!
//! One struct carries every policy knob; [`VerifierConfig::validate`] runs
//! before any network activity.

use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checks::ValidationMode;
use crate::scheduler::SchedulePolicy;
use crate::smtp::TranscriptOptions;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no ports to try")]
    NoPorts,
    #[error("port 0 is not a valid SMTP port")]
    InvalidPort,
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("probe sender address '{0}' must contain '@'")]
    InvalidSender(String),
    #[error("invalid HELO name '{0}'")]
    InvalidHelo(String),
    #[cfg(feature = "with-serde")]
    #[error("invalid configuration file: {0}")]
    Parse(String),
    #[error("cannot read configuration file {path}: {message}")]
    Read { path: String, message: String },
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Ports probed on each exchanger, in order.
    pub ports_to_try: Vec<u16>,
    /// Attempts per `(exchanger, port)` pair.
    pub max_retries_per_target: u32,
    pub per_attempt_timeout_ms: u64,
    /// Wall-clock budget for the whole probe phase.
    pub total_budget_ms: u64,
    pub probe_sender_address: String,
    pub helo_name: String,
    pub dns_timeout_ms: u64,
    /// Optional cap across every target.
    pub max_total_attempts: Option<u32>,
    pub allowlist_domains: Vec<String>,
    pub denylist_domains: Vec<String>,
    /// Maps `Unknown` to `will_bounce = true`.
    pub unknown_means_bounce: bool,
    pub extra_disposable_domains: Vec<String>,
    pub validation_mode: ValidationMode,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            ports_to_try: vec![25, 587],
            max_retries_per_target: 1,
            per_attempt_timeout_ms: 10_000,
            total_budget_ms: 30_000,
            probe_sender_address: "verify@localhost.localdomain".to_string(),
            helo_name: "localhost".to_string(),
            dns_timeout_ms: 5_000,
            max_total_attempts: None,
            allowlist_domains: Vec::new(),
            denylist_domains: Vec::new(),
            unknown_means_bounce: false,
            extra_disposable_domains: Vec::new(),
            validation_mode: ValidationMode::Strict,
        }
    }
}

impl VerifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ports_to_try.is_empty() {
            return Err(ConfigError::NoPorts);
        }
        if self.ports_to_try.contains(&0) {
            return Err(ConfigError::InvalidPort);
        }
        let counters = [
            ("max_retries_per_target", u64::from(self.max_retries_per_target)),
            ("per_attempt_timeout_ms", self.per_attempt_timeout_ms),
            ("total_budget_ms", self.total_budget_ms),
            ("dns_timeout_ms", self.dns_timeout_ms),
            (
                "max_total_attempts",
                self.max_total_attempts.map_or(1, u64::from),
            ),
        ];
        if let Some(&(field, _)) = counters.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { field });
        }
        let sender = self.probe_sender_address.trim();
        match sender.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && is_wire_token(sender) => {}
            _ => return Err(ConfigError::InvalidSender(sender.to_string())),
        }
        let helo = self.helo_name.trim();
        if helo.is_empty() || !is_wire_token(helo) {
            return Err(ConfigError::InvalidHelo(helo.to_string()));
        }
        Ok(())
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.per_attempt_timeout_ms)
    }

    pub fn total_budget(&self) -> Duration {
        Duration::from_millis(self.total_budget_ms)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    pub fn schedule_policy(&self) -> SchedulePolicy {
        SchedulePolicy {
            ports: self.ports_to_try.clone(),
            attempts_per_target: self.max_retries_per_target,
            max_total_attempts: self.max_total_attempts,
            total_budget: self.total_budget(),
        }
    }

    pub fn transcript_options(&self) -> TranscriptOptions {
        TranscriptOptions {
            helo_name: self.helo_name.trim().to_string(),
            sender: self.probe_sender_address.trim().to_string(),
            attempt_timeout: self.per_attempt_timeout(),
        }
    }

    pub fn is_allowlisted(&self, domain: &str) -> bool {
        domain_listed(&self.allowlist_domains, domain)
    }

    pub fn is_denylisted(&self, domain: &str) -> bool {
        domain_listed(&self.denylist_domains, domain)
    }

    #[cfg(feature = "with-serde")]
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "with-serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }
}

/// Sent verbatim inside a command line: no whitespace, no control character.
fn is_wire_token(value: &str) -> bool {
    !value.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Case-insensitive, trailing-dot-insensitive membership.
fn domain_listed(list: &[String], domain: &str) -> bool {
    let domain = domain.trim().trim_end_matches('.');
    list.iter()
        .any(|entry| entry.trim().trim_end_matches('.').eq_ignore_ascii_case(domain))
}
