#![forbid(unsafe_code)]
//! mailprobe_lib: estimation de délivrabilité e-mail par sonde SMTP.
//!
//! Resolves the recipient domain's exchangers, walks them with a
//! `HELO`/`MAIL FROM`/`RCPT TO` transcript (never `DATA`) and folds the
//! answers with static checks into a [`VerificationVerdict`].

pub mod checks;
pub mod config;
pub mod mx;
pub mod scheduler;
pub mod smtp;
pub mod verdict;
pub mod verify;

pub use checks::{DefaultStaticChecks, StaticCheckResults, StaticChecks, ValidationMode};
pub use config::{ConfigError, VerifierConfig};
pub use mx::{DnsMxResolver, LookupMx, MailExchanger, MxError, resolve_exchangers};
pub use scheduler::{ProbeReport, SchedulePolicy, ScheduleVerdict, run_probes};
pub use smtp::{ProbeOutcome, ProbeTarget, SmtpTranscriptClient, TranscriptClient};
pub use verdict::{Status, VerificationVerdict};
pub use verify::{Verifier, VerifyError, verify_email};

/// Re-exported so callers can build cancellation tokens without adding
/// `tokio-util` themselves.
pub use tokio_util::sync::CancellationToken;
