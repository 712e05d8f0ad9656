//! Single-attempt SMTP probing.
//!
//! [`SmtpTranscriptClient`] connects to one exchanger port, plays
//! `HELO` / `MAIL FROM` / `RCPT TO` and classifies the recipient reply by its
//! status code into a [`ProbeOutcome`]. Retrying and fan-out belong to the
//! scheduler.

mod client;
mod reply;
mod transcript;
mod types;

pub use client::{SmtpTranscriptClient, TranscriptClient, TranscriptOptions};
pub use types::{ProbeOutcome, ProbeTarget};
