use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::mx::MailExchanger;

/// One (exchanger, port) pair the scheduler hands to the transcript client.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub exchanger: MailExchanger,
    pub port: u16,
}

impl ProbeTarget {
    pub fn new(exchanger: MailExchanger, port: u16) -> Self {
        Self { exchanger, port }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchanger.hostname, self.port)
    }
}

/// Result of a single SMTP attempt.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "kind", content = "reason", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server accepted the recipient.
    Accepted,
    /// The server permanently rejected the recipient; holds the reply line.
    Rejected(String),
    /// Timeout, transport failure, temporary failure or an unclassifiable
    /// reply.
    Indeterminate(String),
}

impl ProbeOutcome {
    pub fn is_decisive(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected(_))
    }

    pub(crate) fn timeout() -> Self {
        Self::Indeterminate("timeout".to_string())
    }

    pub(crate) fn connection_failed(detail: impl fmt::Display) -> Self {
        Self::Indeterminate(connection_failed_reason(detail))
    }
}

pub(crate) fn connection_failed_reason(detail: impl fmt::Display) -> String {
    format!("connection failed: {detail}")
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected(reason) => write!(f, "rejected ({reason})"),
            Self::Indeterminate(reason) => write!(f, "indeterminate ({reason})"),
        }
    }
}
