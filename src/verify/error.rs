use thiserror::Error;

use crate::config::ConfigError;
use crate::mx::MxError;

/// Failures reported before any network activity. Everything that happens
/// once probing starts ends up in the verdict instead.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid configuration: {source}")]
    InvalidConfig {
        #[from]
        source: ConfigError,
    },
    #[error("empty email address")]
    EmptyAddress,
    #[error("cannot set up the DNS resolver: {source}")]
    Resolver {
        #[source]
        source: MxError,
    },
}

impl VerifyError {
    pub fn resolver(source: MxError) -> Self {
        Self::Resolver { source }
    }
}
