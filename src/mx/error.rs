use std::time::Duration;

use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Why a domain produced no exchangers. [`super::resolve_exchangers`] logs
/// these and returns an empty list; only resolver setup surfaces to callers.
#[derive(Debug, Error)]
pub enum MxError {
    #[error("no domain to resolve")]
    EmptyDomain,
    #[error("'{domain}' is not a valid IDNA domain")]
    InvalidDomain {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("cannot read the system resolver configuration")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX query for {domain} failed")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
    #[error("MX query for {domain} got no answer within {after:?}")]
    Timeout { domain: String, after: Duration },
}

impl MxError {
    pub(crate) fn invalid_domain(domain: &str, source: idna::Errors) -> Self {
        Self::InvalidDomain {
            domain: domain.to_string(),
            source,
        }
    }

    pub(crate) fn lookup(domain: &str, source: ResolveError) -> Self {
        Self::Lookup {
            domain: domain.to_string(),
            source,
        }
    }
}
