use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::proto::rr::Name;
use trust_dns_resolver::system_conf::read_system_conf;

use super::{MailExchanger, MxError};

const LOG_TARGET: &str = "mailprobe::mx";

/// Source of raw MX answers. Records come back in the order the resolver
/// returned them; ordering and de-duplication happen in
/// [`resolve_exchangers`].
pub trait LookupMx {
    fn lookup_mx(
        &self,
        ascii_domain: &str,
    ) -> impl Future<Output = Result<Vec<MailExchanger>, MxError>> + Send;
}

/// [`LookupMx`] backed by the system resolver configuration.
#[derive(Clone)]
pub struct DnsMxResolver {
    inner: TokioAsyncResolver,
}

impl DnsMxResolver {
    /// Builds a resolver from the system configuration, capping each DNS
    /// query at `timeout`.
    pub fn from_system_conf(timeout: Duration) -> Result<Self, MxError> {
        let (config, mut opts) = read_system_conf().map_err(|source| MxError::ResolverInit { source })?;
        opts.timeout = timeout;
        opts.attempts = 1;
        Ok(Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        })
    }
}

impl LookupMx for DnsMxResolver {
    async fn lookup_mx(&self, ascii_domain: &str) -> Result<Vec<MailExchanger>, MxError> {
        let lookup = match self.inner.mx_lookup(ascii_domain).await {
            Ok(lookup) => lookup,
            Err(err) => {
                if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
                    return Ok(Vec::new());
                }
                return Err(MxError::lookup(ascii_domain, err));
            }
        };
        Ok(lookup
            .iter()
            .map(|mx| exchanger_from_record(mx.exchange(), mx.preference()))
            .collect())
    }
}

/// Resolves `domain` into exchangers sorted by ascending priority.
///
/// The sort is stable, so equal priorities keep the resolver's order. Any
/// failure (bad domain, DNS error, timeout) is logged and reported as an empty
/// list.
pub async fn resolve_exchangers<L>(lookup: &L, domain: &str, timeout: Duration) -> Vec<MailExchanger>
where
    L: LookupMx,
{
    match lookup_within(lookup, domain, timeout).await {
        Ok(exchangers) => {
            debug!(
                target: LOG_TARGET,
                domain,
                count = exchangers.len(),
                "resolved mail exchangers"
            );
            exchangers
        }
        Err(err) => {
            warn!(target: LOG_TARGET, domain, error = %err, "no mail exchangers");
            Vec::new()
        }
    }
}

/// Normalizes `domain`, queries it under `timeout` and orders the answer.
pub(crate) async fn lookup_within<L>(
    lookup: &L,
    domain: &str,
    timeout: Duration,
) -> Result<Vec<MailExchanger>, MxError>
where
    L: LookupMx,
{
    let ascii = normalize_domain(domain)?;
    let records = tokio::time::timeout(timeout, lookup.lookup_mx(&ascii))
        .await
        .map_err(|_| MxError::Timeout {
            domain: ascii.clone(),
            after: timeout,
        })??;
    Ok(order_exchangers(records))
}

pub(crate) fn order_exchangers(records: Vec<MailExchanger>) -> Vec<MailExchanger> {
    let mut seen = HashSet::new();
    let mut out: Vec<MailExchanger> = records
        .into_iter()
        .filter(|record| !record.hostname.is_empty())
        .filter(|record| seen.insert(record.clone()))
        .collect();
    out.sort_by_key(|record| record.priority);
    out
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, MxError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|source| MxError::invalid_domain(trimmed, source))
}

/// Exchange names stay in their ASCII (punycode) form so the connect step
/// resolves exactly what DNS returned.
pub(crate) fn exchanger_from_record(exchange: &Name, preference: u16) -> MailExchanger {
    MailExchanger::new(normalize_exchange(&exchange.to_ascii()), preference)
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}
