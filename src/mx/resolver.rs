use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use trust_dns_resolver::Resolver;

use super::cache::MxCache;
use super::{DnsError, MxRecord};

/// Source of MX records. Implementations return the raw answer; ordering and
/// hostname normalization happen in [`resolve_with`].
pub trait LookupMx: Send + Sync {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup =
            Resolver::mx_lookup(self, domain).map_err(|err| DnsError::from_resolve(domain, &err))?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            records.push(MxRecord::new(mx.preference(), mx.exchange().to_utf8()));
        }
        Ok(records)
    }
}

/// Build a system resolver whose queries give up after `timeout`.
pub fn system_resolver(timeout: Duration) -> Result<Resolver, DnsError> {
    let (config, mut opts) =
        trust_dns_resolver::system_conf::read_system_conf().map_err(DnsError::resolver_init)?;
    opts.timeout = timeout;
    opts.attempts = 1;
    Resolver::new(config, opts).map_err(DnsError::resolver_init)
}

type BuildLookup<R> = dyn Fn() -> Result<R, DnsError> + Send + Sync;

/// Checks out one idle lookup per concurrent caller, building another when
/// none is idle. The blocking trust-dns `Resolver` runs its queries on one
/// internal runtime behind a lock, so workers sharing a single instance
/// would wait on each other.
pub struct ResolverPool<R> {
    build: Box<BuildLookup<R>>,
    idle: Mutex<Vec<R>>,
}

impl<R: LookupMx> ResolverPool<R> {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> Result<R, DnsError> + Send + Sync + 'static,
    {
        Self {
            build: Box::new(build),
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Build one lookup up front so configuration errors surface early.
    pub fn primed(self) -> Result<Self, DnsError> {
        let first = (self.build)()?;
        self.idle.lock().push(first);
        Ok(self)
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

impl<R: LookupMx> LookupMx for ResolverPool<R> {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let pooled = self.idle.lock().pop();
        let lookup = match pooled {
            Some(lookup) => lookup,
            None => {
                tracing::debug!(target: "mx", "no idle resolver, building one");
                (self.build)()?
            }
        };
        let answer = lookup.lookup_mx(domain);
        self.idle.lock().push(lookup);
        answer
    }
}

/// Sort by preference, normalize hostnames, drop duplicates. An empty answer
/// is `NoMx`, never an empty success.
pub(crate) fn resolve_with<R>(resolver: &R, domain: &str) -> Result<Vec<String>, DnsError>
where
    R: LookupMx + ?Sized,
{
    let mut records = resolver.lookup_mx(domain)?;
    records.sort();

    let mut hosts: Vec<String> = Vec::with_capacity(records.len());
    for record in records {
        let host = normalize_exchange(&record.exchange);
        if !host.is_empty() && !hosts.contains(&host) {
            hosts.push(host);
        }
    }

    if hosts.is_empty() {
        return Err(DnsError::NoMx {
            domain: domain.to_string(),
        });
    }
    Ok(hosts)
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// Read-through resolver: answers from the injected cache while an entry is
/// fresh, otherwise queries `lookup` and stores the answer.
pub struct MxResolver {
    lookup: Box<dyn LookupMx>,
    cache: Arc<MxCache>,
}

impl MxResolver {
    pub fn new(lookup: Box<dyn LookupMx>, cache: Arc<MxCache>) -> Self {
        Self { lookup, cache }
    }

    /// Resolver backed by the system configuration, one trust-dns resolver
    /// per concurrent lookup.
    pub fn system(timeout: Duration, cache: Arc<MxCache>) -> Result<Self, DnsError> {
        let pool = ResolverPool::new(move || system_resolver(timeout)).primed()?;
        Ok(Self::new(Box::new(pool), cache))
    }

    pub fn cache(&self) -> &Arc<MxCache> {
        &self.cache
    }

    pub fn resolve_mx(&self, domain: &str) -> Result<Vec<String>, DnsError> {
        let now = Instant::now();
        if let Some(entry) = self.cache.get_at(domain, now) {
            tracing::debug!(target: "mx", domain, "MX cache hit");
            return Ok(entry.hosts.clone());
        }

        tracing::debug!(target: "mx", domain, "MX cache miss, querying resolver");
        match resolve_with(self.lookup.as_ref(), domain) {
            Ok(hosts) => {
                self.cache.insert_at(domain, hosts.clone(), Instant::now());
                Ok(hosts)
            }
            Err(err) => {
                tracing::warn!(target: "mx", domain, error = %err, "MX resolution failed");
                Err(err)
            }
        }
    }
}
