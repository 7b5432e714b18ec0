//! MX resolution with a shared TTL cache.
//!
//! [`MxResolver::resolve_mx`] returns the exchange hosts for a domain, most
//! preferred first, and distinguishes "no MX", "no such domain" and timeouts
//! through [`DnsError`].

mod cache;
mod error;
mod resolver;
mod types;

pub use cache::MxCache;
pub use error::DnsError;
pub use resolver::{LookupMx, MxResolver, ResolverPool, system_resolver};
pub use types::{MxCacheEntry, MxRecord};
