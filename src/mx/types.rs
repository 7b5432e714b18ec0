use std::time::Instant;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// A cached resolution. Entries are never modified once built; a refresh
/// replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxCacheEntry {
    pub domain: String,
    /// Exchange hostnames, most preferred first.
    pub hosts: Vec<String>,
    pub inserted_at: Instant,
}

impl MxCacheEntry {
    pub fn new(domain: impl Into<String>, hosts: Vec<String>, inserted_at: Instant) -> Self {
        Self {
            domain: domain.into(),
            hosts,
            inserted_at,
        }
    }
}
