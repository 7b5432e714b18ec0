use std::fmt;

use crate::mx::DnsError;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Deliverable,
    Risky,
    Undeliverable,
    Invalid,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deliverable => "deliverable",
            Self::Risky => "risky",
            Self::Undeliverable => "undeliverable",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification tag explaining a verdict.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    BadSyntax,
    Disposable,
    NoMx,
    DomainNotExist,
    DnsTimeout,
    DnsError,
    SmtpPolicy,
    ProviderRejected,
    ProviderAccepted,
    PatternAnalysis,
    ProcessingError,
    RequestTimeout,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadSyntax => "bad_syntax",
            Self::Disposable => "disposable",
            Self::NoMx => "no_mx",
            Self::DomainNotExist => "domain_not_exist",
            Self::DnsTimeout => "dns_timeout",
            Self::DnsError => "dns_error",
            Self::SmtpPolicy => "smtp_policy",
            Self::ProviderRejected => "provider_rejected",
            Self::ProviderAccepted => "provider_accepted",
            Self::PatternAnalysis => "pattern_analysis",
            Self::ProcessingError => "processing_error",
            Self::RequestTimeout => "request_timeout",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&DnsError> for Reason {
    fn from(err: &DnsError) -> Self {
        match err {
            DnsError::NoMx { .. } => Self::NoMx,
            DnsError::NxDomain { .. } => Self::DomainNotExist,
            DnsError::Timeout { .. } => Self::DnsTimeout,
            DnsError::ResolverInit { .. } | DnsError::Other { .. } => Self::DnsError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub score: u8,
    pub status: Status,
    pub reason: Reason,
}
