use thiserror::Error;

/// Failure kinds of an MX resolution. Each maps to its own reason code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("no MX records for {domain}")]
    NoMx { domain: String },
    #[error("domain {domain} does not exist")]
    NxDomain { domain: String },
    #[error("DNS lookup for {domain} timed out")]
    Timeout { domain: String },
    #[error("resolver initialization failed: {message}")]
    ResolverInit { message: String },
    #[error("MX lookup failed for {domain}: {message}")]
    Other { domain: String, message: String },
}

impl DnsError {
    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit {
            message: source.to_string(),
        }
    }

    pub(crate) fn from_resolve(
        domain: &str,
        source: &trust_dns_resolver::error::ResolveError,
    ) -> Self {
        use trust_dns_resolver::error::ResolveErrorKind;
        use trust_dns_resolver::proto::op::ResponseCode;

        let domain = domain.to_string();
        match source.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. }
                if *response_code == ResponseCode::NXDomain =>
            {
                Self::NxDomain { domain }
            }
            ResolveErrorKind::NoRecordsFound { .. } => Self::NoMx { domain },
            ResolveErrorKind::Timeout => Self::Timeout { domain },
            _ => Self::Other {
                domain,
                message: source.to_string(),
            },
        }
    }

    /// Stable tag reported in `VerificationResult::reason`.
    pub fn reason_tag(&self) -> &'static str {
        match self {
            Self::NoMx { .. } => "no_mx",
            Self::NxDomain { .. } => "domain_not_exist",
            Self::Timeout { .. } => "dns_timeout",
            Self::ResolverInit { .. } | Self::Other { .. } => "dns_error",
        }
    }
}
