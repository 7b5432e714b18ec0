//! Mail-exchanger hostname to provider identity.

use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Google,
    Microsoft365,
    Proofpoint,
    Mimecast,
    Barracuda,
    Yahoo,
    GoDaddy,
    Unknown,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft365 => "microsoft365",
            Self::Proofpoint => "proofpoint",
            Self::Mimecast => "mimecast",
            Self::Barracuda => "barracuda",
            Self::Yahoo => "yahoo",
            Self::GoDaddy => "godaddy",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered patterns; the first provider with a matching substring wins.
const PATTERNS: &[(ProviderId, &[&str])] = &[
    (ProviderId::Proofpoint, &["pphosted", "proofpoint"]),
    (ProviderId::Mimecast, &["mimecast"]),
    (ProviderId::Barracuda, &["barracuda"]),
    (
        ProviderId::Microsoft365,
        &["outlook", "protection", "mx.microsoft"],
    ),
    (ProviderId::Google, &["aspmx", "google.com", "googlemail"]),
    (ProviderId::Yahoo, &["yahoodns", "yahoo"]),
    (ProviderId::GoDaddy, &["secureserver.net", "godaddy"]),
];

pub fn classify_provider(hostname: &str) -> ProviderId {
    let host = hostname.to_ascii_lowercase();
    PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| host.contains(needle)))
        .map(|(provider, _)| *provider)
        .unwrap_or(ProviderId::Unknown)
}
