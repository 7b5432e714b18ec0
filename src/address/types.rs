use thiserror::Error;

/// An address that passed the syntax check, split into its parts.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub original: String,
    pub local: String,
    /// Lower-cased ASCII (punycode) form of the domain.
    pub domain: String,
}

impl ParsedAddress {
    pub fn address(&self) -> String {
        format!("{}@{}", self.local, self.domain)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid email address: {}", reasons.join("; "))]
pub struct SyntaxError {
    pub reasons: Vec<String>,
}

impl SyntaxError {
    pub(crate) fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }
}

/// Coarse category of an address, first match in declaration order.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailType {
    Government,
    Role,
    Free,
    Business,
}

impl EmailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Government => "government",
            Self::Role => "role",
            Self::Free => "free",
            Self::Business => "business",
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressKind {
    pub email_type: EmailType,
    pub is_free: bool,
    pub is_role: bool,
    pub is_disposable: bool,
}
