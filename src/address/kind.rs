use phf::phf_set;

use super::types::{AddressKind, EmailType, ParsedAddress};

static FREE_PROVIDERS: phf::Set<&'static str> = phf_set! {
    "gmail.com", "yahoo.com", "outlook.com", "hotmail.com",
    "icloud.com", "aol.com", "protonmail.com", "mail.com",
    "zoho.com", "yandex.com", "gmx.com", "live.com",
};

static DISPOSABLE_DOMAINS: phf::Set<&'static str> = phf_set! {
    "tempmail.com", "guerrillamail.com", "10minutemail.com",
    "throwaway.email", "mailinator.com",
};

// substring match against the local part
const ROLE_FRAGMENTS: &[&str] = &[
    "admin", "info", "support", "sales", "contact", "help", "service", "billing", "office",
    "team", "hr", "noreply", "hello", "postmaster", "webmaster", "abuse", "security",
];

const GOVERNMENT_SUFFIXES: &[&str] = &[".gov", ".mil", ".edu"];

pub fn classify_address(address: &ParsedAddress) -> AddressKind {
    let local = address.local.to_ascii_lowercase();
    let domain = address.domain.as_str();

    let is_free = FREE_PROVIDERS.contains(domain);
    let is_role = ROLE_FRAGMENTS.iter().any(|fragment| local.contains(fragment));
    let is_government = GOVERNMENT_SUFFIXES
        .iter()
        .any(|suffix| domain.ends_with(suffix));
    let is_disposable = DISPOSABLE_DOMAINS.contains(domain);

    let email_type = if is_government {
        EmailType::Government
    } else if is_role {
        EmailType::Role
    } else if is_free {
        EmailType::Free
    } else {
        EmailType::Business
    };

    AddressKind {
        email_type,
        is_free,
        is_role,
        is_disposable,
    }
}
