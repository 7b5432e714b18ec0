//! Address syntax checking and coarse classification.
//!
//! [`parse_address`] is the gate in front of every network stage: an input
//! that fails here is reported `invalid` without a DNS query or SMTP session.

mod domain;
mod kind;
mod local;
mod types;

pub use kind::classify_address;
pub use types::{AddressKind, EmailType, ParsedAddress, SyntaxError};

use std::sync::LazyLock;

use regex::Regex;

use domain::check_domain;
use local::check_local;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]{2,}$").expect("address pattern compiles")
});

pub fn parse_address(input: &str) -> Result<ParsedAddress, SyntaxError> {
    let trimmed = input.trim();
    let mut reasons = Vec::new();

    if trimmed.len() > 254 {
        reasons.push(format!("total length {} > 254", trimmed.len()));
    }

    let Some((local, domain)) = trimmed.split_once('@') else {
        reasons.push("must contain exactly one '@'".to_string());
        return Err(SyntaxError::new(reasons));
    };
    if domain.contains('@') {
        reasons.push("must contain exactly one '@'".to_string());
        return Err(SyntaxError::new(reasons));
    }

    if !ADDRESS_PATTERN.is_match(trimmed) {
        reasons.push("does not match local@domain.tld".to_string());
    }

    check_local(local, &mut reasons);

    let ascii_domain = check_domain(domain, &mut reasons);

    match ascii_domain {
        Some(domain) if reasons.is_empty() => Ok(ParsedAddress {
            original: input.to_string(),
            local: local.to_string(),
            domain,
        }),
        _ => Err(SyntaxError::new(reasons)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_basic() {
        let parsed = parse_address("alice@Example.com").expect("valid");
        assert_eq!(parsed.local, "alice");
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.address(), "alice@example.com");
    }

    #[test]
    fn keeps_original_input() {
        let parsed = parse_address("  bob@example.org ").expect("valid");
        assert_eq!(parsed.original, "  bob@example.org ");
    }

    #[test]
    fn rejects_malformed() {
        for input in [
            "",
            "bad",
            "a@@b.com",
            "a@b@c.com",
            "@example.com",
            "user@",
            "user@localhost",
            "user@example.c",
            "user@example.123",
            "us er@example.com",
            ".user@example.com",
            "user@-example.com",
        ] {
            assert!(parse_address(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn error_lists_reasons() {
        let err = parse_address("bad").expect_err("invalid");
        assert!(!err.reasons.is_empty());
        assert!(err.to_string().contains("exactly one '@'"));
    }

    #[test]
    fn local_part_reasons_are_specific() {
        let err = parse_address("a..b@example.com").expect_err("double dot");
        assert_eq!(err.reasons, vec!["local part has consecutive dots"]);
    }
}
