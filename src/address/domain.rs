/// IDNA conversion followed by label checks. Reasons are appended to
/// `reasons`; the lower-cased ASCII domain is returned when conversion worked.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) -> Option<String> {
    let ascii = match idna::domain_to_ascii(domain) {
        Ok(d) => d.to_ascii_lowercase(),
        Err(_) => {
            reasons.push("domain punycode conversion failed".to_string());
            return None;
        }
    };

    if ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return None;
    }

    if !ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in ascii.split('.') {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > 63 {
            reasons.push(format!(
                "domain label '{}' length {} > 63",
                label,
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!(
                "domain label '{}' cannot start/end with '-'",
                label
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{}' has invalid chars", label));
        }
    }

    // the final label must be at least two letters (or a punycode TLD)
    if let Some(tld) = ascii.rsplit('.').next() {
        let alphabetic = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());
        if !alphabetic && !tld.starts_with("xn--") {
            reasons.push(format!("top-level label '{tld}' must be 2+ letters"));
        }
    }

    Some(ascii)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn basic_domain_ok() {
        let mut reasons = vec![];
        let ascii = check_domain("Example.COM", &mut reasons);
        assert!(reasons.is_empty(), "{:?}", reasons);
        assert_eq!(ascii.as_deref(), Some("example.com"));
    }

    #[test]
    fn label_too_long() {
        let long = "a".repeat(64);
        let mut reasons = vec![];
        check_domain(&format!("{}.com", long), &mut reasons);
        assert!(!reasons.is_empty());
    }

    #[test]
    fn numeric_tld_rejected() {
        let mut reasons = vec![];
        check_domain("example.c0", &mut reasons);
        assert!(reasons.iter().any(|r| r.contains("top-level")));
    }

    #[test]
    fn idn_domain_converted() {
        let mut reasons = vec![];
        let ascii = check_domain("exämple.com", &mut reasons).expect("ascii");
        assert!(reasons.is_empty(), "{:?}", reasons);
        assert!(ascii.starts_with("xn--"));
    }
}
