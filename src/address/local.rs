/// Longest local part accepted, in bytes.
const MAX_LOCAL_LEN: usize = 64;

/// Unquoted local parts only: ASCII letters, digits, the RFC 5322 `atext`
/// symbols and single interior dots. Problems are appended to `reasons`.
pub(crate) fn check_local(local: &str, reasons: &mut Vec<String>) {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        reasons.push(format!(
            "local part length {} invalid (1..={MAX_LOCAL_LEN})",
            local.len()
        ));
        if local.is_empty() {
            return;
        }
    }

    if local.starts_with('.') || local.ends_with('.') {
        reasons.push("local part must not start or end with '.'".to_string());
    }
    if local.contains("..") {
        reasons.push("local part has consecutive dots".to_string());
    }

    let mut bad: Vec<char> = local.chars().filter(|&c| !is_local_char(c)).collect();
    bad.dedup();
    if !bad.is_empty() {
        let shown: String = bad.iter().flat_map(|c| c.escape_debug()).collect();
        reasons.push(format!("local part has disallowed characters '{shown}'"));
    }
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons_for(local: &str) -> Vec<String> {
        let mut reasons = Vec::new();
        check_local(local, &mut reasons);
        reasons
    }

    #[test]
    fn accepts_common_shapes() {
        for local in ["alice", "first.last", "first+tag", "o'brien", "x_y-z", "a{b}~c"] {
            assert!(reasons_for(local).is_empty(), "{local} should pass");
        }
    }

    #[test]
    fn dot_placement() {
        assert_eq!(
            reasons_for(".abc"),
            vec!["local part must not start or end with '.'"]
        );
        assert_eq!(
            reasons_for("abc."),
            vec!["local part must not start or end with '.'"]
        );
        assert_eq!(reasons_for("a..b"), vec!["local part has consecutive dots"]);
    }

    #[test]
    fn names_disallowed_characters() {
        assert_eq!(
            reasons_for("a b"),
            vec!["local part has disallowed characters ' '"]
        );
        assert_eq!(
            reasons_for("\"ab\""),
            vec!["local part has disallowed characters '\\\"'"]
        );
        assert_eq!(
            reasons_for("jos\u{e9}"),
            vec!["local part has disallowed characters 'é'"]
        );
    }

    #[test]
    fn length_bounds() {
        assert_eq!(
            reasons_for(""),
            vec!["local part length 0 invalid (1..=64)"]
        );
        assert!(reasons_for(&"a".repeat(64)).is_empty());
        assert_eq!(
            reasons_for(&"a".repeat(65)),
            vec!["local part length 65 invalid (1..=64)"]
        );
    }

    #[test]
    fn reports_every_problem() {
        let reasons = reasons_for(".a..b c");
        assert_eq!(reasons.len(), 3, "{reasons:?}");
    }
}
