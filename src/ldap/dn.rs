// DN syntax checks (RFC 4514), just enough to tell a DN from an account name.

/// Splits `s` on unescaped RDN separators (`,` or `;`). Returns `None` when
/// the string ends in a dangling escape.
pub fn split_rdns(s: &str) -> Option<Vec<&str>> {
    split_unescaped(s, &[',', ';'])
}

fn split_unescaped<'a>(s: &'a str, separators: &[char]) -> Option<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if separators.contains(&c) {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }

    if escaped {
        return None;
    }
    parts.push(&s[start..]);
    Some(parts)
}

fn is_attribute_type(attr: &str) -> bool {
    let mut chars = attr.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric() || c == '-'),
        // numeric OID
        Some(c) if c.is_ascii_digit() => {
            attr.split('.')
                .all(|arc| !arc.is_empty() && arc.chars().all(|c| c.is_ascii_digit()))
        }
        _ => false,
    }
}

fn is_attribute_value_assertion(ava: &str) -> bool {
    let Some((attr, value)) = ava.split_once('=') else {
        return false;
    };
    let attr = attr.trim();
    // a leading '#' value is hex-encoded BER
    if let Some(hex) = value.trim().strip_prefix('#') {
        return is_attribute_type(attr)
            && !hex.is_empty()
            && hex.len() % 2 == 0
            && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    is_attribute_type(attr)
}

/// True when `s` is a syntactically valid, non-empty distinguished name.
pub fn is_dn(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }
    let Some(rdns) = split_rdns(s) else {
        return false;
    };

    rdns.iter().all(|rdn| match split_unescaped(rdn, &['+']) {
        Some(avas) => avas.iter().all(|ava| is_attribute_value_assertion(ava)),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_dns() {
        assert!(is_dn("CN=ignored,DC=example,DC=com"));
        assert!(is_dn("uid=jdoe,ou=users,dc=example,dc=com"));
        assert!(is_dn("dc=com"));
        assert!(is_dn("cn = spaced , dc = example"));
        assert!(is_dn("cn=a;dc=example"));
    }

    #[test]
    fn test_escaped_and_multivalued() {
        assert!(is_dn(r#"cn=John\, Doe,ou=Sales\+Marketing,dc=example,dc=com"#));
        assert!(is_dn("cn=John+uid=jdoe,dc=example,dc=com"));
        assert!(is_dn("2.5.4.3=test,dc=example"));
        assert!(is_dn("cn=#0403616263,dc=example"));
        assert!(is_dn("cn=,dc=example"));
    }

    #[test]
    fn test_account_names_are_not_dns() {
        assert!(!is_dn("jdoe"));
        assert!(!is_dn("jdoe@example.com"));
        assert!(!is_dn(r"EXAMPLE\jdoe"));
        assert!(!is_dn(""));
        assert!(!is_dn("   "));
    }

    #[test]
    fn test_malformed_dns() {
        assert!(!is_dn("cn=test,"));
        assert!(!is_dn(",dc=example"));
        assert!(!is_dn("=value,dc=example"));
        assert!(!is_dn("1cn=test"));
        assert!(!is_dn("cn=test\\"));
        assert!(!is_dn("cn=#abc,dc=example"));
        assert!(!is_dn("2.5..3=test"));
    }

    #[test]
    fn test_split_rdns() {
        assert_eq!(
            split_rdns(r"cn=a\,b,dc=example").unwrap(),
            vec![r"cn=a\,b", "dc=example"]
        );
        assert!(split_rdns("cn=a\\").is_none());
    }
}
