use super::types::{FormatReport, ParsedAddress, ValidationMode};

/// Splits `email` at its last `@`. Returns `None` when there is no `@`.
pub fn parse_address(email: &str) -> Option<ParsedAddress> {
    let input = email.trim();
    let (local, domain) = input.rsplit_once('@')?;
    let domain = domain.trim_end_matches('.').to_lowercase();
    let ascii_domain = idna::domain_to_ascii(&domain).unwrap_or_default();
    Some(ParsedAddress {
        original: email.to_string(),
        local: local.to_string(),
        domain,
        ascii_domain,
    })
}

/// Syntax check: one `@`, local part per `mode`, domain labels after IDNA,
/// total length within RFC 5321 limits.
pub fn check_format(email: &str, mode: ValidationMode) -> FormatReport {
    let input = email.trim();
    let mut reasons = Vec::new();

    if input.len() > 254 {
        reasons.push(format!("total length {} > 254", input.len()));
    }

    let Some((local, domain)) = input.split_once('@').filter(|(_, d)| !d.contains('@')) else {
        reasons.push("must contain exactly one '@'".to_string());
        return FormatReport { ok: false, reasons };
    };

    if local.is_empty() || local.len() > 64 {
        reasons.push(format!(
            "local part length {} invalid (1..=64)",
            local.len()
        ));
    }

    let local_ok = match mode {
        ValidationMode::Strict => is_local_strict(local),
        ValidationMode::Relaxed => is_local_relaxed(local),
    };
    if !local_ok {
        reasons.push(match mode {
            ValidationMode::Strict => "invalid local part (strict rules)".into(),
            ValidationMode::Relaxed => "invalid local part (relaxed rules)".into(),
        });
    }

    check_domain(domain, &mut reasons);

    FormatReport {
        ok: reasons.is_empty(),
        reasons,
    }
}

fn check_domain(domain: &str, reasons: &mut Vec<String>) {
    let Ok(ascii) = idna::domain_to_ascii(domain) else {
        reasons.push("domain punycode conversion failed".to_string());
        return;
    };
    if ascii.is_empty() {
        reasons.push("domain empty".to_string());
        return;
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
            reasons.push(format!("domain label '{label}' length {} > 63", label.len()));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!("domain label '{label}' cannot start/end with '-'"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{label}' has invalid chars"));
        }
    }
}

fn is_local_strict(s: &str) -> bool {
    if s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~.";
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c))
}

/// Quoted strings are accepted as long as they hold no control character;
/// CR or LF in a local part would split the `RCPT TO` line.
fn is_local_relaxed(s: &str) -> bool {
    let quoted = s.len() >= 2
        && s.starts_with('"')
        && s.ends_with('"')
        && !s.chars().any(|c| c.is_ascii_control());
    quoted || is_local_strict(s)
}
