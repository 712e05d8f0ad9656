/// Mailbox providers common enough that a near miss is almost always a typo.
pub(crate) const KNOWN_PROVIDERS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "mail.com",
    "email.com",
    "ymail.com",
    "yahoo.com",
    "yahoo.fr",
    "hotmail.com",
    "hotmail.fr",
    "outlook.com",
    "outlook.fr",
    "live.com",
    "live.fr",
    "msn.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "aol.com",
    "protonmail.com",
    "proton.me",
    "gmx.com",
    "gmx.de",
    "gmx.net",
    "gmx.fr",
    "web.de",
    "orange.fr",
    "free.fr",
    "laposte.net",
    "sfr.fr",
    "wanadoo.fr",
    "yandex.ru",
    "mail.ru",
];

const MAX_DISTANCE: usize = 2;

/// Returns the closest provider at edit distance 1..=2 from `domain`, or
/// `None` when the domain is a known provider or nothing is close.
pub fn suggest_domain(domain: &str) -> Option<&'static str> {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    if KNOWN_PROVIDERS.contains(&domain.as_str()) {
        return None;
    }
    KNOWN_PROVIDERS
        .iter()
        .map(|provider| (levenshtein(&domain, provider), *provider))
        .filter(|(distance, _)| (1..=MAX_DISTANCE).contains(distance))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, provider)| provider)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(row[j] + 1);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("gmail.com", "gmail.com"), 0);
        assert_eq!(levenshtein("gmial.com", "gmail.com"), 2);
        assert_eq!(levenshtein("gmai.com", "gmail.com"), 1);
    }

    #[test]
    fn suggests_close_provider() {
        assert_eq!(suggest_domain("gmai.com"), Some("gmail.com"));
        assert_eq!(suggest_domain("HOTMAL.COM"), Some("hotmail.com"));
    }

    #[test]
    fn exact_provider_and_unrelated_domains_pass() {
        assert_eq!(suggest_domain("gmail.com"), None);
        assert_eq!(suggest_domain("example.org"), None);
    }

    #[test]
    fn neighbouring_providers_are_not_typos() {
        for provider in ["mail.com", "email.com", "ymail.com", "mac.com", "gmx.net"] {
            assert_eq!(suggest_domain(provider), None, "{provider}");
        }
    }
}
