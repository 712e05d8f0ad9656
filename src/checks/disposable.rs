use phf::phf_set;

/// Throwaway mailbox services.
static DISPOSABLE_DOMAINS: phf::Set<&'static str> = phf_set! {
    "mailinator.com",
    "guerrillamail.com",
    "guerrillamail.net",
    "sharklasers.com",
    "10minutemail.com",
    "temp-mail.org",
    "tempmail.com",
    "throwawaymail.com",
    "yopmail.com",
    "yopmail.fr",
    "trashmail.com",
    "dispostable.com",
    "getnada.com",
    "maildrop.cc",
    "mailnesia.com",
    "fakeinbox.com",
    "emailondeck.com",
    "mintemail.com",
    "mohmal.com",
    "spamgourmet.com",
};

/// `true` when `domain` is a known disposable provider, built-in or listed
/// in `extra`. Comparison ignores case and a trailing dot.
pub fn is_disposable(domain: &str, extra: &[String]) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    DISPOSABLE_DOMAINS.contains(domain.as_str())
        || extra
            .iter()
            .any(|d| d.trim_end_matches('.').eq_ignore_ascii_case(&domain))
}
