//! Static checks run before any network activity.
//!
//! The verifier consumes them through [`StaticChecks`]; MX existence is not
//! part of this seam since it comes from the request's single resolution.

mod disposable;
mod format;
mod typo;
mod types;

pub use disposable::is_disposable;
pub use format::{check_format, parse_address};
pub use typo::suggest_domain;
pub use types::{FormatReport, ParsedAddress, StaticCheckResults, ValidationMode};

/// Format, typo and disposable checks for one address.
pub trait StaticChecks {
    fn check(&self, email: &str) -> StaticCheckResults;
}

/// Built-in checks: syntax per [`ValidationMode`], provider typos,
/// disposable domains plus a caller-supplied list.
#[derive(Debug, Clone, Default)]
pub struct DefaultStaticChecks {
    mode: ValidationMode,
    extra_disposable: Vec<String>,
}

impl DefaultStaticChecks {
    pub fn new(mode: ValidationMode, extra_disposable: Vec<String>) -> Self {
        Self {
            mode,
            extra_disposable,
        }
    }
}

impl StaticChecks for DefaultStaticChecks {
    fn check(&self, email: &str) -> StaticCheckResults {
        let format = check_format(email, self.mode);
        let parsed = parse_address(email);
        let domain = parsed
            .as_ref()
            .map(|p| p.ascii_domain.as_str())
            .unwrap_or_default();

        let typo_suggestion = parsed.as_ref().and_then(|p| {
            suggest_domain(&p.ascii_domain).map(|provider| format!("{}@{provider}", p.local))
        });

        StaticCheckResults {
            format_valid: format.ok,
            format_reasons: format.reasons,
            typo_valid: typo_suggestion.is_none(),
            typo_suggestion,
            disposable_valid: domain.is_empty() || !is_disposable(domain, &self.extra_disposable),
        }
    }
}
