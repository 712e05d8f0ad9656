#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Strict,
    Relaxed,
}

/// An address split at its last `@`, with the domain lower-cased and
/// IDNA-converted when possible.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub original: String,
    pub local: String,
    pub domain: String,
    pub ascii_domain: String,
}

/// Format verdict with the reasons it failed, if any.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    pub ok: bool,
    pub reasons: Vec<String>,
}

/// Booleans consumed by the verdict aggregator. `true` means the check
/// passed.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCheckResults {
    pub format_valid: bool,
    pub format_reasons: Vec<String>,
    pub typo_valid: bool,
    pub typo_suggestion: Option<String>,
    pub disposable_valid: bool,
}
