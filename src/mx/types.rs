#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MailExchanger {
    pub hostname: String,
    pub priority: u16,
}

impl MailExchanger {
    pub fn new(hostname: impl Into<String>, priority: u16) -> Self {
        Self {
            hostname: hostname.into(),
            priority,
        }
    }
}
