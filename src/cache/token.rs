use std::fmt;

/// Empty secrets are treated as absent by lookups.
pub const TOKEN_VALUE_STUB: &str = "";

#[derive(Clone, PartialEq, Eq)]
pub struct TokenEntry {
    pub name: String,
    pub secret: String,
}

impl TokenEntry {
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { name: name.into(), secret: secret.into() }
    }
}

// secrets stay out of logs
impl fmt::Debug for TokenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEntry")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let entry = TokenEntry::new("github", "ghp_very_secret");
        let printed = format!("{:?}", entry);
        assert!(printed.contains("github"));
        assert!(!printed.contains("ghp_very_secret"));
    }
}
