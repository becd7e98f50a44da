//! Identity configuration.

/// Password policy and hashing settings.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length in characters (default: 6).
    pub min_password_length: usize,
    /// Maximum password length in characters (default: 128).
    pub max_password_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 6,
            max_password_length: 128,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}
