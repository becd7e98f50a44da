//! Directory service configuration.

/// Limits applied by the directory service.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Upper bound for `take` in list requests (default: 1000).
    pub max_page_size: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            max_page_size: 1000,
        }
    }
}
