#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the lookup table is matched against an entered identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMatch {
    /// `column = code`
    #[default]
    Exact,
    /// `column LIKE %code%`
    Pattern,
}

impl std::fmt::Display for LookupMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupMatch::Exact => write!(f, "exact"),
            LookupMatch::Pattern => write!(f, "pattern"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub remote_url: String,
    pub remote_key: String,
    pub user_agent: String,
    pub visit_table: String,
    pub lookup_table: String,
    pub lookup_key_column: String,
    pub lookup_name_column: String,
    pub lookup_match: LookupMatch,
    pub lookup_debounce_ms: u64,
    pub location_timeout_ms: u64,
    pub success_reset_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("remote_url", &self.remote_url)
            .field("remote_key", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("visit_table", &self.visit_table)
            .field("lookup_table", &self.lookup_table)
            .field("lookup_key_column", &self.lookup_key_column)
            .field("lookup_name_column", &self.lookup_name_column)
            .field("lookup_match", &self.lookup_match)
            .field("lookup_debounce_ms", &self.lookup_debounce_ms)
            .field("location_timeout_ms", &self.location_timeout_ms)
            .field("success_reset_ms", &self.success_reset_ms)
            .finish()
    }
}
