pub mod app_config;
pub mod config;
pub mod identifier;
pub mod route;
pub mod visit;

pub use app_config::{AppConfig, Environment, LookupMatch};
pub use config::{load_app_config, load_app_config_from_env};
pub use identifier::{accepts_identifier_input, IdentifierCode, IDENTIFIER_LEN};
pub use route::RouteCode;
pub use visit::{Fix, ResolvedName, VisitDraft, VisitRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid route code: {0}")]
    InvalidRoute(String),

    #[error("identifier must be exactly 8 digits, got {0:?}")]
    InvalidIdentifier(String),
}

/// Reasons a draft cannot be turned into a submittable [`VisitRecord`].
///
/// Checked in declaration order; the first failure wins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("identifier has {len} digits, expected 8")]
    IdentifierLength { len: usize },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("identifier contains non-digit characters")]
    IdentifierNotNumeric,
}
