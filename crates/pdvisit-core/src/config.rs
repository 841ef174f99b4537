use crate::app_config::{AppConfig, Environment, LookupMatch};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    // Blank counts as unset.
    let or_default = |var: &str, default: &str| -> String {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => default.to_string(),
        }
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let remote_url = require("PDVISIT_REMOTE_URL")?;
    if !remote_url.starts_with("http://") && !remote_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "PDVISIT_REMOTE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{remote_url}'"),
        });
    }
    let remote_key = require("PDVISIT_REMOTE_KEY")?;

    let env = parse_environment(&or_default("PDVISIT_ENV", "development"))?;
    let log_level = or_default("PDVISIT_LOG_LEVEL", "info");
    let user_agent = or_default("PDVISIT_USER_AGENT", "pdvisit/0.1 (field-visits)");

    let visit_table = or_default("PDVISIT_VISIT_TABLE", "visitas_pdv");
    let lookup_table = or_default("PDVISIT_LOOKUP_TABLE", "tae");
    let lookup_key_column = or_default("PDVISIT_LOOKUP_KEY_COLUMN", "mdn");
    let lookup_name_column = or_default("PDVISIT_LOOKUP_NAME_COLUMN", "pdv");
    let lookup_match = parse_lookup_match(&or_default("PDVISIT_LOOKUP_MATCH", "exact"))?;

    let lookup_debounce_ms = parse_u64("PDVISIT_LOOKUP_DEBOUNCE_MS", "250")?;
    let location_timeout_ms = parse_u64("PDVISIT_LOCATION_TIMEOUT_MS", "10000")?;
    let success_reset_ms = parse_u64("PDVISIT_SUCCESS_RESET_MS", "3000")?;

    Ok(AppConfig {
        env,
        log_level,
        remote_url,
        remote_key,
        user_agent,
        visit_table,
        lookup_table,
        lookup_key_column,
        lookup_name_column,
        lookup_match,
        lookup_debounce_ms,
        location_timeout_ms,
        success_reset_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PDVISIT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_lookup_match(s: &str) -> Result<LookupMatch, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "exact" => Ok(LookupMatch::Exact),
        "pattern" => Ok(LookupMatch::Pattern),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PDVISIT_LOOKUP_MATCH".to_string(),
            reason: format!("expected 'exact' or 'pattern', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
