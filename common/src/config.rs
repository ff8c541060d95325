//! Environment variable parsing helpers
//!
//! Readers for synthesizer settings and for the AWS target environment.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults, required values,
/// and type parsing.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let name = String::env_or("RDS_STACK_NAME", "RDSStack");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get a required environment variable, returning an error if not set or empty.
    fn env_required(name: &str) -> Result<String> {
        let value = env::var(name).context(format!("{} must be set", name))?;
        if value.trim().is_empty() {
            anyhow::bail!("{} must not be empty", name);
        }
        Ok(value)
    }

    /// Get an environment variable as a boolean.
    ///
    /// Accepts `true`/`1`/`yes` (case-insensitive) as true, anything else as false.
    /// Returns `default` when unset.
    fn env_bool(name: &str, default: bool) -> bool {
        env::var(name)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(default)
    }

    /// Get an environment variable parsed as a specific type.
    ///
    /// Returns `default` if the variable is not set or fails to parse.
    fn env_parse<T: FromStr>(name: &str, default: T) -> T {
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get the first of several environment variables that is set and non-empty.
    fn env_first(names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|v| !v.trim().is_empty())
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}

/// AWS target environment lookups.
///
/// Mirrors the precedence the AWS tooling uses: explicit SDK variables
/// first, then the values injected by the CDK toolkit.
pub struct AwsEnv;

impl AwsEnv {
    /// Target region, if any is configured.
    pub fn region() -> Option<String> {
        String::env_first(&["AWS_REGION", "AWS_DEFAULT_REGION", "CDK_DEFAULT_REGION"])
    }

    /// Target account id, if any is configured.
    pub fn account() -> Option<String> {
        String::env_first(&["AWS_ACCOUNT_ID", "CDK_DEFAULT_ACCOUNT"])
    }

    /// Human-readable `account/region` pair for logging.
    pub fn describe() -> String {
        format!(
            "{}/{}",
            Self::account().unwrap_or_else(|| "unknown-account".to_string()),
            Self::region().unwrap_or_else(|| "unknown-region".to_string())
        )
    }
}
