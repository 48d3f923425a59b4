//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold deep-link matching and URI permission-scope settings.
//! - Load settings from JSON with per-field defaults.
//!
//! # Invariants
//! - Deep-link scheme and host are never empty after validation.
//! - Scheme comparisons are ASCII case-insensitive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default deep-link scheme accepted by the navigation reducer.
pub const DEFAULT_DEEP_LINK_SCHEME: &str = "app";
/// Default deep-link host accepted by the navigation reducer.
pub const DEFAULT_DEEP_LINK_HOST: &str = "picday.co";
/// URI scheme whose read grants must be released after detaching.
pub const DEFAULT_SCOPED_URI_SCHEME: &str = "content";

/// Top-level configuration for core state machines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub deep_link: DeepLinkConfig,
    pub uri_scope: UriScopePolicy,
}

impl CoreConfig {
    /// Parses and validates configuration from JSON text.
    ///
    /// Missing fields fall back to defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.deep_link.validate()?;
        for scheme in &self.uri_scope.schemes {
            validate_scheme(scheme)?;
        }
        Ok(())
    }
}

/// Accepted deep-link origin: `scheme://host/diary/{YYYY-MM-DD}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepLinkConfig {
    pub scheme: String,
    pub host: String,
}

impl Default for DeepLinkConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_DEEP_LINK_SCHEME.to_string(),
            host: DEFAULT_DEEP_LINK_HOST.to_string(),
        }
    }
}

impl DeepLinkConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_scheme(&self.scheme)?;
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        Ok(())
    }
}

/// URI schemes that carry OS-level persisted read grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UriScopePolicy {
    pub schemes: Vec<String>,
}

impl Default for UriScopePolicy {
    fn default() -> Self {
        Self {
            schemes: vec![DEFAULT_SCOPED_URI_SCHEME.to_string()],
        }
    }
}

impl UriScopePolicy {
    /// Policy that treats no URI as scoped.
    pub fn none() -> Self {
        Self {
            schemes: Vec::new(),
        }
    }

    /// Returns whether `uri` uses a permission-scoped scheme.
    pub fn is_scoped(&self, uri: &str) -> bool {
        let Some((scheme, _)) = uri.trim().split_once("://") else {
            return false;
        };
        self.schemes
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(scheme))
    }
}

/// Configuration load/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    EmptyScheme,
    InvalidScheme(String),
    EmptyHost,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid config json: {message}"),
            Self::EmptyScheme => write!(f, "uri scheme must not be empty"),
            Self::InvalidScheme(value) => write!(f, "invalid uri scheme: `{value}`"),
            Self::EmptyHost => write!(f, "deep link host must not be empty"),
        }
    }
}

impl Error for ConfigError {}

fn validate_scheme(scheme: &str) -> Result<(), ConfigError> {
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return Err(ConfigError::EmptyScheme);
    };
    // RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return Err(ConfigError::InvalidScheme(scheme.to_string()));
    }
    Ok(())
}
