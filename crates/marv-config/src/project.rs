//! Project Configuration (marv.toml)
//!
//! Handles project-level configuration stored in `marv.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Project configuration from marv.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Resolver settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverConfig>,

    /// Diagnostic output settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<DiagnosticsConfig>,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Replaces the built-in intrinsic names entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intrinsics: Option<Vec<String>>,

    /// Added on top of the (built-in or replaced) intrinsic names
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_intrinsics: Vec<String>,

    /// Report uses with no matching declaration (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_unresolved: Option<bool>,
}

/// Diagnostic output configuration, shared by project and global config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Output format (default: human)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DiagnosticFormat>,

    /// Sort errors before warnings, then by location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,
}

impl DiagnosticsConfig {
    /// Overlay `other` onto this section; set fields in `other` win
    pub fn merge(&mut self, other: &DiagnosticsConfig) {
        if other.format.is_some() {
            self.format = other.format;
        }
        if other.sort.is_some() {
            self.sort = other.sort;
        }
    }
}

/// How diagnostics are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for DiagnosticFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(DiagnosticFormat::Human),
            "json" => Ok(DiagnosticFormat::Json),
            other => Err(ConfigError::InvalidValue {
                field: "diagnostics.format".to_string(),
                reason: format!("must be 'human' or 'json', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for DiagnosticFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticFormat::Human => write!(f, "human"),
            DiagnosticFormat::Json => write!(f, "json"),
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(resolver) = &self.resolver {
            if let Some(names) = &resolver.intrinsics {
                validate_names("resolver.intrinsics", names)?;
            }
            validate_names("resolver.extra_intrinsics", &resolver.extra_intrinsics)?;
        }
        Ok(())
    }

    /// Intrinsic names replacing the built-in set, if configured
    pub fn intrinsics(&self) -> Option<&[String]> {
        self.resolver.as_ref().and_then(|r| r.intrinsics.as_deref())
    }

    pub fn extra_intrinsics(&self) -> &[String] {
        self.resolver
            .as_ref()
            .map(|r| r.extra_intrinsics.as_slice())
            .unwrap_or(&[])
    }

    pub fn warn_unresolved(&self) -> Option<bool> {
        self.resolver.as_ref().and_then(|r| r.warn_unresolved)
    }

    /// Mutable resolver section, created on first use
    pub fn resolver_mut(&mut self) -> &mut ResolverConfig {
        self.resolver.get_or_insert_with(ResolverConfig::default)
    }

    /// Mutable diagnostics section, created on first use
    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticsConfig {
        self.diagnostics.get_or_insert_with(DiagnosticsConfig::default)
    }
}

/// Intrinsic names must be usable identifiers
fn validate_names(field: &str, names: &[String]) -> ConfigResult<()> {
    for (index, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}[{}]", field, index),
                reason: "intrinsic names must not be empty".to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}[{}]", field, index),
                reason: format!("'{}' contains whitespace", name),
            });
        }
    }
    Ok(())
}
