//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{DiagnosticFormat, DiagnosticsConfig, ProjectConfig};
use crate::ConfigResult;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "marv.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.marv/config.toml) - lowest priority
/// 2. Project config (./marv.toml) - overrides global
/// 3. Environment variables (MARV_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where marv.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader that reads global config from `path` instead of the home directory
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find marv.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config); a default config with no root
    /// when no marv.toml exists up to the filesystem root.
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.marv/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        // Global config is optional - if it doesn't exist, return default
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to project config
    ///
    /// - `MARV_DIAGNOSTICS`: `human` or `json`
    /// - `MARV_WARN_UNRESOLVED`: `true`/`1`/`yes` enable, anything else disables
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(format) = env::var("MARV_DIAGNOSTICS") {
            let format: DiagnosticFormat = format.parse()?;
            config.diagnostics_mut().format = Some(format);
        }

        if let Ok(warn) = env::var("MARV_WARN_UNRESOLVED") {
            let warn_bool = matches!(warn.to_lowercase().as_str(), "true" | "1" | "yes");
            config.resolver_mut().warn_unresolved = Some(warn_bool);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective intrinsic names
    ///
    /// The project list replaces `defaults` when present; extra names are
    /// appended after it, skipping duplicates.
    pub fn intrinsics(&self, defaults: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = match self.project.intrinsics() {
            Some(configured) => configured.to_vec(),
            None => defaults.iter().map(|name| name.to_string()).collect(),
        };
        for extra in self.project.extra_intrinsics() {
            if !names.contains(extra) {
                names.push(extra.clone());
            }
        }
        names
    }

    /// Whether unresolved uses are reported (default: true)
    pub fn warn_unresolved(&self) -> bool {
        self.project.warn_unresolved().unwrap_or(true)
    }

    /// Diagnostic settings with project values layered over global ones
    pub fn diagnostics(&self) -> DiagnosticsConfig {
        let mut merged = self.global.diagnostics.clone().unwrap_or_default();
        if let Some(project) = &self.project.diagnostics {
            merged.merge(project);
        }
        merged
    }

    /// Effective diagnostic format (project > global > human)
    pub fn diagnostic_format(&self) -> DiagnosticFormat {
        self.diagnostics().format.unwrap_or_default()
    }

    /// Whether diagnostics are sorted before printing (default: false)
    pub fn sort_diagnostics(&self) -> bool {
        self.diagnostics().sort.unwrap_or(false)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has marv.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
