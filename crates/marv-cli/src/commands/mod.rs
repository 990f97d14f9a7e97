pub mod intrinsics;
pub mod resolve;

use anyhow::{Context, Result};
use marv_config::{Config, ConfigLoader};
use marv_resolver::{Name, ResolverOptions, DEFAULT_INTRINSICS};
use std::path::Path;

/// Load marv.toml from `explicit`, or search upward from the current directory
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    let config = match explicit {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load project configuration")?
        }
    };
    if let Some(root) = config.project_root() {
        tracing::debug!(root = %root.display(), "using project configuration");
    }
    Ok(config)
}

/// Resolver options from the effective configuration
pub fn resolver_options(config: &Config, file: &str) -> Result<ResolverOptions> {
    let intrinsics = config
        .intrinsics(DEFAULT_INTRINSICS)
        .into_iter()
        .map(|name| {
            Name::new(name.as_str()).with_context(|| format!("Invalid intrinsic name '{}'", name))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolverOptions {
        intrinsics,
        warn_unresolved: config.warn_unresolved(),
        file: file.to_string(),
    })
}
