//! Resolve command - bind identifiers in a JSON syntax tree

use super::{load_config, resolver_options};
use anyhow::{Context, Result};
use marv_config::DiagnosticFormat;
use marv_resolver::ast::{VersionedProgram, AST_VERSION};
use marv_resolver::{sort_diagnostics, Diagnostic, Resolver};
use std::fs;
use std::path::PathBuf;

/// Arguments of `marv resolve`
#[derive(Debug, Clone, Default)]
pub struct ResolveArgs {
    pub file: PathBuf,
    pub json: bool,
    pub dump: bool,
    pub source: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Resolve a syntax tree file and report diagnostics
///
/// Fails when the tree cannot be read or when resolution reported an error.
pub fn run(args: ResolveArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let display = args.file.display().to_string();

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read syntax tree: {}", display))?;
    let versioned = VersionedProgram::from_json(&text)
        .with_context(|| format!("Failed to parse syntax tree: {}", display))?;
    if versioned.ast_version != AST_VERSION {
        return Err(anyhow::anyhow!(
            "Unsupported syntax tree version {} in {} (expected {})",
            versioned.ast_version,
            display,
            AST_VERSION
        ));
    }

    // Diagnostics point at the source file when one is given
    let (source, report_file) = match &args.source {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read source file: {}", path.display()))?;
            (Some(text), path.display().to_string())
        }
        None => (None, display.clone()),
    };

    let resolver = Resolver::with_options(resolver_options(&config, &report_file)?);
    let resolution = resolver.resolve(versioned.program);
    let tree_file = &display;
    tracing::info!(
        declarations = resolution.registry.len(),
        diagnostics = resolution.diagnostics.len(),
        "resolved {}",
        tree_file
    );

    let error_count = resolution.errors().count();
    let mut diagnostics: Vec<Diagnostic> = match &source {
        Some(text) => resolution
            .diagnostics
            .iter()
            .cloned()
            .map(|diag| diag.with_source(text))
            .collect(),
        None => resolution.diagnostics.clone(),
    };
    if config.sort_diagnostics() {
        sort_diagnostics(&mut diagnostics);
    }

    let use_json = args.json || config.diagnostic_format() == DiagnosticFormat::Json;
    if use_json {
        eprintln!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        for diag in &diagnostics {
            eprint!("{}", diag.to_human_string());
        }
    }

    if args.dump {
        let resolved = VersionedProgram::new(resolution.program);
        println!("{}", resolved.to_json()?);
    } else if !use_json && error_count == 0 {
        println!("{}: No errors found", display);
    }

    if error_count > 0 {
        return Err(anyhow::anyhow!(
            "Resolution failed with {} error(s)",
            error_count
        ));
    }
    Ok(())
}
