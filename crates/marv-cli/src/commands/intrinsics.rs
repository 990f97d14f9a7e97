//! Intrinsics command - list the names the root scope starts with

use super::{load_config, resolver_options};
use anyhow::Result;
use std::path::Path;

/// Print the effective intrinsic names, one per line or as a JSON array
pub fn run(json: bool, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let options = resolver_options(&config, "<intrinsics>")?;
    let names: Vec<&str> = options.intrinsics.iter().map(|name| name.as_str()).collect();

    if json {
        println!("{}", serde_json::to_string(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}
