//! `draftmark init` command - create a new store

use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use draftmark_core::error::Result;
use draftmark_core::store::Store;

pub fn execute(cli: &Cli, root: &Path) -> Result<()> {
    let store = Store::init(root)?;

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "status": "ok",
                "store": store.root().display().to_string(),
                "message": "Store initialized"
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!("Initialized draftmark store at {}", store.root().display());
            }
        }
    }

    Ok(())
}
