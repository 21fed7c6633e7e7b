//! `draftmark assignment` commands

use crate::cli::{AssignmentCommands, Cli, OutputFormat};
use draftmark_core::error::Result;
use draftmark_core::store::Store;

pub fn execute(cli: &Cli, store: &Store, command: &AssignmentCommands) -> Result<()> {
    match command {
        AssignmentCommands::Add {
            title,
            description,
            instructions,
        } => {
            let assignment = store.db().create_assignment(
                title,
                description.as_deref(),
                instructions.as_deref(),
            )?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&assignment)?);
                }
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!(
                            "Added assignment \"{}\" (id {})",
                            assignment.title, assignment.id
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
