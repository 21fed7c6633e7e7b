//! `draftmark student` commands

use crate::cli::{Cli, OutputFormat, StudentCommands};
use draftmark_core::error::Result;
use draftmark_core::store::Store;

pub fn execute(cli: &Cli, store: &Store, command: &StudentCommands) -> Result<()> {
    match command {
        StudentCommands::Add { name } => {
            let student = store.db().create_student(name)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&student)?);
                }
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!("Added student {} (id {})", student.name, student.id);
                    }
                }
            }
            Ok(())
        }
    }
}
