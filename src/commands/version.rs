//! `draftmark version` commands - rubric version lifecycle

use draftmark_core::model::RubricVersion;

use crate::cli::{Cli, OutputFormat, VersionCommands};
use draftmark_core::error::Result;
use draftmark_core::store::Store;

pub fn execute(cli: &Cli, store: &Store, command: &VersionCommands) -> Result<()> {
    match command {
        VersionCommands::Create {
            assignment_id,
            template_id,
        } => {
            let version = store
                .db()
                .create_new_version(*assignment_id, *template_id)?;
            print_version(cli, &version, "Created")?;
            Ok(())
        }

        VersionCommands::Activate {
            version_id,
            assignment_id,
        } => {
            let version = store.db().set_active_version(*version_id, *assignment_id)?;
            print_version(cli, &version, "Activated")?;
            Ok(())
        }

        VersionCommands::List { assignment_id } => {
            let versions = store.db().list_versions(*assignment_id)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&versions)?);
                }
                OutputFormat::Human => {
                    if versions.is_empty() {
                        println!("No versions for assignment {}.", assignment_id);
                    }
                    for version in &versions {
                        let marker = if version.is_active { " (active)" } else { "" };
                        println!(
                            "{}  v{} template {}{}",
                            version.id, version.version_number, version.template_id, marker
                        );
                    }
                }
            }
            Ok(())
        }
    }
}

fn print_version(cli: &Cli, version: &RubricVersion, verb: &str) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(version)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!(
                    "{} version {} (v{} of assignment {}, template {})",
                    verb,
                    version.id,
                    version.version_number,
                    version.assignment_id,
                    version.template_id
                );
            }
        }
    }
    Ok(())
}
