//! Command dispatch logic for draftmark

use std::env;
use std::path::PathBuf;

use crate::cli::{Cli, Commands};
use crate::commands;
use draftmark_core::error::Result;
use draftmark_core::store::Store;

pub fn run(cli: &Cli) -> Result<()> {
    let store_root = cli
        .store
        .clone()
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    match &cli.command {
        None => handle_no_command(),

        Some(Commands::Init) => commands::init::execute(cli, &store_root),

        Some(Commands::Student { command }) => {
            let store = Store::open(&store_root)?;
            commands::student::execute(cli, &store, command)
        }

        Some(Commands::Assignment { command }) => {
            let store = Store::open(&store_root)?;
            commands::assignment::execute(cli, &store, command)
        }

        Some(Commands::Template { command }) => {
            let store = Store::open(&store_root)?;
            commands::template::execute(cli, &store, command)
        }

        Some(Commands::Version { command }) => {
            let store = Store::open(&store_root)?;
            commands::version::execute(cli, &store, command)
        }

        Some(Commands::Submit {
            assignment_id,
            student_id,
            draft,
            file,
        }) => {
            let store = Store::open(&store_root)?;
            commands::submit::execute(
                cli,
                &store,
                *assignment_id,
                *student_id,
                *draft,
                file.as_deref(),
            )
        }

        Some(Commands::Grade { command }) => {
            let store = Store::open(&store_root)?;
            commands::grade::execute(cli, &store, command)
        }
    }
}

fn handle_no_command() -> Result<()> {
    println!("draftmark - AI-assisted grading with versioned rubrics");
    println!();
    println!("Run `draftmark --help` for available commands.");
    Ok(())
}
