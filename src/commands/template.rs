//! `draftmark template` commands - rubric templates, criteria and examples

use crate::cli::{Cli, OutputFormat, TemplateCommands};
use draftmark_core::error::Result;
use draftmark_core::store::Store;

pub fn execute(cli: &Cli, store: &Store, command: &TemplateCommands) -> Result<()> {
    match command {
        TemplateCommands::Add { name, created_by } => {
            let template = store.db().create_template(name, created_by.as_deref())?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&template)?);
                }
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!("Created template \"{}\" (id {})", template.name, template.id);
                    }
                }
            }
            Ok(())
        }

        TemplateCommands::Criterion {
            template_id,
            name,
            description,
            max_score,
        } => {
            let criterion = store
                .db()
                .add_criterion(*template_id, name, description, *max_score)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&criterion)?);
                }
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!(
                            "Added criterion \"{}\" (id {}, max score {})",
                            criterion.name, criterion.id, criterion.max_score
                        );
                    }
                }
            }
            Ok(())
        }

        TemplateCommands::Example {
            criterion_id,
            text,
            score,
            feedback,
        } => {
            let example = store
                .db()
                .add_example(*criterion_id, text, *score, feedback)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&example)?);
                }
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!(
                            "Added example (id {}) scoring {} for criterion {}",
                            example.id, example.example_score, example.criterion_id
                        );
                    }
                }
            }
            Ok(())
        }

        TemplateCommands::Show { template_id } => show_template(cli, store, *template_id),

        TemplateCommands::List => {
            let templates = store.db().list_templates()?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&templates)?);
                }
                OutputFormat::Human => {
                    if templates.is_empty() {
                        println!("No templates.");
                    }
                    for template in &templates {
                        println!("{}  {}", template.id, template.name);
                    }
                }
            }
            Ok(())
        }
    }
}

fn show_template(cli: &Cli, store: &Store, template_id: i64) -> Result<()> {
    let template = store.db().find_template(template_id)?;
    let criteria = store.db().criteria_for_template(template_id)?;

    match cli.format {
        OutputFormat::Json => {
            let mut criteria_json = Vec::with_capacity(criteria.len());
            for criterion in &criteria {
                let examples = store.db().examples_for_criterion(criterion.id)?;
                criteria_json.push(serde_json::json!({
                    "criterion": criterion,
                    "examples": examples,
                }));
            }
            let output = serde_json::json!({
                "template": template,
                "criteria": criteria_json,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            println!("Template {} \"{}\"", template.id, template.name);
            if let Some(author) = &template.created_by {
                println!("  created by {}", author);
            }
            for criterion in &criteria {
                println!(
                    "  [{}] {} (max {}): {}",
                    criterion.id, criterion.name, criterion.max_score, criterion.description
                );
                for example in store.db().examples_for_criterion(criterion.id)? {
                    println!(
                        "      example {} -> score {}",
                        example.id, example.example_score
                    );
                }
            }
        }
    }

    Ok(())
}
