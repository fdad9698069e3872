//! roam CLI - Command-line travel diary
//!
//! Capture photos with the place they were taken and a short note.

mod cli;
mod commands;
mod error;
mod permissions;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::{resolve_data_dir, resolve_entry_text, Workspace};
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::gallery::run_gallery;
use crate::commands::list::run_list;
use crate::commands::status::run_status;
use crate::error::CliError;
use crate::permissions::TerminalPrompt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "roam=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let workspace = Workspace::open(resolve_data_dir(cli.data_dir));

    match cli.command {
        Commands::Add {
            text,
            photo,
            pick,
            skip_location,
        } => {
            let text = resolve_entry_text(&text)?;
            run_add(&workspace, &text, photo, pick, skip_location).await?;
        }
        Commands::List { json } => run_list(&workspace, json).await?,
        Commands::Delete { index, yes } => {
            run_delete(&workspace, index, yes, &TerminalPrompt::new()).await?;
        }
        Commands::Gallery { json } => run_gallery(&workspace, json).await?,
        Commands::Status { json } => run_status(&workspace, json).await?,
        Commands::Export { format, output } => {
            run_export(&workspace, format.into(), output.as_deref()).await?;
        }
        Commands::Config { command } => run_config(&workspace, command)?,
    }

    Ok(())
}
