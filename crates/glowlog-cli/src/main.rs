//! Glowlog CLI Application
//!
//! Terminal front end for the glowlog routine tracker.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, BackendArg};
use clap::Parser;
use cli::Cli;
use glowlog_core::{
    routine::builder::DEFAULT_DOCUMENT_FILE, RoutineBuilder, StoreBackend, UserScope,
};
use jiff::Zoned;
use log::info;
use renderer::TerminalRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        backend,
        user,
        no_color,
        date,
        command,
    } = Args::parse();

    let builder = match backend {
        BackendArg::Sqlite => RoutineBuilder::new().with_database_path(database_file),
        BackendArg::Json => {
            let path = match database_file {
                Some(path) => path,
                None => RoutineBuilder::default_data_path(DEFAULT_DOCUMENT_FILE)
                    .context("Failed to locate the data directory")?,
            };
            RoutineBuilder::new().with_backend(StoreBackend::JsonFile { path })
        }
    };

    let routine = builder
        .with_scope(UserScope::new(user))
        .build()
        .await
        .context("Failed to open routine")?;

    info!("Glowlog started for {}", routine.scope());

    let date = date.unwrap_or_else(|| Zoned::now().date());
    let mut cli = Cli::new(routine, TerminalRenderer::new(!no_color), date);

    let outcome = cli.run(command).await;
    let closed = cli.shutdown().await;
    outcome.and(closed)
}
