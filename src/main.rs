mod cli;
mod config;
mod db;
mod engine;
mod error;
mod models;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers::{self, Ctx};
use config::AppConfig;
use db::migrations::run_migrations;
use engine::SystemClock;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    let db_path = config.ensure_db_dir()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    log::debug!("using database {:?}", db_path);

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    let ctx = Ctx::new(&conn, &config, SystemClock);

    match cli.command {
        Some(Commands::Add { title, description }) => {
            handlers::handle_add(&ctx, &title, &description)?;
        }
        Some(Commands::List) => {
            handlers::handle_list(&ctx)?;
        }
        Some(Commands::Show { habit }) => {
            handlers::handle_show(&ctx, &habit)?;
        }
        Some(Commands::Edit {
            habit,
            title,
            description,
        }) => {
            handlers::handle_edit(&ctx, &habit, title.as_deref(), description.as_deref())?;
        }
        Some(Commands::Remove { habit }) => {
            handlers::handle_remove(&ctx, &habit)?;
        }
        Some(Commands::Done { habit, date }) => {
            handlers::handle_done(&ctx, &habit, date.as_deref())?;
        }
        Some(Commands::Logs { habit }) => {
            handlers::handle_logs(&ctx, &habit)?;
        }
        Some(Commands::Progress { habit, json }) => {
            handlers::handle_progress(&ctx, &habit, json)?;
        }
        Some(Commands::Stats { week, json }) => {
            handlers::handle_stats(&ctx, week, json)?;
        }
        Some(Commands::Export) => {
            handlers::handle_export(&ctx)?;
        }
        Some(Commands::Config { init }) => {
            handlers::handle_config(&config, init)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}
