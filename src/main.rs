mod cli;
mod commands;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Command};
use commands::AppPaths;
use qrpocket::model::InfoPage;

fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qrpocket={}", level)));

    // The terminal UI owns the screen, so its logs go to a file
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Could not open log file: {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

fn default_data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .context("Could not determine data directory")?
        .join("qrpocket"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Could not create data directory: {}", data_dir.display()))?;
    let paths = AppPaths::new(data_dir);

    let tui_mode = matches!(&cli.command, Command::Scan(args) if !args.headless);
    let log_file = paths.log_file();
    init_tracing(&cli.log_level, tui_mode.then_some(log_file.as_path()))?;

    match cli.command {
        Command::Generate(args) => commands::generate(&paths, args).await,
        Command::Saved { export_dir } => commands::saved(&paths, export_dir.as_deref()).await,
        Command::Delete { id, yes } => commands::delete(&paths, id, yes).await,
        Command::Scan(args) => commands::scan(&paths, args).await,
        Command::Register { name, email, place, password } => {
            commands::register(&paths, name, email, place, password).await
        }
        Command::Login { email, password } => commands::login(&paths, email, password).await,
        Command::Logout => commands::logout(&paths),
        Command::Profile => commands::profile(&paths).await,
        Command::About => commands::info(InfoPage::AboutUs),
        Command::Contact => commands::info(InfoPage::ContactUs),
    }
}
