//! MCAT CLI - project editing tool
//!
//! Command-line interface for MCAT analysis projects.

use clap::Parser;
use env_logger::Env;
use log::info;

use mcat::cli::commands;
use mcat::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("MCAT CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("MCAT CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::New { path, force } => commands::create_project(&path, force),
        Commands::AddSample {
            path,
            name,
            treatment,
            raw_image,
            roi,
        } => commands::add_sample(
            &path,
            &name,
            treatment.as_deref(),
            raw_image.as_deref(),
            roi.as_deref(),
        ),
        Commands::Show { path, sample, all } => commands::show(&path, sample.as_deref(), all),
        Commands::Set {
            path,
            key,
            value,
            sample,
        } => commands::set_parameter(&path, &key, &value, sample.as_deref()),
        Commands::AddParameter {
            path,
            sample,
            key,
            field_type,
            value,
        } => commands::add_parameter(&path, &sample, &key, &field_type, value.as_deref()),
        Commands::Validate { path } => {
            if !commands::validate(&path)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Generate {
            field_type,
            from,
            to,
            step,
            generator,
        } => commands::generate(&field_type, &from, &to, &step, &generator),
        Commands::Label { path, sample } => commands::label(&path, sample.as_deref()),
    }
}
