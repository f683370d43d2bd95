use clap::{CommandFactory, Parser};
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;

use cli::Cli;
use cli::commands::Commands;
use steel_toes::{CleanOptions, Config, ProjectContext, announce, clean_branch, protected_json};

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("steel-toes")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("steel-toes.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let level = if verbose {
        "debug".to_string()
    } else {
        config.log_level.clone().unwrap_or_else(|| "info".to_string())
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn project_dir(cli: &Cli) -> &Path {
    match &cli.command {
        Some(Commands::CleanBranch { directory, .. })
        | Some(Commands::Protected { directory, .. }) => directory.as_path(),
        None => Path::new("."),
    }
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => {
            Cli::command().print_help().context("Failed to print help")?;
            Ok(())
        }
        Some(Commands::CleanBranch {
            directory,
            branch,
            dryrun,
        }) => handle_clean_branch_command(directory, branch.as_deref(), *dryrun, config),
        Some(Commands::Protected { directory, json }) => {
            handle_protected_command(directory, *json, config)
        }
    }
}

fn handle_clean_branch_command(
    directory: &Path,
    branch: Option<&str>,
    dryrun: bool,
    config: &Config,
) -> Result<()> {
    info!(
        "Cleaning branch datasets in {} (branch: {:?}, dryrun: {})",
        directory.display(),
        branch,
        dryrun
    );

    let options = CleanOptions {
        directory: directory.to_path_buf(),
        branch: branch.map(str::to_string),
        dryrun,
    };
    let report = clean_branch(&options, config).context("Failed to clean branch datasets")?;

    if report.is_empty() {
        println!("{}", "STEEL-TOES | no datasets to remove".bright_black());
        return Ok(());
    }

    for removed in &report.removed {
        let label = if report.dryrun {
            "would remove".yellow()
        } else {
            "removed".red()
        };
        println!(
            "{} {} {}",
            format!("{}:", removed.name).bright_black(),
            label,
            removed.path.display().to_string().bright_magenta()
        );
    }

    if report.dryrun {
        println!(
            "{}",
            "Run 'steel-toes clean-branch' without --dryrun to remove them.".cyan()
        );
    }
    Ok(())
}

fn handle_protected_command(directory: &Path, json: bool, config: &Config) -> Result<()> {
    info!("Listing protected datasets in {}", directory.display());

    // The listing below replaces the catalog-created announcement
    let config = Config {
        announce: false,
        ..config.clone()
    };
    let context =
        ProjectContext::bootstrap(directory, &config).context("Failed to load project")?;
    let injector = context.steel_toes.injector();

    if json {
        let output = protected_json(&context.catalog, injector)
            .context("Failed to serialize protected datasets")?;
        println!("{}", output);
    } else {
        announce(&context.catalog, injector);
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref(), project_dir(&cli))
        .context("Failed to load configuration")?;

    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
