//! EvalSurvey - resumable image rating survey
//!
//! CLI entry point for rating sessions, progress reports and result export.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use resultlog::{RespondentId, Scores};
use tracing::{debug, info};

use evalsurvey::cli::{Cli, Command, ConfigCommand, OrderArgs, OutputFormat, ResultsCommand};
use evalsurvey::config::Config;
use evalsurvey::{OrderingPolicy, Survey, repl};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evalsurvey")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("es.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(image_dir = %config.image_dir.display(), results_dir = %config.results_dir.display(), "evalsurvey starting");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run { respondent, order } => {
            repl::run_interactive(&config, order.policy(config.ordering), respondent)?;
        }
        Command::Status {
            respondent,
            order,
            format,
        } => cmd_status(&config, &respondent, &order, format)?,
        Command::Catalog { format } => cmd_catalog(&config, format)?,
        Command::Rate {
            respondent,
            authenticity,
            fidelity,
            naturalness,
            harmony,
            expect,
            order,
        } => {
            let scores = Scores::from_values([authenticity, fidelity, naturalness, harmony])?;
            cmd_rate(&config, &respondent, &scores, expect.as_deref(), &order)?;
        }
        Command::Results { command } => match command {
            ResultsCommand::List => cmd_results_list(&config)?,
            ResultsCommand::Export { file, out } => cmd_results_export(&config, &file, out)?,
        },
        Command::Config { command } => match command {
            ConfigCommand::Init { path } => {
                let path = path.unwrap_or_else(|| PathBuf::from("evalsurvey.yml"));
                if path.exists() {
                    return Err(eyre::eyre!("Refusing to overwrite existing file: {}", path.display()));
                }
                Config::default().save(&path)?;
                println!("{} Wrote default config: {}", "✓".green(), path.display());
            }
        },
    }

    Ok(())
}

fn cmd_status(config: &Config, respondent: &str, order: &OrderArgs, format: OutputFormat) -> Result<()> {
    let id = RespondentId::new(respondent)?;
    let survey = Survey::from_config(config, order.one_shot_policy(config.ordering))?;
    let progress = survey.reconcile(&id)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        OutputFormat::Text => {
            println!("Respondent: {}", id.as_str().cyan());
            println!("  Total: {}", progress.total());
            println!("  Done: {}", progress.done_count());
            println!("  Remaining: {}", progress.remaining().len());
            match progress.next() {
                Some(item) => println!("  Next: {}", item.relative_path().yellow()),
                None => println!("  {}", "Complete".green()),
            }
        }
    }
    Ok(())
}

fn cmd_catalog(config: &Config, format: OutputFormat) -> Result<()> {
    let survey = Survey::from_config(config, OrderingPolicy::Canonical)?;
    let catalog = survey.catalog()?;
    let collisions = catalog.filename_collisions();

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "total": catalog.total(),
                "items": catalog.items(),
                "collisions": collisions,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for (i, item) in catalog.items().iter().enumerate() {
                println!("{:>4} {}", (i + 1).to_string().dimmed(), item.relative_path());
            }
            println!("Total: {}", catalog.total());
            for (file_name, categories) in &collisions {
                println!(
                    "{} {} appears in {} and is rated once for all of them",
                    "!".yellow(),
                    file_name.yellow(),
                    categories.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn cmd_rate(config: &Config, respondent: &str, scores: &Scores, expect: Option<&str>, order: &OrderArgs) -> Result<()> {
    let id = RespondentId::new(respondent)?;
    let survey = Survey::from_config(config, order.one_shot_policy(config.ordering))?;

    let (item, progress) = survey
        .submit_next(&id, scores, expect)
        .context(format!("Failed to rate for respondent '{}'", id))?;

    println!(
        "{} Rated {} ({} / {})",
        "✓".green(),
        item.relative_path().cyan(),
        progress.done_count(),
        progress.total()
    );
    match progress.next() {
        Some(next) => println!("Next: {}", next.relative_path()),
        None => println!("{}", "All images rated".green()),
    }
    Ok(())
}

fn cmd_results_list(config: &Config) -> Result<()> {
    let store = resultlog::LogStore::open(&config.results_dir)?;
    let entries = store.list_logs()?;
    if entries.is_empty() {
        println!("No result logs found");
        return Ok(());
    }
    for entry in entries {
        let respondent = entry
            .respondent
            .as_ref()
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{} {} {}",
            entry.file_name.cyan(),
            format!("{} bytes", entry.size).dimmed(),
            respondent
        );
    }
    Ok(())
}

fn cmd_results_export(config: &Config, file: &str, out: Option<PathBuf>) -> Result<()> {
    let store = resultlog::LogStore::open(&config.results_dir)?;
    let bytes = store.read_raw(file)?;

    match out {
        Some(path) => {
            fs::write(&path, &bytes).context(format!("Failed to write {}", path.display()))?;
            eprintln!("{} Exported {} to {}", "✓".green(), file, path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
