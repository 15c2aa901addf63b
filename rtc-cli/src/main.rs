mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use cli::{Cli, Commands, ConfigCommands};
use colored::Colorize;
use commands::IssueRequest;
use config::{CliConfig, NOT_SET};
use error::Result;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Issue {
            channel,
            uid,
            role,
            expire,
            inspect,
            credentials,
        } => commands::handle_issue_command(
            IssueRequest {
                channel,
                uid,
                role,
                expire,
                inspect,
                credentials,
            },
            cli.json,
            cli.verbose,
        ),
        Commands::IssueRtm {
            account,
            expire,
            credentials,
        } => commands::handle_issue_rtm_command(
            account,
            expire,
            credentials,
            cli.json,
            cli.verbose,
        ),
        Commands::Inspect {
            token,
            token_file,
            lenient,
        } => commands::handle_inspect_command(token, token_file, lenient, cli.json, cli.verbose),
        Commands::Config { command } => handle_config_command(command, cli.json),
    }
}

fn handle_config_command(command: ConfigCommands, json_output: bool) -> Result<()> {
    match command {
        ConfigCommands::Init { force } => {
            let config_path = CliConfig::config_file_path()?;

            if config_path.exists() && !force {
                if json_output {
                    let output = json!({
                        "success": false,
                        "error": "Configuration file already exists. Use --force to overwrite.",
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!(
                        "{} Configuration file already exists at: {}",
                        "!".yellow(),
                        config_path.display()
                    );
                    println!("Use --force to overwrite.");
                }
                return Ok(());
            }

            let config = CliConfig::default();
            config.save()?;

            if json_output {
                let output = json!({
                    "success": true,
                    "path": config_path,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!(
                    "{} Configuration initialized at: {}",
                    "✓".green(),
                    config_path.display()
                );
            }
        }

        ConfigCommands::Set { key, value } => {
            let mut config = CliConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;

            if json_output {
                let output = json!({
                    "success": true,
                    "key": key,
                    "value": value,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{} Set {key} = {value}", "✓".green());
            }
        }

        ConfigCommands::Get { key } => {
            let config = CliConfig::load()?;

            if let Some(key) = key {
                let value = config.get(&key)?;

                if json_output {
                    let output = json!({
                        key: value,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("{key} = {}", value.as_deref().unwrap_or(NOT_SET));
                }
            } else if json_output {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("{}", "Configuration:".bright_cyan());
                for key in CliConfig::KEYS {
                    let value = config.get(key)?;
                    println!("  {key}: {}", value.as_deref().unwrap_or(NOT_SET));
                }
            }
        }

        ConfigCommands::Path => {
            let path = CliConfig::config_file_path()?;

            if json_output {
                let output = json!({
                    "config_path": path,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
