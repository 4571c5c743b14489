//! subprompt CLI — the main entry point.
//!
//! Commands:
//! - `split`     — Tokenize a prompt into weighted sub-prompts
//! - `log`       — Append a run to the CSV run log
//! - `metadata`  — Print the PNG/EXIF metadata records for a run
//! - `config`    — Show, validate, or initialize configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subprompt_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "subprompt",
    about = "subprompt — weighted sub-prompt tokenizer",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.subprompt/config.toml)
    #[arg(long, global = true, env = "SUBPROMPT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a prompt into weighted sub-prompts
    Split {
        /// Prompt such as "a cat:0.5 a dog:1.5"
        prompt: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Tokenize a prompt and append the run to the run log
    Log {
        prompt: String,

        /// Extra column, repeatable (e.g. --param seed=42)
        #[arg(short, long = "param", value_parser = commands::log_cmd::parse_param)]
        params: Vec<(String, String)>,

        /// Override the run log path
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Print image metadata records for a generation as JSON
    Metadata(commands::metadata::MetadataArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Print (or write) a default configuration file
    Init {
        /// Write to the config path instead of printing
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);

    // `config validate` reports load errors itself.
    let config = match &cli.command {
        Commands::Config {
            action: ConfigAction::Validate,
        } => AppConfig::load_with_env(&config_path).unwrap_or_default(),
        _ => AppConfig::load_with_env(&config_path)?,
    };

    // Initialize tracing
    let filter = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Split { prompt, json } => commands::split::run(&config, &prompt, json)?,
        Commands::Log {
            prompt,
            params,
            path,
        } => commands::log_cmd::run(&config, &prompt, params, path)?,
        Commands::Metadata(args) => commands::metadata::run(&config, args)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&config)?,
            ConfigAction::Validate => commands::config_cmd::validate(&config_path)?,
            ConfigAction::Init { write } => commands::config_cmd::init(&config_path, write)?,
        },
    }

    Ok(())
}
