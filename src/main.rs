// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! bomtree CLI - equipment bill-of-materials trees

use anyhow::Result;
use bomtree::commands::{self, doc::DocArgs, item::ItemFields};
use bomtree::config;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bomtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "BOMTREE_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "BOMTREE_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    no_color: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage BOM documents
    Doc {
        /// Action: create, list, select, show, status, delete
        action: String,

        /// Document ID or equipment code
        id: Option<String>,

        #[command(flatten)]
        args: DocArgs,
    },

    /// Edit the item tree of a document
    Item {
        /// Action: add, edit, delete, toggle, show
        action: String,

        /// Item ID
        target: Option<String>,

        /// Document ID or equipment code (defaults to the selected document)
        #[arg(long)]
        doc: Option<String>,

        /// Parent item ID for add (omit for a top-level item)
        #[arg(long)]
        parent: Option<String>,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Export a document to various formats
    Export {
        /// Output format (csv, json, dot)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,

        /// Document ID or equipment code (defaults to the selected document)
        #[arg(long)]
        doc: Option<String>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key
        key: String,

        /// Value to set (omit to get)
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir.clone() {
        settings.data_dir = dir;
    }

    // Logs go to stderr so --json output stays machine readable
    let log_level = match cli.verbose {
        0 if cli.quiet => "error".to_string(),
        0 => settings.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context {
        data_dir: settings.data_dir.clone(),
        strict_targets: settings.strict_targets,
        json: cli.json,
        color: settings.color && !cli.no_color,
    };

    match cli.command {
        Commands::Doc { action, id, args } => commands::doc::run(&ctx, &action, id, args),
        Commands::Item {
            action,
            target,
            doc,
            parent,
            fields,
        } => commands::item::run(&ctx, &action, target, doc, parent, fields),
        Commands::Export { format, output, doc } => {
            commands::export::run(&ctx, &format, output, doc)
        }
        Commands::Config { key, value } => {
            commands::config::run(cli.config.as_deref(), &settings, &key, value)
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
