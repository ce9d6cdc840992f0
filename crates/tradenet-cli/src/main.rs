//! TradeNet CLI - Command-line interface for TradeNet
//!
//! This is the main entry point for users. It loads a trade CSV, ranks a
//! reporter's partners and prints or exports the resulting graph and map.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tradenet_graph::LayoutKind;
use tradenet_server::ViewConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "tradenet")]
#[command(author = "TradeNet Contributors")]
#[command(version)]
#[command(about = "Top trading partners as a network graph and a map", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to .tradenet/config.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config to .tradenet/config.json
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List the reporting countries in a dataset
    Reporters {
        /// Trade data CSV
        file: PathBuf,
    },

    /// Rank a reporter's top trading partners
    Partners {
        /// Trade data CSV
        file: PathBuf,

        /// Reporting country (defaults to the first in the dataset)
        #[arg(short, long)]
        reporter: Option<String>,

        /// Number of partners to keep
        #[arg(short = 'k', long)]
        top: Option<usize>,

        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Build the trade network graph and its layout
    Graph {
        /// Trade data CSV
        file: PathBuf,

        /// Reporting country (defaults to the first in the dataset)
        #[arg(short, long)]
        reporter: Option<String>,

        /// Layout: spring, circular or kamada-kawai
        #[arg(short, long)]
        layout: Option<LayoutKind>,

        /// Write the graph JSON to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Compose map markers and trade links
    Map {
        /// Trade data CSV
        file: PathBuf,

        /// Reporting country (defaults to the first in the dataset)
        #[arg(short, long)]
        reporter: Option<String>,

        /// Re-center the map on this longitude (-180 to 180)
        #[arg(long, allow_hyphen_values = true)]
        lon_offset: Option<f64>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Compute ranking, graph and map in one JSON document
    View {
        /// Trade data CSV
        file: PathBuf,

        /// Reporting country (defaults to the first in the dataset)
        #[arg(short, long)]
        reporter: Option<String>,

        /// Layout: spring, circular or kamada-kawai
        #[arg(short, long)]
        layout: Option<LayoutKind>,

        /// Re-center the map on this longitude (-180 to 180)
        #[arg(long, allow_hyphen_values = true)]
        lon_offset: Option<f64>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the rows behind a reporter's ranking as CSV
    Export {
        /// Trade data CSV
        file: PathBuf,

        /// Reporting country (defaults to the first in the dataset)
        #[arg(short, long)]
        reporter: Option<String>,

        /// Output file (defaults to <reporter>_trade_data.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show value statistics for a reporter's top partners
    Summary {
        /// Trade data CSV
        file: PathBuf,

        /// Reporting country (defaults to the first in the dataset)
        #[arg(short, long)]
        reporter: Option<String>,
    },

    /// Answer JSON-RPC requests on stdin/stdout
    Serve {
        /// Trade data CSV
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> commands::Result<()> {
    if let Commands::Init { path } = &cli.command {
        return commands::init(path);
    }

    let cwd = std::env::current_dir()?;
    let config = ViewConfig::discover(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Reporters { file } => commands::reporters(&file),
        Commands::Partners {
            file,
            reporter,
            top,
            json,
        } => commands::partners(&file, reporter, top, json, &config),
        Commands::Graph {
            file,
            reporter,
            layout,
            output,
            json,
        } => commands::graph(&file, reporter, layout, output.as_deref(), json, &config),
        Commands::Map {
            file,
            reporter,
            lon_offset,
            json,
        } => commands::map(&file, reporter, lon_offset, json, &config),
        Commands::View {
            file,
            reporter,
            layout,
            lon_offset,
            output,
        } => commands::view(&file, reporter, layout, lon_offset, output.as_deref(), &config),
        Commands::Export {
            file,
            reporter,
            output,
        } => commands::export(&file, reporter, output.as_deref(), &config),
        Commands::Summary { file, reporter } => commands::summary(&file, reporter, &config),
        Commands::Serve { file } => commands::serve(&file, config),
    }
}
