use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use console::style;
use costctl::assets::{build, BuildOptions, ResourceGraph};
use costctl::config::{self, Config};
use costctl::pricing::StaticPriceCache;
use costctl::records::load_records;
use costctl::report::estimate;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "costctl")]
#[command(
    about = "Estimate recurring cloud infrastructure costs from asset inventory exports",
    long_about = "costctl reconciles a cloud asset inventory export into a resource graph\nand prices it against tiered price schedules.\n\nReports:\n  - Worst-case (ceiling) monthly cost\n  - Projected monthly cost\n  - Per-shape resource counts"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate monthly costs for an asset export
    Estimate {
        /// Asset inventory export (JSON)
        #[arg(long)]
        assets: PathBuf,
        /// Price file (TOML or JSON)
        #[arg(long)]
        prices: PathBuf,
        /// Output format (table, csv, json)
        #[arg(long, default_value = "table")]
        format: String,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the reconciled resource graph
    Graph {
        /// Asset inventory export (JSON)
        #[arg(long)]
        assets: PathBuf,
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Initialize configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".costctl.toml")]
        output: PathBuf,
    },
}

fn load_graph(assets: &Path, config: &Config) -> Result<ResourceGraph> {
    let records = load_records(assets)?;
    Ok(build(&records, &BuildOptions::from(config))?)
}

fn show_graph(graph: &ResourceGraph, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(graph)?);
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Kind", "Count"]);
    for (kind, count) in graph.counts() {
        table.add_row(vec![kind.to_string(), count.to_string()]);
    }
    println!("{}", table);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging - only warnings and errors unless verbose
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config
    let config = Config::load(cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Estimate {
            assets,
            prices,
            format,
            output,
        } => {
            let graph = load_graph(&assets, &config)?;
            let cache = StaticPriceCache::load(&prices)?;
            let report = estimate(&graph, &cache, &config)?;
            for warning in &report.warnings {
                eprintln!(
                    "{} {} x {}: {}",
                    style("WARNING").yellow().bold(),
                    warning.count,
                    warning.resource,
                    warning.message
                );
            }
            report.export(&format, output.as_deref())?;
        }
        Commands::Graph { assets, format } => {
            let graph = load_graph(&assets, &config)?;
            show_graph(&graph, &format)?;
        }
        Commands::Init { output } => {
            config::init_config(&output)?;
        }
    }

    Ok(())
}
