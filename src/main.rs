//! shrubnet CLI - Command line interface for shrubnet
//!
//! Maintains a JSON table of networks and answers longest-prefix-match
//! queries against it.

use clap::{Parser, Subcommand};
use serde_json::Value;
use shrubnet::{NetTree, NetworkTable};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shrubnet")]
#[command(about = "Longest-prefix-match lookup of IP addresses against a network table")]
#[command(version)]
struct Cli {
    /// Path to the network table (default: ~/.config/shrubnet/networks.json)
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty network table
    Init,

    /// Add a network to the table
    Add {
        /// Network in CIDR notation
        network: String,
        /// Value returned on a match (JSON, or a plain string)
        value: String,
    },

    /// List the networks in the table
    List,

    /// Find the most specific network containing each address
    Lookup {
        /// Addresses to look up
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let table_path = match &cli.table {
        Some(path) => path.clone(),
        None => NetworkTable::default_path()?,
    };

    match cli.command {
        Commands::Init => {
            NetworkTable::create(&table_path)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "message": format!("Created table at {}", table_path.display())
                }),
            )?;
        }

        Commands::Add { network, value } => {
            let mut table = NetworkTable::open(&table_path)?;
            let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            table.add(&network, value.clone())?;
            table.save()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "network": network,
                    "value": value
                }),
            )?;
        }

        Commands::List => {
            let table = NetworkTable::open(&table_path)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "count": table.entries().len(),
                    "networks": table.entries()
                }),
            )?;
        }

        Commands::Lookup { addresses } => {
            let table = NetworkTable::open(&table_path)?;
            let tree = table.to_tree()?;

            let items: Vec<_> = addresses.iter().map(|a| lookup_json(&tree, a)).collect();
            let failed = items.iter().any(|item| item["status"] == "error");
            output(
                &cli.format,
                &serde_json::json!({
                    "count": items.len(),
                    "results": items
                }),
            )?;
            if failed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn lookup_json(tree: &NetTree<Value>, address: &str) -> Value {
    match tree.lookup_str(address) {
        Ok(Some(found)) => serde_json::json!({
            "address": address,
            "status": "ok",
            "matched": true,
            "network": found.network.to_string(),
            "prefix": found.prefix_len(),
            "value": found.value
        }),
        Ok(None) => serde_json::json!({
            "address": address,
            "status": "ok",
            "matched": false
        }),
        Err(e) => serde_json::json!({
            "address": address,
            "status": "error",
            "message": e.to_string()
        }),
    }
}

fn output(format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
