//! Go Marketplace CLI - Inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart show
//! gm-cart show --json
//!
//! # Add a product
//! gm-cart add --id sku-1 --title "Coffee" --image-url https://img/1.png --price 10.50
//!
//! # Change quantities
//! gm-cart increment sku-1
//! gm-cart decrement sku-1
//!
//! # Delete the persisted cart
//! gm-cart clear
//! ```
//!
//! Storage location and key come from `CART_STORAGE_DIR` / `CART_STORAGE_KEY`
//! (see `go_marketplace_cart::config`) and can be overridden per invocation.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use go_marketplace_cart::{CartConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cart")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    /// Directory of the file-backed store (overrides `CART_STORAGE_DIR`)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Storage key of the cart (overrides `CART_STORAGE_KEY`)
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show {
        /// Print the cart as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a product as a new cart line with quantity 1
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price (e.g. 10.50)
        #[arg(long)]
        price: String,
    },
    /// Add one unit to every line for a product
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit from every line for a product (never below 1)
    Decrement {
        /// Product ID
        id: String,
    },
    /// Delete the persisted cart
    Clear,
}

fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cli=info,go_marketplace_cart=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(key) = cli.key {
        config.storage_key = key;
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &CartConfig) -> Result<(), commands::CommandError> {
    match command {
        Commands::Show { json } => commands::cart::show(config, json).await,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(config, &id, title, image_url, &price).await,
        Commands::Increment { id } => commands::cart::increment(config, &id).await,
        Commands::Decrement { id } => commands::cart::decrement(config, &id).await,
        Commands::Clear => commands::cart::clear(config).await,
    }
}
