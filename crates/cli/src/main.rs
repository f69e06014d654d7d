//! Bizdesk CLI - seeding and customer tools.
//!
//! # Usage
//!
//! ```bash
//! # Create profiles, accounts and customers from a YAML file
//! bizdesk seed --file seed.yaml
//!
//! # List active customers whose fields mention "truck", by name
//! bizdesk customers list --search truck --sort name
//!
//! # List the archive, newest code first
//! bizdesk customers list --archived --desc
//!
//! # Print the next customer code
//! bizdesk customers next-id
//!
//! # Show who asked for password help, newest first
//! bizdesk help-requests
//! ```
//!
//! The backend is chosen the same way as the server (`BIZDESK_STORE`,
//! `FIREBASE_*`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bizdesk_admin::components::SortField;

mod commands;

#[derive(Parser)]
#[command(name = "bizdesk")]
#[command(author, version, about = "Bizdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the store from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Customer records
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// List password help requests, newest first
    HelpRequests,
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List customers
    List {
        /// Free-text search over code, name, contact, email, address and vehicle types
        #[arg(short, long)]
        search: Option<String>,

        /// Only customers with this vehicle type
        #[arg(short, long)]
        vehicle: Option<String>,

        /// Show the archive instead of active customers
        #[arg(short, long)]
        archived: bool,

        /// Sort column (`customerId`, `name`, `contact`, `email`, `address`, `vehicleTypes`)
        #[arg(long, default_value = "customerId")]
        sort: SortField,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Print the code the next customer will get
    NextId,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Customers { action } => match action {
            CustomerAction::List {
                search,
                vehicle,
                archived,
                sort,
                desc,
            } => {
                commands::customers::list(commands::customers::ListOptions {
                    search,
                    vehicle,
                    archived,
                    sort,
                    desc,
                })
                .await?;
            }
            CustomerAction::NextId => commands::customers::next_id().await?,
        },
        Commands::HelpRequests => commands::help_requests::list().await?,
    }
    Ok(())
}
