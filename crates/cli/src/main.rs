//! Bazaar CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bazaar-cli migrate
//!
//! # Create an admin account
//! bazaar-cli admin create -e admin@example.com -p <password> -n "Admin Name"
//!
//! # Promote or demote an existing account
//! bazaar-cli admin promote -e user@example.com
//! bazaar-cli admin demote -e user@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long)]
        password: String,

        /// Admin display name
        #[arg(short = 'n', long)]
        fullname: String,
    },
    /// Promote an existing account to admin
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Demote an admin account back to a regular user
    Demote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                fullname,
            } => {
                commands::admin::create(&email, &password, &fullname).await?;
            }
            AdminAction::Promote { email } => {
                commands::admin::set_role(&email, bazaar_core::Role::Admin).await?;
            }
            AdminAction::Demote { email } => {
                commands::admin::set_role(&email, bazaar_core::Role::User).await?;
            }
        },
    }
    Ok(())
}
