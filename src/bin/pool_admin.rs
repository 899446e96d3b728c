//! Operator tooling for repairing the database in place.

use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use thiserror::Error;

use pushkind_pool::db::establish_connection_pool;
use pushkind_pool::domain::types::{OrganizationId, TypeConstraintError};
use pushkind_pool::load_server_config;
use pushkind_pool::repository::DieselRepository;
use pushkind_pool::services::{ServiceError, admin};

#[derive(Debug, Error)]
enum AdminError {
    #[error("Error loading server config: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to establish database connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("Invalid argument: {0}")]
    Argument(#[from] TypeConstraintError),
    #[error("{0}")]
    Service(#[from] ServiceError),
    #[error("Failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

#[derive(Debug, Parser)]
#[command(name = "pool-admin", about = "Database maintenance for the pool service")]
struct Cli {
    /// Overrides the database from the configuration files.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize client emails and merge clients that share one.
    DedupeEmails {
        /// Limit the cleanup to one organization.
        #[arg(long)]
        organization: Option<i32>,
        /// Print the plan without changing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Set a new password for a user and reactivate the account.
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn database_url(cli: &Cli) -> Result<String, AdminError> {
    if let Some(url) = &cli.database_url {
        return Ok(url.clone());
    }
    Ok(load_server_config()?.database_url)
}

fn execute(cli: Cli) -> Result<(), AdminError> {
    let url = database_url(&cli)?;
    let pool = establish_connection_pool(&url)?;
    let repo = DieselRepository::new(pool);

    match cli.command {
        Command::DedupeEmails {
            organization,
            dry_run,
        } => {
            let organization = organization.map(OrganizationId::new).transpose()?;
            let plan = admin::dedupe_emails(&repo, organization, dry_run).inspect_err(|err| {
                log::error!("Email cleanup failed: {err}");
            })?;
            let report = serde_json::to_string_pretty(&plan)?;
            println!("{report}");
            if dry_run {
                log::info!("Dry run, nothing was changed");
            }
        }
        Command::ResetPassword { email, password } => {
            let user = admin::reset_password(&repo, &email, &password).inspect_err(|err| {
                log::error!("Password reset failed: {err}");
            })?;
            println!("Password updated for {}", user.email);
        }
    }
    Ok(())
}

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    if let Err(err) = execute(Cli::parse()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
