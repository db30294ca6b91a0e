//! Accounts CLI
//!
//! Operator tool for the accounts database: applies migrations, checks
//! connectivity, creates superusers, customers and restaurant owners, and
//! prints users as JSON.

use clap::{Args, Parser, Subcommand};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_accounts::{PgAccountRepository, Scope, TracingListener, UserManager};
use eyre::{Result, eyre};
use migration::Migrator;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

mod commands;
mod config;

use commands::AccountKind;
use config::Config;

#[derive(Parser)]
#[command(name = "accounts")]
#[command(about = "Manage user accounts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate {
        /// Roll back this many migrations instead
        #[arg(long)]
        rollback: Option<u32>,
    },

    /// Check database connectivity
    Check,

    /// Create a superuser
    CreateSuperuser(CreateArgs),

    /// Create a customer
    CreateCustomer(CreateArgs),

    /// Create a restaurant owner
    CreateOwner(CreateArgs),

    /// List users in a scope
    List {
        /// all, customers, owners, staff or superusers
        #[arg(long, default_value = "all")]
        scope: Scope,

        #[arg(long, default_value_t = 50)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Show one user with profile details
    Show {
        #[arg(long)]
        email: String,
    },
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    email: String,

    /// Falls back to ACCOUNTS_PASSWORD
    #[arg(long)]
    password: Option<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let cli = Cli::parse();

    info!("Connecting to database...");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre!("Database connection failed: {}", e))?;

    let users = UserManager::new(PgAccountRepository::new(db.clone()))
        .with_listener(Arc::new(TracingListener));

    match cli.command {
        Commands::Migrate { rollback } => match rollback {
            Some(steps) => {
                database::postgres::rollback_migrations::<Migrator>(&db, "accounts", steps).await?
            }
            None => database::postgres::run_migrations::<Migrator>(&db, "accounts").await?,
        },

        Commands::Check => {
            let status = database::postgres::check_health_detailed(&db).await;
            print_json(&serde_json::json!({
                "healthy": status.healthy,
                "message": status.message,
                "response_time_ms": status.response_time_ms,
            }))?;

            if !status.healthy {
                return Err(eyre!("Database is unhealthy"));
            }
        }

        Commands::CreateSuperuser(args) => {
            run_create(&users, AccountKind::Superuser, args, &config).await?
        }
        Commands::CreateCustomer(args) => {
            run_create(&users, AccountKind::Customer, args, &config).await?
        }
        Commands::CreateOwner(args) => run_create(&users, AccountKind::Owner, args, &config).await?,

        Commands::List {
            scope,
            limit,
            offset,
        } => print_json(&commands::list(&users, scope, limit, offset).await?)?,

        Commands::Show { email } => print_json(&commands::show(&users, &email).await?)?,
    }

    Ok(())
}

async fn run_create(
    users: &UserManager<PgAccountRepository>,
    kind: AccountKind,
    args: CreateArgs,
    config: &Config,
) -> Result<()> {
    let password = args
        .password
        .or_else(|| config.default_password.clone())
        .ok_or_else(|| eyre!("Pass --password or set ACCOUNTS_PASSWORD"))?;

    let created = commands::create(users, kind, &args.email, &password).await?;
    info!(user_id = %created.id, ?kind, "Account created");
    print_json(&created)
}
