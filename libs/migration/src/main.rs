//! `migration up|down|status|fresh` for the accounts schema.
//!
//! Reads `DATABASE_URL` like every other SeaORM migration CLI.

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
