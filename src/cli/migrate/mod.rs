//! Migrate command - applies schema migrations against PostgreSQL

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{revert_last_migration, run_migrations, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,
}

/// Run migrations and exit
///
/// Uses the PostgreSQL settings regardless of `storage.backend`.
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let pool = crate::connect_postgres(&config.storage).await?;

    if args.revert {
        match revert_last_migration(&pool).await? {
            Some(version) => info!(version, "Migration reverted"),
            None => info!("No applied migrations to revert"),
        }
    } else {
        run_migrations(&pool).await?;
    }

    let version = PostgresMigrator::new(pool.clone()).current_version().await?;
    info!(version = ?version, "Schema is at version");

    pool.close().await;
    Ok(())
}
