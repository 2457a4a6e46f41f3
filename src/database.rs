use std::str::FromStr;

use sqlx::{
	migrate::{MigrateError, Migrator},
	sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::Database;

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to connect to database: {0}")]
	Connect(#[from] sqlx::Error),
	#[error("failed to run migrations: {0}")]
	Migrate(#[from] MigrateError),
}

/// Opens a connection pool and brings the schema up to date.
///
/// In-memory databases live and die with their connection, so they are
/// served by a single connection that is never recycled.
pub async fn connect(url: &str) -> Result<Database, Error> {
	let options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = if url.contains(":memory:") {
		SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
	} else {
		SqlitePoolOptions::new().max_connections(8)
	}
	.connect_with(options)
	.await?;

	MIGRATOR.run(&pool).await?;

	tracing::info!(url, "database ready");

	Ok(pool)
}
