use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;

use crate::Database;

/// A community posts can be filed under.
///
/// Groups are provisioned by administrators, so there are no write queries here.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Group {
	pub id: i64,
	/// The unique address of the group, used in `/group/{slug}/`.
	pub slug: String,
	pub title: String,
	pub description: String,
}

impl fmt::Display for Group {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.title)
	}
}

pub async fn find(database: &Database, id: i64) -> Result<Option<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" WHERE id = ?"#)
		.bind(id)
		.fetch_optional(database)
		.await
}

pub async fn find_by_slug(database: &Database, slug: &str) -> Result<Option<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" WHERE slug = ?"#)
		.bind(slug)
		.fetch_optional(database)
		.await
}

/// All groups, in the order they are offered on the post form.
pub async fn list(database: &Database) -> Result<Vec<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" ORDER BY title, id"#)
		.fetch_all(database)
		.await
}
