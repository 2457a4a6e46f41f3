use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use crate::Database;

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Comment {
	pub id: i64,
	pub post_id: i64,
	pub author_id: Uuid,
	/// The username of the author.
	pub author: String,
	pub text: String,
	pub created: DateTime<Utc>,
}

impl fmt::Display for Comment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(super::excerpt(&self.text))
	}
}

/// Comments under a post, oldest first.
pub async fn for_post(database: &Database, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
	sqlx::query_as::<_, Comment>(
		r#"
			SELECT
				comment.id, comment.post_id, comment.author_id,
				"user".username AS author,
				comment.text, comment.created
			FROM comment
			JOIN "user" ON "user".id = comment.author_id
			WHERE comment.post_id = ?
			ORDER BY comment.created, comment.id
		"#,
	)
	.bind(post_id)
	.fetch_all(database)
	.await
}

pub async fn count_for_post(database: &Database, post_id: i64) -> Result<u64, sqlx::Error> {
	let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment WHERE post_id = ?")
		.bind(post_id)
		.fetch_one(database)
		.await?;

	Ok(u64::try_from(count).unwrap_or_default())
}

/// Appends a comment to a post, returning its id.
pub async fn create(
	database: &Database,
	post_id: i64,
	author_id: Uuid,
	text: &str,
) -> Result<i64, sqlx::Error> {
	sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO comment (post_id, author_id, text, created)
			VALUES (?, ?, ?, ?)
			RETURNING id
		"#,
	)
	.bind(post_id)
	.bind(author_id)
	.bind(text)
	.bind(Utc::now())
	.fetch_one(database)
	.await
}
