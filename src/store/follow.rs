use chrono::Utc;
use uuid::Uuid;

use super::post::{self, Feed, Post};
use crate::{paginate::Page, Database};

/// Subscribes `user_id` to the posts of `author_id`.
///
/// Following yourself is a no-op, and so is following someone twice.
/// Returns whether a new edge was created.
pub async fn follow(database: &Database, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
	if user_id == author_id {
		return Ok(false);
	}

	let result = sqlx::query(
		r#"
			INSERT INTO follow (user_id, author_id, created_at) VALUES (?, ?, ?)
			ON CONFLICT (user_id, author_id) DO NOTHING
		"#,
	)
	.bind(user_id)
	.bind(author_id)
	.bind(Utc::now())
	.execute(database)
	.await?;

	Ok(result.rows_affected() > 0)
}

/// Removes the edge from `user_id` to `author_id`, returning whether it existed.
pub async fn unfollow(database: &Database, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query("DELETE FROM follow WHERE user_id = ? AND author_id = ?")
		.bind(user_id)
		.bind(author_id)
		.execute(database)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn is_following(database: &Database, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
	let edges = sqlx::query_scalar::<_, i64>(
		"SELECT COUNT(*) FROM follow WHERE user_id = ? AND author_id = ?",
	)
	.bind(user_id)
	.bind(author_id)
	.fetch_one(database)
	.await?;

	Ok(edges > 0)
}

/// One page of posts by the authors `user_id` follows, newest first.
pub async fn feed_for(
	database: &Database,
	user_id: Uuid,
	number: i64,
	page_size: u32,
) -> Result<Page<Post>, sqlx::Error> {
	post::page(database, Feed::Following(user_id), number, page_size).await
}
