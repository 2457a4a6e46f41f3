use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Serialize, Serializer};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::{
	media,
	paginate::{Page, Paginator},
	Database,
};

const SELECT_POST: &str = r#"
	SELECT
		post.id, post.text, post.pub_date, post.author_id,
		"user".username AS author,
		post.group_id, "group".slug AS group_slug, "group".title AS group_title,
		post.image
	FROM post
	JOIN "user" ON "user".id = post.author_id
	LEFT JOIN "group" ON "group".id = post.group_id
"#;

/// A single post, joined with the names of its author and group.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub text: String,
	/// Set once, when the post is created.
	pub pub_date: DateTime<Utc>,
	pub author_id: Uuid,
	/// The username of the author.
	pub author: String,
	pub group_id: Option<i64>,
	pub group_slug: Option<String>,
	pub group_title: Option<String>,
	/// The public URL of the attached image.
	#[serde(serialize_with = "serialize_image")]
	pub image: Option<String>,
}

fn serialize_image<S: Serializer>(image: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
	image.as_deref().map(media::url).serialize(serializer)
}

impl fmt::Display for Post {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(super::excerpt(&self.text))
	}
}

/// The fields of a post that its author controls.
#[derive(Debug)]
pub struct PostInput {
	pub text: String,
	pub group_id: Option<i64>,
	/// Media path of a freshly stored image, if one was uploaded.
	pub image: Option<String>,
}

/// Selects which posts make up a feed.
#[derive(Debug, Clone, Copy)]
pub enum Feed {
	All,
	Group(i64),
	Author(Uuid),
	/// Posts by the authors the given user follows.
	Following(Uuid),
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, feed: Feed) {
	match feed {
		Feed::All => {}
		Feed::Group(group_id) => {
			query.push(" WHERE post.group_id = ").push_bind(group_id);
		}
		Feed::Author(author_id) => {
			query.push(" WHERE post.author_id = ").push_bind(author_id);
		}
		Feed::Following(user_id) => {
			query
				.push(" WHERE post.author_id IN (SELECT author_id FROM follow WHERE user_id = ")
				.push_bind(user_id)
				.push(")");
		}
	}
}

pub async fn count(database: &Database, feed: Feed) -> Result<u64, sqlx::Error> {
	let mut query = QueryBuilder::new("SELECT COUNT(*) FROM post");
	push_filter(&mut query, feed);

	let count = query
		.build_query_scalar::<i64>()
		.fetch_one(database)
		.await?;

	Ok(u64::try_from(count).unwrap_or_default())
}

/// Lists a window of a feed, newest first.
pub async fn list(
	database: &Database,
	feed: Feed,
	limit: i64,
	offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
	let mut query = QueryBuilder::new(SELECT_POST);
	push_filter(&mut query, feed);

	query
		.push(" ORDER BY post.pub_date DESC, post.id DESC LIMIT ")
		.push_bind(limit)
		.push(" OFFSET ")
		.push_bind(offset);

	query.build_query_as::<Post>().fetch_all(database).await
}

/// Fetches one page of a feed. Out-of-range page numbers are clamped.
pub async fn page(
	database: &Database,
	feed: Feed,
	number: i64,
	page_size: u32,
) -> Result<Page<Post>, sqlx::Error> {
	let paginator = Paginator::new(count(database, feed).await?, page_size);
	let number = paginator.clamp(number);

	let posts = list(
		database,
		feed,
		paginator.limit(),
		paginator.offset(number),
	)
	.await?;

	Ok(paginator.page(posts, number))
}

pub async fn find(database: &Database, id: i64) -> Result<Option<Post>, sqlx::Error> {
	let mut query = QueryBuilder::new(SELECT_POST);
	query.push(" WHERE post.id = ").push_bind(id);

	query.build_query_as::<Post>().fetch_optional(database).await
}

/// Inserts a post authored by `author_id`, returning its id.
pub async fn create(
	database: &Database,
	author_id: Uuid,
	input: &PostInput,
) -> Result<i64, sqlx::Error> {
	sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO post (text, author_id, group_id, image, pub_date)
			VALUES (?, ?, ?, ?, ?)
			RETURNING id
		"#,
	)
	.bind(&input.text)
	.bind(author_id)
	.bind(input.group_id)
	.bind(&input.image)
	.bind(Utc::now())
	.fetch_one(database)
	.await
}

/// Updates the editable fields of a post in place.
///
/// The image is kept unless a new one is given; the author and
/// publication date are never touched.
pub async fn update(database: &Database, id: i64, input: &PostInput) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
			UPDATE post
			SET text = ?, group_id = ?, image = COALESCE(?, image)
			WHERE id = ?
		"#,
	)
	.bind(&input.text)
	.bind(input.group_id)
	.bind(&input.image)
	.bind(id)
	.execute(database)
	.await?;

	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test::*;

	#[tokio::test]
	async fn test_feed_is_newest_first() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;

		for i in 0..3 {
			create_post(&app.state, author.id, &format!("post {i}"), None).await;
		}

		let posts = list(&app.state.database, Feed::All, 10, 0).await.unwrap();
		let texts = posts.iter().map(|post| post.text.as_str()).collect::<Vec<_>>();

		assert_eq!(texts, ["post 2", "post 1", "post 0"]);
		assert!(posts.iter().all(|post| post.author == "leo"));
	}

	#[tokio::test]
	async fn test_group_feeds_are_isolated() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;
		let x = create_group(&app.state, "x").await;
		let y = create_group(&app.state, "y").await;

		let in_x = create_post(&app.state, author.id, "filed under x", Some(x.id)).await;
		create_post(&app.state, author.id, "no group", None).await;

		let feed_x = page(&app.state.database, Feed::Group(x.id), 1, 10).await.unwrap();
		let feed_y = page(&app.state.database, Feed::Group(y.id), 1, 10).await.unwrap();

		assert_eq!(feed_x.items.iter().map(|post| post.id).collect::<Vec<_>>(), [in_x]);
		assert_eq!(feed_x.items[0].group_slug.as_deref(), Some("x"));
		assert!(feed_y.items.is_empty());
		assert_eq!(feed_y.count, 0);
	}

	#[tokio::test]
	async fn test_thirteen_posts_split_into_two_pages() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;

		for i in 0..13 {
			create_post(&app.state, author.id, &format!("post {i}"), None).await;
		}

		let first = page(&app.state.database, Feed::Author(author.id), 1, 10).await.unwrap();
		let second = page(&app.state.database, Feed::Author(author.id), 2, 10).await.unwrap();
		let clamped = page(&app.state.database, Feed::Author(author.id), 7, 10).await.unwrap();

		assert_eq!(first.items.len(), 10);
		assert_eq!(second.items.len(), 3);
		assert_eq!(clamped.number, 2);

		let mut ids = first
			.items
			.iter()
			.chain(&second.items)
			.map(|post| post.id)
			.collect::<Vec<_>>();
		ids.sort_unstable();
		ids.dedup();

		assert_eq!(ids.len(), 13);
	}

	#[tokio::test]
	async fn test_update_keeps_author_date_and_image() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;
		let group = create_group(&app.state, "x").await;
		let id = create(
			&app.state.database,
			author.id,
			&PostInput {
				text: "first draft".into(),
				group_id: Some(group.id),
				image: Some("posts/cover.gif".into()),
			},
		)
		.await
		.unwrap();

		let before = find(&app.state.database, id).await.unwrap().unwrap();

		update(
			&app.state.database,
			id,
			&PostInput {
				text: "second draft".into(),
				group_id: None,
				image: None,
			},
		)
		.await
		.unwrap();

		let after = find(&app.state.database, id).await.unwrap().unwrap();

		assert_eq!(after.text, "second draft");
		assert_eq!(after.group_id, None);
		assert_eq!(after.image.as_deref(), Some("posts/cover.gif"));
		assert_eq!(after.author_id, before.author_id);
		assert_eq!(after.pub_date, before.pub_date);
	}

	#[tokio::test]
	async fn test_display_and_image_url() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;
		let id = create(
			&app.state.database,
			author.id,
			&PostInput {
				text: "a post that is long enough".into(),
				group_id: None,
				image: Some("posts/cover.gif".into()),
			},
		)
		.await
		.unwrap();

		let post = find(&app.state.database, id).await.unwrap().unwrap();
		let json = serde_json::to_value(&post).unwrap();

		assert_eq!(post.to_string(), "a post that is ");
		assert_eq!(json["image"], "/media/posts/cover.gif");
	}
}
