use crate::Database;

pub use crate::route::auth::model::User;

pub async fn find_by_username(database: &Database, username: &str) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(username)
		.fetch_optional(database)
		.await
}
