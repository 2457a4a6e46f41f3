use axum::{
	http::{StatusCode, Uri},
	response::IntoResponse,
	Json,
};
use serde::Serialize;

pub mod about;
pub mod auth;
pub mod docs;
pub mod follow;
pub mod model;
pub mod page;
pub mod post;

#[derive(Serialize)]
struct NotFound {
	path: String,
}

/// Answers every path no route matches.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
	(
		StatusCode::NOT_FOUND,
		Json(NotFound {
			path: uri.path().to_owned(),
		}),
	)
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_unknown_path_is_not_found() {
		let app = app().await;

		let response = app.server.get("/unexisting_page/").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(response.json::<Value>()["path"], "/unexisting_page/");
	}
}
