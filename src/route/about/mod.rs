use aide::axum::{routing::get_with, ApiRouter};
use macros::route;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{extract::Json, openapi::tag, AppState};

/// A static page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AboutPage {
	pub title: &'static str,
	pub text: &'static str,
}

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.api_route("/author/", get_with(author, author_docs))
		.api_route("/tech/", get_with(tech, tech_docs))
}

/// About the author
#[route(tag = tag::ABOUT)]
pub async fn author() -> Json<AboutPage> {
	Json(AboutPage {
		title: "About the author",
		text: "Yatube is written and maintained by a single developer.",
	})
}

/// Technologies
/// Lists what the service is built with.
#[route(tag = tag::ABOUT)]
pub async fn tech() -> Json<AboutPage> {
	Json(AboutPage {
		title: "Technologies",
		text: "Rust, axum and SQLite, with aide generating the API description.",
	})
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_about_pages() {
		let app = app().await;

		for path in ["/about/author/", "/about/tech/"] {
			let response = app.server.get(path).await;

			assert_eq!(response.status_code(), StatusCode::OK);
			assert!(response.json::<Value>()["title"].is_string());
		}
	}
}
