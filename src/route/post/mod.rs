use aide::axum::{routing::get_with, ApiRouter};
use axum::{http::StatusCode, middleware};
use serde_json::json;

use crate::{cache, error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown group {0}")]
	UnknownGroup(String),
	#[error("unknown user {0}")]
	UnknownUser(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes(state: &AppState) -> ApiRouter<AppState> {
	use route::*;

	let home = ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.layer(middleware::from_fn_with_state(
			state.cache.clone(),
			cache::cache_page,
		));

	ApiRouter::new()
		.merge(home)
		.api_route("/group/:slug/", get_with(group_posts, group_posts_docs))
		.api_route("/profile/:username/", get_with(profile, profile_docs))
		.api_route(
			"/create/",
			get_with(create_form, create_form_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/posts/:post_id/", get_with(post_detail, post_detail_docs))
		.api_route(
			"/posts/:post_id/edit/",
			get_with(edit_form, edit_form_docs).post_with(edit_post, edit_post_docs),
		)
		.api_route(
			"/posts/:post_id/comment/",
			get_with(add_comment, add_comment_docs).post_with(add_comment, add_comment_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownGroup(..) | Self::UnknownUser(..) => {
				StatusCode::NOT_FOUND
			}
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", json!(post))
				.into_vec(),
			Self::UnknownGroup(slug) => error::Message::new("unknown_group")
				.detail("group", json!(slug))
				.into_vec(),
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", json!(username))
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use axum_test::multipart::{MultipartForm, Part};

	use crate::{media::SMALL_GIF, store, test::*};

	#[tokio::test]
	async fn test_home_feed_pages() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;

		for i in 0..13 {
			create_post(&app.state, author.id, &format!("post number {i}"), None).await;
		}

		let first = app.server.get("/").await.json::<Value>();
		let second = app
			.server
			.get("/")
			.add_query_param("page", 2)
			.await
			.json::<Value>();

		assert_eq!(first["page_obj"]["items"].as_array().unwrap().len(), 10);
		assert_eq!(second["page_obj"]["items"].as_array().unwrap().len(), 3);
		assert_eq!(first["page_obj"]["items"][0]["text"], "post number 12");
		assert_eq!(second["page_obj"]["items"][2]["text"], "post number 0");
		assert_eq!(second["page_obj"]["has_next"], false);

		let clamped = app
			.server
			.get("/")
			.add_query_param("page", 40)
			.await
			.json::<Value>();

		assert_eq!(clamped["page_obj"]["number"], 2);

		let response = app.server.get("/").add_query_param("page", "last").await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_home_feed_is_cached() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;

		create_post(&app.state, author.id, "before", None).await;

		let before = app.server.get("/").await.text();

		create_post(&app.state, author.id, "after", None).await;

		let cached = app.server.get("/").await.text();

		assert_eq!(before, cached);
		assert!(!cached.contains("after"));

		app.state.cache.clear();

		let fresh = app.server.get("/").await.json::<Value>();

		assert_eq!(fresh["page_obj"]["items"][0]["text"], "after");
	}

	#[tokio::test]
	async fn test_group_page() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;
		let x = create_group(&app.state, "x").await;
		create_group(&app.state, "y").await;

		create_post(&app.state, author.id, "filed under x", Some(x.id)).await;

		let page = app.server.get("/group/x/").await.json::<Value>();

		assert_eq!(page["group"]["title"], "Group x");
		assert_eq!(page["page_obj"]["count"], 1);

		let page = app.server.get("/group/y/").await.json::<Value>();

		assert_eq!(page["page_obj"]["count"], 0);

		let response = app.server.get("/group/nope/").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_profile_page() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;

		create_post(&app.state, author.id, "by leo", None).await;

		let response = app.server.get("/profile/leo/").await;
		let page = response.json::<Value>();

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(page["author"]["username"], "leo");
		assert_eq!(page["following"], false);
		assert_eq!(page["page_obj"]["items"][0]["author"], "leo");

		let response = app.server.get("/profile/nobody/").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_post_detail() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;
		let post = create_post(&app.state, author.id, "a post to discuss", None).await;

		store::comment::create(&app.state.database, post, author.id, "first!")
			.await
			.unwrap();

		let response = app.server.get(&format!("/posts/{post}/")).await;
		let page = response.json::<Value>();

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(page["post"]["text"], "a post to discuss");
		assert_eq!(page["comments"][0]["text"], "first!");
		assert_eq!(page["form"][0]["name"], "text");

		let response = app.server.get("/posts/999/").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_anonymous_authoring_requires_login() {
		let app = app().await;
		let (author, _) = create_user(&app.state, "leo").await;
		let post = create_post(&app.state, author.id, "a post", None).await;

		for path in [
			"/create/".to_owned(),
			format!("/posts/{post}/edit/"),
			format!("/posts/{post}/comment/"),
		] {
			let response = app.server.get(&path).await;

			assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
			assert_eq!(
				response.header("location"),
				format!("/auth/login/?next={}", path.replace('/', "%2F")).as_str()
			);
		}
	}

	#[tokio::test]
	async fn test_create_post() {
		let app = app().await;
		let (_, cookie) = create_user(&app.state, "leo").await;
		let group = create_group(&app.state, "x").await.id.to_string();

		let response = app
			.server
			.get("/create/")
			.add_header(header::COOKIE, cookie.clone())
			.await;
		let page = response.json::<Value>();

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(page["is_edit"], false);
		assert_eq!(page["fields"][0]["label"], "Post text");
		assert_eq!(page["groups"][0]["slug"], "x");

		let response = app
			.server
			.post("/create/")
			.add_header(header::COOKIE, cookie)
			.form(&[("text", "a brand new post"), ("group", group.as_str())])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/profile/leo/");

		let page = app.server.get("/group/x/").await.json::<Value>();

		assert_eq!(page["page_obj"]["items"][0]["text"], "a brand new post");
	}

	#[tokio::test]
	async fn test_invalid_post_is_not_saved() {
		let app = app().await;
		let (_, cookie) = create_user(&app.state, "leo").await;

		let response = app
			.server
			.post("/create/")
			.add_header(header::COOKIE, cookie.clone())
			.form(&[("text", "   "), ("group", "42")])
			.await;
		let page = response.json::<Value>();

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(page["errors"]["text"][0], "This field is required.");
		assert!(page["errors"]["group"].is_array());
		assert_eq!(page["values"]["group"], "42");

		let response = app
			.server
			.post("/create/")
			.add_header(header::COOKIE, cookie)
			.multipart(
				MultipartForm::new()
					.add_text("text", "with a broken picture")
					.add_part(
						"image",
						Part::bytes(b"not an image".to_vec()).file_name("broken.gif"),
					),
			)
			.await;
		let page = response.json::<Value>();

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(page["errors"]["image"].is_array());
		assert_eq!(page["values"]["text"], "with a broken picture");

		let count = store::post::count(&app.state.database, store::post::Feed::All)
			.await
			.unwrap();

		assert_eq!(count, 0);
	}

	#[tokio::test]
	async fn test_create_post_with_image() {
		let app = app().await;
		let (author, cookie) = create_user(&app.state, "leo").await;

		let response = app
			.server
			.post("/create/")
			.add_header(header::COOKIE, cookie)
			.multipart(
				MultipartForm::new()
					.add_text("text", "with a picture")
					.add_text("group", "")
					.add_part(
						"image",
						Part::bytes(SMALL_GIF.to_vec())
							.file_name("small.gif")
							.mime_type("image/gif"),
					),
			)
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

		let page = app.server.get("/profile/leo/").await.json::<Value>();
		let post = &page["page_obj"]["items"][0];
		let image = post["image"].as_str().unwrap().to_owned();

		assert_eq!(post["text"], "with a picture");
		assert_eq!(post["author_id"], author.id.to_string());
		assert!(image.starts_with("/media/posts/") && image.ends_with(".gif"));

		let response = app.server.get(&image).await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(response.as_bytes().as_ref(), SMALL_GIF);
	}

	#[tokio::test]
	async fn test_only_the_author_can_edit() {
		let app = app().await;
		let (author, author_cookie) = create_user(&app.state, "leo").await;
		let (_, other_cookie) = create_user(&app.state, "sonya").await;
		let post = create_post(&app.state, author.id, "the original text", None).await;
		let path = format!("/posts/{post}/edit/");

		let response = app
			.server
			.post(&path)
			.add_header(header::COOKIE, other_cookie.clone())
			.form(&[("text", "vandalised")])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), format!("/posts/{post}/").as_str());

		let response = app
			.server
			.get(&path)
			.add_header(header::COOKIE, other_cookie)
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

		let stored = store::post::find(&app.state.database, post).await.unwrap().unwrap();

		assert_eq!(stored.text, "the original text");

		let response = app
			.server
			.get(&path)
			.add_header(header::COOKIE, author_cookie.clone())
			.await;
		let page = response.json::<Value>();

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(page["is_edit"], true);
		assert_eq!(page["values"]["text"], "the original text");

		let response = app
			.server
			.post(&path)
			.add_header(header::COOKIE, author_cookie.clone())
			.form(&[("text", "")])
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.json::<Value>()["errors"]["text"].is_array());

		let response = app
			.server
			.post(&path)
			.add_header(header::COOKIE, author_cookie.clone())
			.form(&[("text", "the edited text")])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), format!("/posts/{post}/").as_str());

		let edited = store::post::find(&app.state.database, post).await.unwrap().unwrap();

		assert_eq!(edited.text, "the edited text");
		assert_eq!(edited.pub_date, stored.pub_date);
		assert_eq!(edited.author_id, stored.author_id);

		let response = app
			.server
			.get("/posts/999/edit/")
			.add_header(header::COOKIE, author_cookie)
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_comments() {
		let app = app().await;
		let (author, cookie) = create_user(&app.state, "leo").await;
		let post = create_post(&app.state, author.id, "a post", None).await;
		let path = format!("/posts/{post}/comment/");

		let response = app.server.post(&path).form(&[("text", "anonymous")]).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(
			response.header("location"),
			format!("/auth/login/?next={}", path.replace('/', "%2F")).as_str()
		);
		assert_eq!(
			store::comment::count_for_post(&app.state.database, post).await.unwrap(),
			0
		);

		let response = app
			.server
			.post(&path)
			.add_header(header::COOKIE, cookie.clone())
			.form(&[("text", "   ")])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(
			store::comment::count_for_post(&app.state.database, post).await.unwrap(),
			0
		);

		let response = app
			.server
			.post(&path)
			.add_header(header::COOKIE, cookie.clone())
			.form(&[("text", "well said")])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), format!("/posts/{post}/").as_str());

		let page = app.server.get(&format!("/posts/{post}/")).await.json::<Value>();

		assert_eq!(page["comments"][0]["text"], "well said");
		assert_eq!(page["comments"][0]["author"], "leo");

		let response = app
			.server
			.post("/posts/999/comment/")
			.add_header(header::COOKIE, cookie)
			.form(&[("text", "into the void")])
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}
}
