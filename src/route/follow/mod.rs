use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(String),
	/// Unfollowing is strict where following is not: there must be an edge to remove.
	#[error("not following {0}")]
	NotFollowing(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/follow/", get_with(follow_index, follow_index_docs))
		.api_route(
			"/profile/:username/follow/",
			get_with(profile_follow, profile_follow_docs),
		)
		.api_route(
			"/profile/:username/unfollow/",
			get_with(profile_unfollow, profile_unfollow_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) | Self::NotFollowing(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		match self {
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", json!(username))
				.into_vec(),
			Self::NotFollowing(username) => error::Message::new("not_following")
				.detail("username", json!(username))
				.into_vec(),
		}
	}
}
