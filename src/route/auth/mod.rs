use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// Path of the login route, where anonymous visitors of protected pages are sent.
pub const LOGIN_PATH: &str = "/auth/login/";

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("incorrect password")]
	IncorrectPassword,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	#[error("login required")]
	LoginRequired { next: String },
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/signup/", post_with(signup, signup_docs))
		.api_route("/login/", post_with(login, login_docs))
		.api_route("/logout/", get_with(logout, logout_docs))
		.api_route("/me/", get_with(get_me, get_me_docs))
		.api_route(
			"/password_change/",
			post_with(change_password, change_password_docs),
		)
}

/// The login URL that returns to `next` afterwards.
///
/// `next` is percent-encoded, since `+` is allowed in usernames and would
/// otherwise come back as a space.
pub fn login_url(next: &str) -> String {
	match serde_urlencoded::to_string([("next", next)]) {
		Ok(query) => format!("{LOGIN_PATH}?{query}"),
		Err(_) => LOGIN_PATH.to_owned(),
	}
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword
			| Self::IncorrectPassword
			| Self::LoginRequired { .. } => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		error::Message::new(self.to_string()).into_vec()
	}

	fn redirect(&self) -> Option<String> {
		match self {
			Self::LoginRequired { next } => Some(login_url(next)),
			_ => None,
		}
	}
}
