use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::{IntoResponse, Redirect},
	Json,
};
use serde::Serialize;

use crate::media;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message sent to the client.
#[derive(Debug, Serialize)]
pub struct Message {
	pub content: Cow<'static, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'static, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Map>,
}

impl Message {
	pub fn new(content: impl Into<Cow<'static, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(Map::new)
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<Message>,
}

/// How a module's error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message>;

	/// Where to send the client instead of returning an error body.
	fn redirect(&self) -> Option<String> {
		None
	}
}

/// Error type for route handlers.
///
/// Wraps the module-specific error `T` alongside the failures every route
/// can run into. The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<T: ErrorShape> {
	#[error(transparent)]
	Route(T),
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("form error: {0}")]
	Form(#[from] rejection::FormRejection),
	#[error("multipart error: {0}")]
	MultipartRejection(#[from] axum::extract::multipart::MultipartRejection),
	#[error("multipart error: {0}")]
	Multipart(#[from] axum::extract::multipart::MultipartError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("media error: {0}")]
	Media(#[from] media::Error),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		let (status, errors) = match self {
			Self::Route(error) => {
				if let Some(location) = error.redirect() {
					return Redirect::to(&location).into_response();
				}

				(error.status(), error.errors())
			}
			Self::Validation(errors) => (
				StatusCode::BAD_REQUEST,
				errors
					.field_errors()
					.into_iter()
					.flat_map(|(field, errors)| {
						let field = field.to_string();

						errors.iter().map(move |error| {
							let content = error
								.message
								.as_ref()
								.map_or_else(|| error.code.to_string(), ToString::to_string);

							Message::new(content).field(field.clone())
						})
					})
					.collect(),
			),
			Self::Json(error) => (error.status(), Message::new(error.body_text()).into_vec()),
			Self::Query(error) => (error.status(), Message::new(error.body_text()).into_vec()),
			Self::Form(error) => (error.status(), Message::new(error.body_text()).into_vec()),
			Self::MultipartRejection(error) => {
				(error.status(), Message::new(error.body_text()).into_vec())
			}
			Self::Multipart(error) => (
				StatusCode::BAD_REQUEST,
				Message::new(error.to_string()).into_vec(),
			),
			error @ (Self::Database(..) | Self::Media(..)) => {
				tracing::error!(%error, "request failed");

				(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
			}
		};

		(
			status,
			Json(ErrorResponse {
				success: false,
				errors,
			}),
		)
			.into_response()
	}
}

impl<T: ErrorShape> OperationOutput for RouteError<T> {
	type Inner = ErrorResponse;
}
