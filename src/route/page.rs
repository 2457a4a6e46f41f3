//! Building blocks shared by the page routes.
//!
//! Pages are JSON documents. Form routes either render a page (`200`) or
//! send the client on with `303 See Other`, which [`Outcome`] captures.

use std::collections::BTreeMap;

use aide::{
	gen::GenContext,
	openapi::{Operation, Response},
	OperationOutput,
};
use axum::{
	http::{header, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;
use validator::ValidationErrors;

/// A `303 See Other` redirect.
#[derive(Debug)]
pub struct Redirect(pub String);

impl Redirect {
	pub fn to(location: impl Into<String>) -> Self {
		Self(location.into())
	}
}

impl IntoResponse for Redirect {
	fn into_response(self) -> axum::response::Response {
		(StatusCode::SEE_OTHER, [(header::LOCATION, self.0)]).into_response()
	}
}

impl OperationOutput for Redirect {
	type Inner = ();
}

/// Either a rendered page or a redirect.
#[derive(Debug)]
pub enum Outcome<T> {
	Render(T),
	Redirect(Redirect),
}

impl<T> Outcome<T> {
	pub fn redirect(location: impl Into<String>) -> Self {
		Self::Redirect(Redirect::to(location))
	}
}

impl<T: Serialize> IntoResponse for Outcome<T> {
	fn into_response(self) -> axum::response::Response {
		match self {
			Self::Render(page) => axum::Json(page).into_response(),
			Self::Redirect(redirect) => redirect.into_response(),
		}
	}
}

impl<T: JsonSchema> OperationOutput for Outcome<T> {
	type Inner = T;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<Response> {
		axum::Json::<T>::operation_response(ctx, operation)
	}

	fn inferred_responses(
		ctx: &mut GenContext,
		operation: &mut Operation,
	) -> Vec<(Option<u16>, Response)> {
		axum::Json::<T>::inferred_responses(ctx, operation)
	}
}

/// Describes one input of a form.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Field {
	pub name: &'static str,
	pub label: &'static str,
	pub help_text: &'static str,
	pub required: bool,
}

/// Validation messages keyed by the field they belong to.
#[derive(Debug, Default, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
	pub fn add(&mut self, field: &str, message: impl Into<String>) {
		self.0.entry(field.to_owned()).or_default().push(message.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<ValidationErrors> for FormErrors {
	fn from(errors: ValidationErrors) -> Self {
		let mut form = Self::default();

		for (field, errors) in errors.field_errors() {
			for error in errors {
				let message = error
					.message
					.as_ref()
					.map_or_else(|| error.code.to_string(), ToString::to_string);

				form.add(&field, message);
			}
		}

		form
	}
}
