use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{response::IntoResponse, Extension};

pub async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoResponse {
	axum::Json(api.as_ref()).into_response()
}
