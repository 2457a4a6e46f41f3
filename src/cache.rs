use std::{sync::Arc, time::Duration};

use axum::{
	body::{self, Body, Bytes},
	extract::{Request, State},
	http::{header, HeaderValue, Method, StatusCode},
	middleware::Next,
	response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::time::Instant;

/// Rendered pages kept for a fixed time.
///
/// Writes to the underlying data never invalidate an entry; a page is only
/// refreshed once its entry expires or the cache is cleared.
#[derive(Clone)]
pub struct ResponseCache {
	entries: Arc<DashMap<String, Entry>>,
	ttl: Duration,
}

#[derive(Clone)]
struct Entry {
	expires_at: Instant,
	content_type: Option<HeaderValue>,
	body: Bytes,
}

impl ResponseCache {
	pub fn new(ttl: Duration) -> Self {
		Self {
			entries: Arc::new(DashMap::new()),
			ttl,
		}
	}

	fn get(&self, key: &str) -> Option<Entry> {
		if let Some(entry) = self.entries.get(key) {
			if entry.expires_at > Instant::now() {
				return Some(entry.clone());
			}
		}

		self.entries
			.remove_if(key, |_, entry| entry.expires_at <= Instant::now());

		None
	}

	fn insert(&self, key: String, content_type: Option<HeaderValue>, body: Bytes) {
		self.entries.insert(
			key,
			Entry {
				expires_at: Instant::now() + self.ttl,
				content_type,
				body,
			},
		);
	}

	/// Drops every cached page.
	pub fn clear(&self) {
		self.entries.clear();
	}
}

/// Middleware serving successful `GET` responses from the cache, keyed by path and query.
pub async fn cache_page(
	State(cache): State<ResponseCache>,
	request: Request,
	next: Next,
) -> Response {
	if request.method() != Method::GET {
		return next.run(request).await;
	}

	let key = request
		.uri()
		.path_and_query()
		.map_or_else(|| request.uri().path().to_owned(), ToString::to_string);

	if let Some(entry) = cache.get(&key) {
		tracing::debug!(key, "serving cached page");

		return entry.into_response();
	}

	let response = next.run(request).await;

	if response.status() != StatusCode::OK {
		return response;
	}

	let (parts, body) = response.into_parts();
	let body = match body::to_bytes(body, usize::MAX).await {
		Ok(body) => body,
		Err(error) => {
			tracing::error!(%error, "failed to buffer response for caching");

			return StatusCode::INTERNAL_SERVER_ERROR.into_response();
		}
	};

	cache.insert(key, parts.headers.get(header::CONTENT_TYPE).cloned(), body.clone());

	Response::from_parts(parts, Body::from(body))
}

impl IntoResponse for Entry {
	fn into_response(self) -> Response {
		let mut response = Response::new(Body::from(self.body));

		if let Some(content_type) = self.content_type {
			response
				.headers_mut()
				.insert(header::CONTENT_TYPE, content_type);
		}

		response
	}
}
