#![warn(clippy::pedantic)]

pub mod cache;
pub mod config;
pub mod database;
mod error;
mod extract;
pub mod media;
mod openapi;
pub mod paginate;
mod route;
mod session;
pub mod store;
pub mod trace;


use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	services::ServeDir,
	trace::TraceLayer,
};

use crate::{cache::ResponseCache, config::Config, media::MediaStore};

pub type Database = sqlx::SqlitePool;
pub type AppState = State;

/// Dependencies shared by every handler.
///
/// Handlers extract the single piece they need (`State<Database>`,
/// `State<MediaStore>`, ...) through `FromRef`.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub cache: ResponseCache,
	pub media: MediaStore,
	#[from_ref(skip)]
	pub page_size: u32,
}

impl State {
	/// Connects to the database and sets up the shared dependencies.
	pub async fn new(config: &Config) -> Result<Self, database::Error> {
		Ok(Self {
			database: database::connect(&config.database_url).await?,
			hasher: Argon2::default(),
			cache: ResponseCache::new(config.cache_ttl),
			media: MediaStore::new(&config.media_root),
			page_size: config.page_size,
		})
	}
}

/// Builds the application router, including the OpenAPI document and media files.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();

	let router = ApiRouter::new()
		.merge(route::post::routes(&state))
		.merge(route::follow::routes())
		.nest("/auth", route::auth::routes())
		.nest("/about", route::about::routes())
		.finish_api_with(&mut api, openapi::docs);

	router
		.route("/docs/api.json", get(route::docs::serve_docs))
		.nest_service(media::URL_PREFIX, ServeDir::new(state.media.root()))
		.fallback(route::not_found)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id()),
		)
		.with_state(state)
}
