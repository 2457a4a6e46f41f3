#![warn(clippy::pedantic)]

use yatube::{config::Config, trace, State};

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(&config);

	let state = State::new(&config)
		.await
		.expect("failed to connect to database");

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", config.port);

	axum::serve(listener, yatube::app(state))
		.await
		.expect("server stopped unexpectedly");
}
