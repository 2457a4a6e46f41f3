use std::{path::PathBuf, str::FromStr, time::Duration};

use tracing::level_filters::LevelFilter;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{name} must be {expected}, got {value:?}")]
	Invalid {
		name: &'static str,
		expected: &'static str,
		value: String,
	},
}

/// Runtime configuration, read from the environment (and `.env` in development).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub port: u16,
	/// Number of posts on a single feed page.
	pub page_size: u32,
	/// How long a rendered home feed is served from the cache.
	pub cache_ttl: Duration,
	/// Directory uploaded images are written to and served from.
	pub media_root: PathBuf,
	pub log_level: LevelFilter,
	/// OpenTelemetry export is enabled only when this is set.
	pub otlp_endpoint: Option<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_url: "sqlite://yatube.db".into(),
			port: 3000,
			page_size: 10,
			cache_ttl: Duration::from_secs(20),
			media_root: PathBuf::from("media"),
			log_level: LevelFilter::INFO,
			otlp_endpoint: None,
		}
	}
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let defaults = Self::default();

		let page_size = parse(&lookup, "PAGE_SIZE", defaults.page_size, "a number")?;

		if page_size == 0 {
			return Err(Error::Invalid {
				name: "PAGE_SIZE",
				expected: "greater than zero",
				value: page_size.to_string(),
			});
		}

		Ok(Self {
			database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
			port: parse(&lookup, "PORT", defaults.port, "a port number")?,
			page_size,
			cache_ttl: Duration::from_secs(parse(
				&lookup,
				"CACHE_TTL_SECONDS",
				defaults.cache_ttl.as_secs(),
				"a number of seconds",
			)?),
			media_root: lookup("MEDIA_ROOT").map_or(defaults.media_root, PathBuf::from),
			log_level: parse(&lookup, "LOG_LEVEL", defaults.log_level, "a log level")?,
			otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|value| !value.is_empty()),
		})
	}
}

fn parse<T: FromStr>(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
	default: T,
	expected: &'static str,
) -> Result<T, Error> {
	let Some(value) = lookup(name) else {
		return Ok(default);
	};

	value.trim().parse().map_err(|_| Error::Invalid {
		name,
		expected,
		value,
	})
}
