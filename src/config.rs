use std::{net::IpAddr, num::NonZeroUsize, path::PathBuf, time::Duration};

use tracing::level_filters::LevelFilter;

use crate::generate::{self, imagen::ServiceAccount};

const MAX_CONCURRENCY: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} has an invalid value `{value}`")]
	Invalid { name: &'static str, value: String },
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
	pub gemini_api_key: String,
	/// The Google Cloud project used for image generation. Without it, images
	/// are placeholders.
	pub google_cloud_project: Option<String>,
	pub google_credentials_path: PathBuf,
	/// Inline service account JSON, preferred over the file.
	pub google_credentials_json: Option<String>,
	pub gcp_region: String,
	/// Deployment environment marker, such as `development` or `production`.
	pub environment: String,
	pub host: IpAddr,
	pub port: u16,
	pub generation_concurrency: NonZeroUsize,
	pub provider_timeout: Duration,
	pub log_level: LevelFilter,
	pub otlp_endpoint: Option<String>,
}

impl Config {
	/// Loads `.env` (if present) and reads the process environment.
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`. Empty values count as unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

		Ok(Self {
			gemini_api_key: var("GEMINI_API_KEY").ok_or(Error::Missing("GEMINI_API_KEY"))?,
			google_cloud_project: var("GOOGLE_CLOUD_PROJECT"),
			google_credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS")
				.map_or_else(|| "vertex-ai-key.json".into(), PathBuf::from),
			google_credentials_json: var("GOOGLE_CREDENTIALS_JSON"),
			gcp_region: var("GCP_REGION").unwrap_or_else(|| "us-central1".into()),
			environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
			host: parse("HOST", var("HOST"))?.unwrap_or(IpAddr::from([127, 0, 0, 1])),
			port: parse("PORT", var("PORT"))?.unwrap_or(8000),
			generation_concurrency: parse::<usize>(
				"GENERATION_CONCURRENCY",
				var("GENERATION_CONCURRENCY"),
			)?
			.map_or(NonZeroUsize::MIN, |n| {
				NonZeroUsize::new(n.clamp(1, MAX_CONCURRENCY)).unwrap_or(NonZeroUsize::MIN)
			}),
			provider_timeout: Duration::from_secs(
				parse("PROVIDER_TIMEOUT_SECS", var("PROVIDER_TIMEOUT_SECS"))?.unwrap_or(120),
			),
			log_level: parse("LOG_LEVEL", var("LOG_LEVEL"))?.unwrap_or(LevelFilter::INFO),
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}

	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}

	/// Loads the service account used for image generation, from the inline
	/// JSON if set and from the credentials file otherwise.
	pub fn service_account(&self) -> Result<ServiceAccount, generate::Error> {
		match &self.google_credentials_json {
			Some(json) => ServiceAccount::from_json(json),
			None => {
				let json = std::fs::read_to_string(&self.google_credentials_path).map_err(|e| {
					generate::Error::Credentials(format!(
						"{}: {e}",
						self.google_credentials_path.display()
					))
				})?;

				ServiceAccount::from_json(&json)
			}
		}
	}
}

fn parse<T: std::str::FromStr>(name: &'static str, value: Option<String>) -> Result<Option<T>, Error> {
	value
		.map(|value| {
			value
				.trim()
				.parse()
				.map_err(|_| Error::Invalid { name, value })
		})
		.transpose()
}
