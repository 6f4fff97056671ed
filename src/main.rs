#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod generate;
mod openapi;
mod route;
mod schedule;
mod store;
#[cfg(test)]
mod test;
mod trace;

use std::{num::NonZeroUsize, sync::Arc};

use aide::{
	axum::{routing::get_with, ApiRouter},
	openapi::OpenApi,
};
use axum::{extract::Request, Extension, Router, ServiceExt};
use tower::{Layer, ServiceBuilder};
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{
	config::Config,
	generate::{gemini::Gemini, imagen::Imagen, Generator, ImageModel},
	store::Store,
};

pub type AppState = State;
pub type Gateway = Arc<dyn generate::Gateway>;

/// The largest number of provider calls a single request keeps in flight.
#[derive(Debug, Clone, Copy)]
pub struct Concurrency(pub NonZeroUsize);

impl Default for Concurrency {
	fn default() -> Self {
		Self(NonZeroUsize::MIN)
	}
}

/// The shared application state.
///
/// Handlers pull the parts they need through [`axum::extract::State`], for
/// example `State(store): State<Store>`.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: Store,
	pub gateway: Gateway,
	pub concurrency: Concurrency,
}

/// Builds the application router, with documentation and transport middleware.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.api_route(
			"/",
			get_with(route::status::root, route::status::root_docs),
		)
		.api_route(
			"/health",
			get_with(route::status::health, route::status::health_docs),
		)
		.nest("/api/templates", route::template::routes())
		.nest("/api/posts", route::post::routes())
		.nest("/api/campaigns", route::campaign::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// The image model, if Vertex AI is configured and its credentials load.
fn image_model(config: &Config, client: reqwest::Client) -> Option<Arc<dyn ImageModel>> {
	let Some(project) = &config.google_cloud_project else {
		tracing::warn!("GOOGLE_CLOUD_PROJECT is not set, images will be placeholders");
		return None;
	};

	match config.service_account() {
		Ok(account) => {
			tracing::info!(project = %project, region = %config.gcp_region, client = %account.client_email, "image generation enabled");

			Some(Arc::new(Imagen::new(
				client,
				project.clone(),
				config.gcp_region.clone(),
				account,
			)))
		}
		Err(error) => {
			tracing::warn!(%error, "failed to load vertex ai credentials, images will be placeholders");
			None
		}
	}
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}

	tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let client = reqwest::Client::builder()
		.timeout(config.provider_timeout)
		.build()?;

	let gateway = Generator::new(
		Arc::new(Gemini::new(client.clone(), config.gemini_api_key.clone())),
		image_model(&config, client),
	);

	let state = State {
		store: Store::default(),
		gateway: Arc::new(gateway),
		concurrency: Concurrency(config.generation_concurrency),
	};

	let app = NormalizePathLayer::trim_trailing_slash().layer(app(state));
	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!(
		address = %listener.local_addr()?,
		environment = %config.environment,
		concurrency = config.generation_concurrency.get(),
		"listening"
	);

	axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}
