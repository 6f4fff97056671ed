use macros::route;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{extract::Json, openapi::tag};

#[derive(Debug, Serialize, JsonSchema)]
pub struct Running {
	pub message: &'static str,
	pub status: &'static str,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Health {
	pub status: &'static str,
}

/// Service information
/// Confirms that the API is running.
#[route(tag = tag::STATUS)]
pub async fn root() -> Json<Running> {
	Json(Running {
		message: "Media Orchestrator API",
		status: "running",
	})
}

/// Health check
#[route(tag = tag::STATUS)]
pub async fn health() -> Json<Health> {
	Json(Health { status: "healthy" })
}
