use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown template {0}")]
	UnknownTemplate(String),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(list_templates, list_templates_docs))
		.api_route("/:id", get_with(get_template, get_template_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownTemplate(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownTemplate(template) => error::Message::new("unknown_template")
				.detail("template", template)
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_list_templates() {
		let server = server(Fakes::default());

		let response = server.get("/api/templates").await;
		response.assert_status_ok();

		let templates = response.json::<Vec<serde_json::Value>>();
		let again = server.get("/api/templates").await.json::<Vec<serde_json::Value>>();

		assert_eq!(templates.len(), 5);
		assert_eq!(templates, again);
		assert_eq!(templates[1]["id"], "book_blog");
		assert_eq!(templates[1]["type"], "book_blog");
	}

	#[tokio::test]
	async fn test_get_template() {
		let server = server(Fakes::default());

		let response = server.get("/api/templates/luxury_life").await;
		response.assert_status_ok();
		assert_eq!(response.json::<serde_json::Value>()["name"], "Luxury Life");

		let response = server.get("/api/templates/nope").await;
		response.assert_status_not_found();
		assert_eq!(
			response.json::<serde_json::Value>()["errors"][0]["content"],
			"unknown_template"
		);

		server
			.get(&format!("/api/templates/{}", "x".repeat(100)))
			.await
			.assert_status_not_found();
	}
}
