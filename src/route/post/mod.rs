use aide::axum::{
	routing::{get_with, patch_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use crate::{error, generate, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("post creation failed: {0}")]
	Creation(#[source] generate::Error),
	#[error("content generation failed: {0}")]
	Generation(#[source] generate::Error),
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
		.api_route(
			"/",
			get_with(list_posts, list_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/generate", post_with(generate_content, generate_content_docs))
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs).delete_with(delete_post, delete_post_docs),
		)
		.api_route(
			"/:id/status",
			patch_with(update_post_status, update_post_status_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::Creation(..) | Self::Generation(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", post)
				.into_vec(),
			Self::Creation(error) => error::Message::new("post_creation_failed")
				.detail("message", error.to_string())
				.into_vec(),
			Self::Generation(error) => error::Message::new("content_generation_failed")
				.detail("message", error.to_string())
				.into_vec(),
		}
	}
}
