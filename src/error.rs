use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable error code, such as `unknown_post`.
	pub content: Cow<'a, str>,
	/// The request field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional context for the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// Describes how an error is presented to the client.
///
/// The [`std::fmt::Display`] output is only logged, so it may contain
/// details that the messages returned by [`ErrorShape::into_errors`] should not.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>;

	fn into_shaped_response(self) -> Response<Body>
	where
		Self: Sized,
	{
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, "request rejected");
		}

		(
			status,
			axum::Json(ErrorBody {
				success: false,
				errors: self.into_errors(),
			}),
		)
			.into_response()
	}
}

/// Errors shared by every route: rejected or invalid input.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("invalid json body: {0}")]
	Json(#[from] JsonRejection),
	#[error("invalid query string: {0}")]
	Query(#[from] QueryRejection),
	#[error("invalid path: {0}")]
	Path(#[from] PathRejection),
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		StatusCode::BAD_REQUEST
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					let field = field.to_string();

					errors.iter().map(move |error| {
						let mut message = Message::new(error.code.clone()).field(field.clone());

						if let Some(text) = &error.message {
							message = message.detail("message", text.to_string());
						}

						for (key, value) in &error.params {
							if key != "value" {
								message = message.detail(key.to_string(), value.clone());
							}
						}

						message
					})
				})
				.collect(),
			Self::Json(rejection) => Message::new("invalid_body")
				.detail("reason", rejection.body_text())
				.into_vec(),
			Self::Query(rejection) => Message::new("invalid_query")
				.detail("reason", rejection.body_text())
				.into_vec(),
			Self::Path(rejection) => Message::new("invalid_path")
				.detail("reason", rejection.body_text())
				.into_vec(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		self.into_shaped_response()
	}
}

/// The error type returned by route handlers.
///
/// `E` is the error type of the route module, which carries the
/// failures specific to that resource.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<E> {
	#[error(transparent)]
	App(#[from] AppError),
	#[error(transparent)]
	Route(E),
}

impl<E> IntoResponse for RouteError<E>
where
	E: ErrorShape,
{
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_shaped_response(),
			Self::Route(error) => error.into_shaped_response(),
		}
	}
}

impl<E> aide::OperationOutput for RouteError<E> {
	type Inner = ErrorBody<'static>;
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_message_details() {
		let message = Message::new("unknown_post")
			.detail("post", "abc")
			.detail("attempt", 2);

		let details = message.details.expect("details are set");

		assert_eq!(details["post"], "abc");
		assert_eq!(details["attempt"], 2);
		assert!(message.field.is_none());
	}

	#[test]
	fn test_validation_errors_keep_field() {
		let mut errors = validator::ValidationErrors::new();
		errors.add("posts_count", validator::ValidationError::new("range"));

		let messages = AppError::Validation(errors).into_errors();

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].content, "range");
		assert_eq!(messages[0].field.as_deref(), Some("posts_count"));
	}
}
