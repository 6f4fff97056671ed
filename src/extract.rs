use aide::OperationIo;
use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Request},
	http::{request, Response},
	response::IntoResponse,
};
use serde::de;

use crate::error::AppError;

/// Extractor that deserializes a JSON body and validates it.
///
/// [`validator::Validate`] runs on the deserialized body, so bounds such as
/// `posts_count` are reported per field. The JSON schema of `T` is only used
/// for documentation.
///
/// ```ignore
/// async fn create_campaign(Json(input): Json<CreateCampaignInput>) {
///   // input.posts_count is within bounds here
/// }
/// ```
///
/// It is also the response type for JSON bodies.
#[derive(OperationIo)]
#[aide(
	input_with = "axum_jsonschema::Json<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		axum::extract::Json(self.0).into_response()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: de::DeserializeOwned + validator::Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let input = axum::extract::Json::<T>::from_request(req, state)
			.await?
			.0;

		input.validate()?;
		Ok(Self(input))
	}
}

/// Extractor that deserializes a query string and validates it.
///
/// ```ignore
/// async fn update_status(Query(input): Query<UpdatePostStatusInput>) {
///   // PATCH /api/posts/:id/status?status=published
/// }
/// ```
#[derive(OperationIo)]
#[aide(input_with = "axum::extract::Query<T>", json_schema)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: de::DeserializeOwned + validator::Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let input = axum::extract::Query::<T>::from_request_parts(parts, state)
			.await?
			.0;

		input.validate()?;
		Ok(Self(input))
	}
}

/// Extractor that deserializes path parameters and validates them.
#[derive(OperationIo)]
#[aide(input_with = "axum::extract::Path<T>", json_schema)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: de::DeserializeOwned + validator::Validate + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let input = axum::extract::Path::<T>::from_request_parts(parts, state)
			.await?
			.0;

		input.validate()?;
		Ok(Self(input))
	}
}
