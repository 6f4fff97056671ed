use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	generate::GeneratedContent,
	openapi::tag,
	store::Store,
	Gateway,
};

use super::{model, Error, RouteError};

/// List posts
/// Returns every standalone post, oldest first.
#[route(tag = tag::POST)]
pub async fn list_posts(State(store): State<Store>) -> Json<Vec<model::Post>> {
	Json(store.posts.list())
}

/// Create post
/// Generates the caption and image of a new post and stores it.
///
/// With `schedule_at` the post is scheduled, otherwise it is a draft.
#[route(tag = tag::POST, response(status = 500, description = "Content generation failed."))]
pub async fn create_post(
	State(store): State<Store>,
	State(gateway): State<Gateway>,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let tone = input.tone.as_deref().unwrap_or(model::DEFAULT_TONE);
	let content = gateway
		.generate_caption(input.template_type, input.custom_prompt.as_deref(), tone)
		.await
		.map_err(Error::Creation)?;

	let image_url = gateway
		.generate_image(&content.image_prompt, None)
		.await
		.map_err(Error::Creation)?;

	let post = model::Post::new(input.template_type, content, image_url, input.schedule_at);

	store.posts.put(post.clone());

	tracing::info!(id = %post.id, status = ?post.status, "post created");

	Ok(Json(post))
}

/// Generate content
/// Generates a caption, hashtags and an image prompt without storing anything.
#[route(tag = tag::POST, response(status = 500, description = "Content generation failed."))]
pub async fn generate_content(
	State(gateway): State<Gateway>,
	Json(input): Json<model::GenerateContentInput>,
) -> Result<Json<GeneratedContent>, RouteError> {
	let tone = input.tone.as_deref().unwrap_or(model::DEFAULT_TONE);
	let mut content = gateway
		.generate_caption(input.template_type, input.custom_prompt.as_deref(), tone)
		.await
		.map_err(Error::Generation)?;

	if !input.include_hashtags {
		content.hashtags.clear();
	}

	Ok(Json(content))
}

/// Get post
/// Returns a single post by its unique id.
#[route(tag = tag::POST, response(status = 404, description = "Unknown post."))]
pub async fn get_post(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(
		path.uuid()
			.and_then(|id| store.posts.get(id))
			.ok_or(Error::UnknownPost(path.id))?,
	))
}

/// Delete post
/// Deletes a post by its unique id. Deleting a post that does not exist succeeds.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
) -> Json<model::Acknowledgement> {
	if let Some(id) = path.uuid() {
		store.posts.delete(id);
	}

	Json(model::Acknowledgement::new("Post deleted successfully"))
}

/// Update post status
/// Sets the status of a post, such as `published`.
#[route(tag = tag::POST, response(status = 404, description = "Unknown post."))]
pub async fn update_post_status(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
	Query(input): Query<model::UpdatePostStatusInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(
		path.uuid()
			.and_then(|id| store.posts.update_status(id, input.status))
			.ok_or(Error::UnknownPost(path.id))?,
	))
}
