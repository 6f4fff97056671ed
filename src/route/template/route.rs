use macros::route;

use crate::{
	extract::{Json, Path},
	openapi::tag,
};

use super::{model, Error, RouteError};

/// List templates
/// Returns every available content template, always in the same order.
#[route(tag = tag::TEMPLATE)]
pub async fn list_templates() -> Json<&'static [model::Template]> {
	Json(model::list())
}

/// Get template
/// Returns a single template by its id, such as `book_blog`.
#[route(tag = tag::TEMPLATE, response(status = 404, description = "Unknown template."))]
pub async fn get_template(
	Path(path): Path<model::TemplateIdInput>,
) -> Result<Json<&'static model::Template>, RouteError> {
	Ok(Json(
		model::get(&path.id).ok_or(Error::UnknownTemplate(path.id))?,
	))
}
