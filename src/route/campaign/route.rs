use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	schedule,
	store::Store,
	Concurrency, Gateway,
};

use super::{model, Error, RouteError};

/// List campaigns
/// Returns every campaign with its posts, oldest first.
#[route(tag = tag::CAMPAIGN)]
pub async fn list_campaigns(State(store): State<Store>) -> Json<Vec<model::Campaign>> {
	Json(store.campaigns.list())
}

/// Create campaign
/// Generates every post of a new campaign, schedules them and stores the campaign.
///
/// Posts are spread over the days from the start date on, `posts_per_day` at a
/// time, starting at 08:00. If any generation fails, nothing is stored.
#[route(
	tag = tag::CAMPAIGN,
	response(status = 500, description = "Content generation failed.")
)]
pub async fn create_campaign(
	State(store): State<Store>,
	State(gateway): State<Gateway>,
	State(Concurrency(concurrency)): State<Concurrency>,
	Json(input): Json<model::CreateCampaignInput>,
) -> Result<Json<model::Campaign>, RouteError> {
	Ok(Json(
		schedule::create_campaign(gateway.as_ref(), &store.campaigns, concurrency, input).await?,
	))
}

/// Get campaign
/// Returns a single campaign by its unique id.
#[route(tag = tag::CAMPAIGN, response(status = 404, description = "Unknown campaign."))]
pub async fn get_campaign(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Campaign>, RouteError> {
	Ok(Json(
		path.uuid()
			.and_then(|id| store.campaigns.get(id))
			.ok_or(Error::UnknownCampaign(path.id))?,
	))
}

/// Delete campaign
/// Deletes a campaign and its posts. Deleting a campaign that does not exist succeeds.
#[route(tag = tag::CAMPAIGN)]
pub async fn delete_campaign(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
) -> Json<model::Acknowledgement> {
	if let Some(id) = path.uuid() {
		store.campaigns.delete(id);
	}

	Json(model::Acknowledgement::new("Campaign deleted successfully"))
}

/// Update campaign status
/// Sets the status of a campaign to `active`, `paused` or `completed`.
#[route(tag = tag::CAMPAIGN, response(status = 404, description = "Unknown campaign."))]
pub async fn update_campaign_status(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
	Query(input): Query<model::UpdateCampaignStatusInput>,
) -> Result<Json<model::Campaign>, RouteError> {
	Ok(Json(
		path.uuid()
			.and_then(|id| store.campaigns.update_status(id, input.status))
			.ok_or(Error::UnknownCampaign(path.id))?,
	))
}
