use aide::axum::{
	routing::{get_with, patch_with},
	ApiRouter,
};
use axum::http::StatusCode;
use crate::{error, schedule, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown campaign {0}")]
	UnknownCampaign(String),
	#[error(transparent)]
	Schedule(#[from] schedule::Error),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

impl From<schedule::Error> for RouteError {
	fn from(error: schedule::Error) -> Self {
		Self::Route(error.into())
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_campaigns, list_campaigns_docs)
				.post_with(create_campaign, create_campaign_docs),
		)
		.api_route(
			"/:id",
			get_with(get_campaign, get_campaign_docs)
				.delete_with(delete_campaign, delete_campaign_docs),
		)
		.api_route(
			"/:id/status",
			patch_with(update_campaign_status, update_campaign_status_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownCampaign(..) => StatusCode::NOT_FOUND,
			Self::Schedule(schedule::Error::PostsCount(..) | schedule::Error::Name) => {
				StatusCode::BAD_REQUEST
			}
			Self::Schedule(schedule::Error::Generation(..)) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownCampaign(campaign) => error::Message::new("unknown_campaign")
				.detail("campaign", campaign)
				.into_vec(),
			Self::Schedule(schedule::Error::PostsCount(count)) => error::Message::new("range")
				.field("posts_count")
				.detail("min", 1)
				.detail("max", model::MAX_POSTS)
				.detail("value", count)
				.into_vec(),
			Self::Schedule(schedule::Error::Name) => {
				error::Message::new("length").field("name").into_vec()
			}
			Self::Schedule(schedule::Error::Generation(error)) => {
				error::Message::new("campaign_creation_failed")
					.detail("message", error.to_string())
					.into_vec()
			}
		}
	}
}
