pub use crate::route::model::{Acknowledgement, IdInput};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
	route::{model::timestamp, post::model::Post, template::model::TemplateType},
	store,
};

/// The largest number of posts a single campaign can hold.
pub const MAX_POSTS: u32 = 90;

/// How often a campaign publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
	Daily,
	TwiceDaily,
	ThreeTimesDaily,
}

impl Frequency {
	pub const fn posts_per_day(self) -> u32 {
		match self {
			Self::Daily => 1,
			Self::TwiceDaily => 2,
			Self::ThreeTimesDaily => 3,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
	Active,
	Paused,
	Completed,
}

/// A named series of scheduled posts generated from one template.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Campaign {
	/// The unique identifier of the campaign.
	pub id: Uuid,
	pub name: String,
	pub template_type: TemplateType,
	/// The posts of the campaign, in order of their scheduled time.
	pub posts: Vec<Post>,
	pub frequency: Frequency,
	pub start_date: DateTime<Utc>,
	pub end_date: Option<DateTime<Utc>>,
	pub status: CampaignStatus,
	pub created_at: DateTime<Utc>,
}

impl store::Record for Campaign {
	type Status = CampaignStatus;

	fn id(&self) -> Uuid {
		self.id
	}

	fn set_status(&mut self, status: CampaignStatus) {
		self.status = status;
	}
}

#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct CreateCampaignInput {
	#[validate(length(min = 1))]
	pub name: String,
	pub template_type: TemplateType,
	pub frequency: Frequency,
	/// When the campaign starts. The first post goes out eight hours later,
	/// which is 08:00 for a start at midnight.
	#[serde(deserialize_with = "timestamp::deserialize")]
	#[schemars(with = "String")]
	pub start_date: DateTime<Utc>,
	#[serde(default, deserialize_with = "timestamp::deserialize_option")]
	#[schemars(with = "Option<String>")]
	pub end_date: Option<DateTime<Utc>>,
	/// How many posts to generate.
	#[validate(range(min = 1, max = 90))]
	pub posts_count: u32,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateCampaignStatusInput {
	pub status: CampaignStatus,
}
