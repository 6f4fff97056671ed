pub use crate::route::model::{Acknowledgement, IdInput};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
	generate::GeneratedContent,
	route::{model::timestamp, template::model::TemplateType},
	store,
};

pub const DEFAULT_TONE: &str = "professional";

fn default_tone() -> Option<String> {
	Some(DEFAULT_TONE.into())
}

fn yes() -> bool {
	true
}

/// The lifecycle state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
	Draft,
	Scheduled,
	Published,
	Failed,
}

/// A single piece of generated content.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: Uuid,
	/// The template the content was generated from.
	pub template_type: TemplateType,
	pub caption: String,
	/// A link to the image, or the image itself as a `data:` URL.
	pub image_url: Option<String>,
	/// The prompt the image was generated from.
	pub image_prompt: Option<String>,
	pub hashtags: Vec<String>,
	/// When the post should go out, if it is scheduled.
	pub scheduled_at: Option<DateTime<Utc>>,
	pub status: PostStatus,
	/// The creation time of the post.
	pub created_at: DateTime<Utc>,
}

impl Post {
	/// Builds a post from generated content.
	///
	/// The post is [`PostStatus::Scheduled`] when it has a scheduled time
	/// and [`PostStatus::Draft`] otherwise.
	pub fn new(
		template_type: TemplateType,
		content: GeneratedContent,
		image_url: String,
		scheduled_at: Option<DateTime<Utc>>,
	) -> Self {
		Self {
			id: Uuid::new_v4(),
			template_type,
			caption: content.caption,
			image_url: Some(image_url),
			image_prompt: Some(content.image_prompt),
			hashtags: content.hashtags,
			status: if scheduled_at.is_some() {
				PostStatus::Scheduled
			} else {
				PostStatus::Draft
			},
			scheduled_at,
			created_at: Utc::now(),
		}
	}
}

impl store::Record for Post {
	type Status = PostStatus;

	fn id(&self) -> Uuid {
		self.id
	}

	fn set_status(&mut self, status: PostStatus) {
		self.status = status;
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct GenerateContentInput {
	pub template_type: TemplateType,
	/// Extra instructions. For the `custom` template this replaces the style profile.
	pub custom_prompt: Option<String>,
	/// The tone of voice, such as `playful` or `professional`.
	#[serde(default = "default_tone")]
	pub tone: Option<String>,
	/// Whether to return hashtags alongside the caption.
	#[serde(default = "yes")]
	pub include_hashtags: bool,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreatePostInput {
	pub template_type: TemplateType,
	/// Extra instructions. For the `custom` template this replaces the style profile.
	pub custom_prompt: Option<String>,
	/// The tone of voice, such as `playful` or `professional`.
	#[serde(default = "default_tone")]
	pub tone: Option<String>,
	/// Schedules the post. Without it the post is created as a draft.
	#[serde(default, deserialize_with = "timestamp::deserialize_option")]
	#[schemars(with = "Option<String>")]
	pub schedule_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdatePostStatusInput {
	pub status: PostStatus,
}
