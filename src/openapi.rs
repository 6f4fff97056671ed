use aide::{openapi::Tag, transform::TransformOpenApi};

use crate::{error, extract::Json};

pub mod tag {
	pub const TEMPLATE: &str = "Template";
	pub const POST: &str = "Post";
	pub const CAMPAIGN: &str = "Campaign";
	pub const STATUS: &str = "Status";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Media Orchestrator API")
		.summary("Generated social media posts and campaigns")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::TEMPLATE.into(),
			description: Some("Content templates".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Standalone post generation and management".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::CAMPAIGN.into(),
			description: Some("Scheduled campaigns of generated posts".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::STATUS.into(),
			description: Some("Service liveness".into()),
			..Default::default()
		})
		.default_response_with::<Json<error::ErrorBody<'static>>, _>(|res| {
			res.example(error::ErrorBody {
				success: false,
				errors: error::Message::new("unknown_post")
					.field("optional field")
					.detail("post", "3f0c6f5e-9a43-4f5c-9a3e-0d7b5f4f2d11")
					.into_vec(),
			})
		})
}
