use serde::Deserialize;

use super::GeneratedContent;
use crate::route::template::model::TemplateType;

/// Length of the caption taken from an unparseable reply, in characters.
pub const FALLBACK_CAPTION_LENGTH: usize = 200;

/// The outcome of reading a text model reply.
///
/// Both variants carry usable content, so callers never need to branch on
/// whether parsing succeeded.
#[derive(Debug, PartialEq)]
pub enum Reply {
	Parsed(GeneratedContent),
	Fallback(GeneratedContent),
}

#[derive(Deserialize)]
struct RawContent {
	#[serde(default)]
	caption: String,
	#[serde(default)]
	hashtags: Vec<String>,
	#[serde(default)]
	image_prompt: String,
}

/// Reads a reply that should contain a JSON object with `caption`,
/// `hashtags` and `image_prompt`, tolerating surrounding whitespace and a
/// Markdown code fence.
///
/// Anything that is not such an object becomes [`Reply::Fallback`], with the
/// start of the raw text as the caption and generic hashtags. This never fails.
pub fn reply(text: &str, template_type: TemplateType) -> Reply {
	let text = strip_fence(text);

	match serde_json::from_str::<RawContent>(text) {
		Ok(raw) => Reply::Parsed(GeneratedContent {
			caption: raw.caption,
			hashtags: raw.hashtags,
			image_prompt: raw.image_prompt,
		}),
		Err(error) => {
			tracing::warn!(%error, template = template_type.as_str(), "text model reply is not valid json, using fallback");

			Reply::Fallback(GeneratedContent {
				caption: text.chars().take(FALLBACK_CAPTION_LENGTH).collect(),
				hashtags: vec![
					"content".into(),
					"socialmedia".into(),
					template_type.as_str().into(),
				],
				image_prompt: String::new(),
			})
		}
	}
}

fn strip_fence(text: &str) -> &str {
	let text = text.trim();
	let text = text
		.strip_prefix("```json")
		.or_else(|| text.strip_prefix("```"))
		.unwrap_or(text);
	let text = text.strip_suffix("```").unwrap_or(text);

	text.trim()
}

impl Reply {
	/// Prefixes the image prompt with the visual keywords of the template.
	///
	/// Fallback content has no image prompt of its own, so it gets the
	/// keywords alone.
	pub fn ground(self, visual_keywords: &str) -> GeneratedContent {
		match self {
			Self::Parsed(mut content) => {
				content.image_prompt = format!("{visual_keywords}, {}", content.image_prompt);
				content
			}
			Self::Fallback(mut content) => {
				content.image_prompt = visual_keywords.to_owned();
				content
			}
		}
	}
}
