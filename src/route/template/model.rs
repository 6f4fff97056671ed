use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The kind of content a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
	VirtualInfluencer,
	BookBlog,
	Aesthetic,
	LuxuryLife,
	Custom,
}

impl TemplateType {
	/// The identifier used on the wire and as the template id.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::VirtualInfluencer => "virtual_influencer",
			Self::BookBlog => "book_blog",
			Self::Aesthetic => "aesthetic",
			Self::LuxuryLife => "luxury_life",
			Self::Custom => "custom",
		}
	}
}

/// A content template, describing how generated posts should look and read.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Template {
	/// The unique identifier of the template.
	pub id: &'static str,
	/// The display name of the template.
	pub name: &'static str,
	#[serde(rename = "type")]
	pub kind: TemplateType,
	pub description: &'static str,
	pub style_prompt: &'static str,
	pub content_guidelines: &'static str,
	pub visual_style: &'static str,
	/// A single glyph shown next to the template name.
	pub icon: &'static str,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct TemplateIdInput {
	pub id: String,
}

/// All templates, in display order.
pub static TEMPLATES: [Template; 5] = [
	Template {
		id: "virtual_influencer",
		name: "Virtual Influencer",
		kind: TemplateType::VirtualInfluencer,
		description: "AI-generated human model content for virtual influencers and digital avatars",
		style_prompt: "Professional fashion photography, high-end modeling aesthetics, photorealistic human portraits",
		content_guidelines: "Share fashion inspiration, style trends, lifestyle content from a virtual model perspective",
		visual_style: "Professional model portraits, studio fashion photography, cinematic lighting, high-fashion looks",
		icon: "👤",
	},
	Template {
		id: "book_blog",
		name: "Book Blog",
		kind: TemplateType::BookBlog,
		description: "Cozy reading content with literary charm",
		style_prompt: "Warm, intellectual, cozy with aesthetic book photography",
		content_guidelines: "Book recommendations, quotes, reading insights",
		visual_style: "Flat lays, cozy reading nooks, vintage aesthetics",
		icon: "📚",
	},
	Template {
		id: "aesthetic",
		name: "Aesthetic Blog",
		kind: TemplateType::Aesthetic,
		description: "Minimal, dreamy content for aesthetic enthusiasts",
		style_prompt: "Dreamy, minimal, artistic with soft color palettes",
		content_guidelines: "Inspiring quotes, mindful moments, aesthetic living",
		visual_style: "Soft pastels, minimal compositions, artistic photography",
		icon: "✨",
	},
	Template {
		id: "luxury_life",
		name: "Luxury Life",
		kind: TemplateType::LuxuryLife,
		description: "Premium lifestyle content with sophisticated elegance",
		style_prompt: "Elegant, aspirational, premium with luxury aesthetics",
		content_guidelines: "Luxury experiences, exclusive destinations, refined living",
		visual_style: "High-end fashion, exotic locations, premium products",
		icon: "💎",
	},
	Template {
		id: "custom",
		name: "Custom",
		kind: TemplateType::Custom,
		description: "Create anything you imagine! Describe your vision in the custom prompt field",
		style_prompt: "Flexible, creative, personalized",
		content_guidelines: "User-defined content based on custom prompt",
		visual_style: "Varies based on user input",
		icon: "✏️",
	},
];

/// Returns every template in display order.
pub fn list() -> &'static [Template] {
	&TEMPLATES
}

pub fn get(id: &str) -> Option<&'static Template> {
	TEMPLATES.iter().find(|template| template.id == id)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_list_is_stable() {
		let first = list().iter().map(|t| t.id).collect::<Vec<_>>();
		let second = list().iter().map(|t| t.id).collect::<Vec<_>>();

		assert_eq!(first, second);
		assert_eq!(
			first,
			["virtual_influencer", "book_blog", "aesthetic", "luxury_life", "custom"]
		);
	}

	#[test]
	fn test_ids_match_types() {
		for template in list() {
			assert_eq!(template.id, template.kind.as_str());
			assert_eq!(get(template.id).map(|t| t.kind), Some(template.kind));
		}

		assert!(get("unknown").is_none());
	}
}
