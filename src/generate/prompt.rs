use std::fmt::Write;

use crate::route::template::model::TemplateType;

/// How content for a template should sound and look.
#[derive(Debug)]
pub struct Profile {
	pub style: &'static str,
	pub tone: &'static str,
	/// Prepended to every image prompt of the template.
	pub visual_keywords: &'static str,
	pub content_focus: &'static str,
}

static VIRTUAL_INFLUENCER: Profile = Profile {
	style: "professional, modern, fashion-forward",
	tone: "confident, inspiring, aspirational",
	visual_keywords: "hyper-realistic lifestyle content: people of various ages and ethnicities, fashion items, accessories, travel destinations, cityscapes, food, interior design or aesthetic scenes; people shown as natural portraits with real skin texture and relaxed poses, objects as detailed product or lifestyle shots; always photorealistic and shot on location (city streets, cafes, beaches, parks, rooftops), natural or golden hour light, professional DSLR, 85mm lens, f/1.8, shallow depth of field, looks like a real photo from a portfolio",
	content_focus: "lifestyle inspiration, fashion, style trends, travel, beauty, design and confidence that resonate on modern social media",
};

static BOOK_BLOG: Profile = Profile {
	style: "cozy, intellectual, warm",
	tone: "thoughtful, engaging, literary",
	visual_keywords: "aesthetic book flat lay, coffee, cozy reading nook, vintage books, natural lighting, minimal",
	content_focus: "book recommendations, reading insights, literary quotes, author spotlights",
};

static AESTHETIC: Profile = Profile {
	style: "dreamy, minimal, artistic",
	tone: "poetic, inspiring, calm",
	visual_keywords: "aesthetic minimal scene, soft pastels, dreamy atmosphere, artistic composition, modern minimalism",
	content_focus: "inspiring quotes, aesthetic moments, mindful living, beauty in simplicity",
};

static LUXURY_LIFE: Profile = Profile {
	style: "elegant, aspirational, premium",
	tone: "sophisticated, exclusive, refined",
	visual_keywords: "luxury lifestyle, high-end fashion, exotic travel destinations, premium cars, elegant interiors, golden hour",
	content_focus: "luxury experiences, premium lifestyle tips, exclusive destinations, sophisticated living",
};

static CUSTOM: Profile = Profile {
	style: "flexible, creative, user-defined",
	tone: "adaptable based on user request",
	visual_keywords: "photorealistic, high-quality photography, natural lighting, real-world setting",
	content_focus: "entirely driven by the user's own request, follow it closely",
};

pub fn profile(template_type: TemplateType) -> &'static Profile {
	match template_type {
		TemplateType::VirtualInfluencer => &VIRTUAL_INFLUENCER,
		TemplateType::BookBlog => &BOOK_BLOG,
		TemplateType::Aesthetic => &AESTHETIC,
		TemplateType::LuxuryLife => &LUXURY_LIFE,
		TemplateType::Custom => &CUSTOM,
	}
}

/// Appended to every image prompt sent to the image model.
pub const IMAGE_SUFFIX: &str = "hyper-realistic photograph, authentic real-world photography, natural lighting, real location, DSLR camera, 85mm lens, f/1.8 aperture, shallow depth of field with natural bokeh, realistic textures and environmental detail, shot on Nikon D850 or Canon EOS R5, 8k, ultra high definition, unedited RAW look, natural colors, lifelike";

/// Used when the caller does not provide a negative prompt.
pub const NEGATIVE_PROMPT: &str = "unrealistic, fake, artificial, CGI, 3D render, cartoon, anime, illustration, drawing, painting, sculpture, low quality, blurry, distorted, deformed, disfigured, bad anatomy, extra limbs, missing limbs, bad proportions, poorly drawn face, duplicate, bad hands, extra fingers, missing fingers, text, watermark, logo, signature, username";

const INSTRUCTIONS: &str = r#"
Write one social media post that reads like a real person wrote it, not a brand or an AI.

1. A short, casual caption: one or two brief sentences at most, or just a few words.
   Use two to four emojis where they fit naturally. No corporate tone, no call to action.
   Good examples: "mood ✨💫", "living for these vibes 🌊", "golden hour hits different 🌅".

2. Between 5 and 8 relevant hashtags, mixing popular and niche ones, without the leading '#'.

3. A very detailed prompt for a photorealistic image that looks like a real photograph.
   Pick one kind of subject and vary it between posts:
   - a person (any gender, aged 20 to 40, any ethnicity) with concrete details about
     appearance, outfit, pose and expression, or
   - a scene without people: a travel destination, food or drinks, fashion items,
     an interior, or nature.
   Always name a specific real-world location (for example "Brooklyn Bridge at sunset"
   or "a minimalist Scandinavian coffee shop"), describe the natural light, mention the
   camera (Canon EOS R5 or Nikon D850, 85mm lens, f/1.8) and add environmental details
   that make the shot feel candid and authentic.

Answer with JSON only, in exactly this shape:
{
  "caption": "the caption",
  "hashtags": ["first", "second"],
  "image_prompt": "the detailed image prompt"
}
"#;

/// Builds the text prompt for a single post.
///
/// For [`TemplateType::Custom`] with a custom prompt, the request of the user
/// replaces the style profile entirely. Otherwise the profile sets the style
/// and the custom prompt, if any, is added as extra guidance. A blank custom
/// prompt counts as none.
pub fn caption(template_type: TemplateType, custom_prompt: Option<&str>, tone: &str) -> String {
	let mut prompt = String::new();
	let custom_prompt = custom_prompt.filter(|request| !request.trim().is_empty());

	match (template_type, custom_prompt) {
		(TemplateType::Custom, Some(request)) => {
			let _ = write!(
				prompt,
				"You are a social media content creator. Create content for this request:\n\n\
				USER REQUEST: {request}\n\n\
				Stay close to the request and match the vision it describes.\n"
			);
		}
		(template_type, guidance) => {
			let profile = profile(template_type);

			let _ = write!(
				prompt,
				"You are a social media content creator specializing in {kind} content.\n\n\
				Style: {style}\n\
				Tone: {tone}, {profile_tone}\n\
				Content Focus: {focus}\n",
				kind = template_type.as_str().replace('_', " "),
				style = profile.style,
				profile_tone = profile.tone,
				focus = profile.content_focus,
			);

			if let Some(guidance) = guidance {
				let _ = write!(prompt, "\nAdditional guidance: {guidance}\n");
			}
		}
	}

	prompt.push_str(INSTRUCTIONS);
	prompt
}

/// The instruction that nudges each post of a campaign towards distinct output.
pub fn variation(index: u32, count: u32) -> String {
	format!("Create variation {index} of {count}. Make it unique and engaging.")
}

/// Adds the fixed photographic suffix to an image prompt.
pub fn image(prompt: &str) -> String {
	format!("{prompt}, {IMAGE_SUFFIX}")
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_custom_prompt_replaces_profile() {
		let prompt = caption(TemplateType::Custom, Some("a cat in a spacesuit"), "playful");

		assert!(prompt.contains("USER REQUEST: a cat in a spacesuit"));
		assert!(!prompt.contains(CUSTOM.style));
		assert!(!prompt.contains("playful"));
	}

	#[test]
	fn test_profile_prompt_includes_guidance() {
		let prompt = caption(TemplateType::BookBlog, Some("focus on poetry"), "warm");

		assert!(prompt.contains("specializing in book blog content"));
		assert!(prompt.contains("Tone: warm, thoughtful, engaging, literary"));
		assert!(prompt.contains("Additional guidance: focus on poetry"));
		assert!(prompt.contains("\"image_prompt\""));
	}

	#[test]
	fn test_custom_without_request_uses_profile() {
		let prompt = caption(TemplateType::Custom, None, "professional");

		assert!(prompt.contains(CUSTOM.style));
		assert!(!prompt.contains("Additional guidance"));
	}

	#[test]
	fn test_blank_custom_prompt_is_ignored() {
		for blank in ["", "   "] {
			let custom = caption(TemplateType::Custom, Some(blank), "professional");
			let aesthetic = caption(TemplateType::Aesthetic, Some(blank), "calm");

			assert!(!custom.contains("USER REQUEST"));
			assert!(custom.contains(CUSTOM.style));
			assert!(!aesthetic.contains("Additional guidance"));
		}
	}

	#[test]
	fn test_variation() {
		assert_eq!(
			variation(2, 7),
			"Create variation 2 of 7. Make it unique and engaging."
		);
	}
}
