//! The boundary to the generative text and image models.
//!
//! [`Gateway`] is what the rest of the application talks to. [`Generator`] is
//! the production gateway: it builds prompts, repairs malformed replies and
//! substitutes placeholders for images, delegating the actual calls to a
//! [`TextModel`] and an optional [`ImageModel`].

pub mod gemini;
pub mod imagen;
pub mod parse;
pub mod prompt;

use std::{num::NonZeroUsize, sync::Arc, time::Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures::{StreamExt, TryStreamExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::route::template::model::TemplateType;

/// Returned when no image model is configured.
pub const PLACEHOLDER_UNCONFIGURED: &str =
	"https://placehold.co/1024x1024/png?text=Configure+Vertex+AI";
/// Returned when the image model answers without an image.
pub const PLACEHOLDER_FAILED: &str = "https://placehold.co/1024x1024/png?text=Generation+Failed";
/// Returned when the image model call fails.
pub const PLACEHOLDER_ERROR: &str = "https://placehold.co/1024x1024/png?text=Error";

/// The text content of a single post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedContent {
	pub caption: String,
	pub hashtags: Vec<String>,
	/// The prompt the image of the post is generated from.
	pub image_prompt: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("request to {provider} failed: {source}")]
	Http {
		provider: &'static str,
		#[source]
		source: reqwest::Error,
	},
	#[error("{provider} responded with {status}: {body}")]
	Status {
		provider: &'static str,
		status: reqwest::StatusCode,
		body: String,
	},
	#[error("invalid credentials: {0}")]
	Credentials(String),
	#[error("failed to sign token: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
	#[error("invalid image payload: {0}")]
	Payload(#[from] base64::DecodeError),
	#[error("{0}")]
	Provider(String),
}

/// A generative text model: a prompt goes in, free text comes out.
#[async_trait]
pub trait TextModel: Send + Sync {
	async fn generate_text(&self, prompt: &str) -> Result<String, Error>;
}

/// Parameters of a single image generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest<'a> {
	pub prompt: &'a str,
	pub negative_prompt: &'a str,
	pub count: u32,
	pub aspect_ratio: &'a str,
}

/// A generated image as returned by an [`ImageModel`].
#[derive(Debug, Clone)]
pub struct Image {
	pub bytes: Vec<u8>,
	pub mime_type: String,
}

/// A generative image model. An empty result is a valid answer that means
/// nothing was generated.
#[async_trait]
pub trait ImageModel: Send + Sync {
	async fn generate_images(&self, request: &ImageRequest<'_>) -> Result<Vec<Image>, Error>;
}

/// Content generation as seen by the routes and the scheduler.
#[async_trait]
pub trait Gateway: Send + Sync {
	/// Generates the caption, hashtags and image prompt of one post.
	async fn generate_caption(
		&self,
		template_type: TemplateType,
		custom_prompt: Option<&str>,
		tone: &str,
	) -> Result<GeneratedContent, Error>;

	/// Generates one image and returns a reference to it: either a URL or a
	/// `data:` URL carrying the image itself.
	async fn generate_image(&self, prompt: &str, negative_prompt: Option<&str>)
		-> Result<String, Error>;

	/// Generates the content of `count` posts, each nudged towards being
	/// different from the others.
	///
	/// At most `concurrency` calls are in flight. The result keeps the order
	/// of the variations, and the first failure cancels the remaining calls.
	async fn generate_campaign_posts(
		&self,
		template_type: TemplateType,
		count: u32,
		tone: &str,
		concurrency: NonZeroUsize,
	) -> Result<Vec<GeneratedContent>, Error> {
		futures::stream::iter(1..=count)
			.map(move |index| async move {
				let variation = prompt::variation(index, count);

				self.generate_caption(template_type, Some(&variation), tone)
					.await
			})
			.buffered(concurrency.get())
			.try_collect()
			.await
	}
}

/// The production [`Gateway`].
pub struct Generator {
	text: Arc<dyn TextModel>,
	image: Option<Arc<dyn ImageModel>>,
}

impl Generator {
	/// Creates a generator. Without an image model, every image is a placeholder.
	pub fn new(text: Arc<dyn TextModel>, image: Option<Arc<dyn ImageModel>>) -> Self {
		Self { text, image }
	}
}

#[async_trait]
impl Gateway for Generator {
	#[tracing::instrument(skip(self, custom_prompt), fields(template = template_type.as_str()))]
	async fn generate_caption(
		&self,
		template_type: TemplateType,
		custom_prompt: Option<&str>,
		tone: &str,
	) -> Result<GeneratedContent, Error> {
		let started = Instant::now();
		let text = self
			.text
			.generate_text(&prompt::caption(template_type, custom_prompt, tone))
			.await?;

		let reply = parse::reply(&text, template_type);

		tracing::info!(
			monotonic_counter.text_generations = 1_u64,
			histogram.text_generation_ms = elapsed_ms(started),
			fallback = matches!(reply, parse::Reply::Fallback(..)),
			"generated caption"
		);

		Ok(reply.ground(prompt::profile(template_type).visual_keywords))
	}

	#[tracing::instrument(skip_all)]
	async fn generate_image(
		&self,
		prompt: &str,
		negative_prompt: Option<&str>,
	) -> Result<String, Error> {
		let Some(model) = &self.image else {
			return Ok(PLACEHOLDER_UNCONFIGURED.into());
		};

		let prompt = prompt::image(prompt);
		let request = ImageRequest {
			prompt: &prompt,
			negative_prompt: negative_prompt.unwrap_or(prompt::NEGATIVE_PROMPT),
			count: 1,
			aspect_ratio: "1:1",
		};

		let started = Instant::now();
		let result = model.generate_images(&request).await;

		tracing::info!(
			monotonic_counter.image_generations = 1_u64,
			histogram.image_generation_ms = elapsed_ms(started),
			"image model answered"
		);

		Ok(match result {
			Ok(images) => match images.into_iter().next() {
				Some(image) if !image.bytes.is_empty() => {
					format!("data:{};base64,{}", image.mime_type, BASE64.encode(image.bytes))
				}
				_ => {
					tracing::warn!("image model returned no image");
					PLACEHOLDER_FAILED.into()
				}
			},
			Err(error) => {
				tracing::error!(%error, "image generation failed");
				PLACEHOLDER_ERROR.into()
			}
		})
	}
}

fn elapsed_ms(started: Instant) -> u64 {
	u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod test {
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Mutex,
	};

	use super::*;
	use crate::test::{FakeImages, FakeText};

	fn generator(text: FakeText, image: Option<FakeImages>) -> Generator {
		Generator::new(
			Arc::new(text),
			image.map(|image| Arc::new(image) as Arc<dyn ImageModel>),
		)
	}

	#[tokio::test]
	async fn test_caption_grounds_image_prompt() {
		let generator = generator(
			FakeText::replying(r#"{"caption": "hi", "hashtags": ["a"], "image_prompt": "a pier"}"#),
			None,
		);

		let content = generator
			.generate_caption(TemplateType::BookBlog, None, "professional")
			.await
			.unwrap();

		let keywords = prompt::profile(TemplateType::BookBlog).visual_keywords;

		assert_eq!(content.caption, "hi");
		assert_eq!(content.image_prompt, format!("{keywords}, a pier"));
	}

	#[tokio::test]
	async fn test_caption_fallback_on_non_json() {
		let generator = generator(FakeText::replying("sorry, I can't do JSON today"), None);

		let content = generator
			.generate_caption(TemplateType::Aesthetic, None, "calm")
			.await
			.unwrap();

		let keywords = prompt::profile(TemplateType::Aesthetic).visual_keywords;

		assert!(content.image_prompt.starts_with(keywords));
		assert!(!content.hashtags.is_empty());
		assert_eq!(content.caption, "sorry, I can't do JSON today");
	}

	#[tokio::test]
	async fn test_caption_propagates_provider_failure() {
		let generator = generator(FakeText::failing_at(0), None);

		let result = generator
			.generate_caption(TemplateType::Custom, Some("anything"), "professional")
			.await;

		assert!(matches!(result, Err(Error::Provider(..))));
	}

	#[tokio::test]
	async fn test_campaign_posts_keep_order() {
		let text = FakeText::echoing();
		let calls = text.calls();
		let generator = generator(text, None);

		let contents = generator
			.generate_campaign_posts(
				TemplateType::LuxuryLife,
				5,
				"professional",
				NonZeroUsize::new(3).unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 5);

		for (index, content) in contents.iter().enumerate() {
			assert_eq!(content.caption, format!("variation {} of 5", index + 1));
		}
	}

	#[tokio::test]
	async fn test_campaign_posts_fail_fast() {
		let generator = generator(FakeText::failing_at(1), None);

		let result = generator
			.generate_campaign_posts(
				TemplateType::Aesthetic,
				4,
				"professional",
				NonZeroUsize::MIN,
			)
			.await;

		assert!(result.is_err());
	}

	#[tokio::test]
	async fn test_image_placeholders() {
		let unconfigured = generator(FakeText::echoing(), None);

		assert_eq!(
			unconfigured.generate_image("a lake", None).await.unwrap(),
			PLACEHOLDER_UNCONFIGURED
		);

		let empty = generator(FakeText::echoing(), Some(FakeImages::empty()));

		assert_eq!(
			empty.generate_image("a lake", None).await.unwrap(),
			PLACEHOLDER_FAILED
		);

		let failing = generator(FakeText::echoing(), Some(FakeImages::failing()));

		assert_eq!(
			failing.generate_image("a lake", None).await.unwrap(),
			PLACEHOLDER_ERROR
		);
	}

	#[tokio::test]
	async fn test_image_request() {
		struct Recorder(Mutex<Vec<(String, String, u32, String)>>, AtomicUsize);

		#[async_trait]
		impl ImageModel for Recorder {
			async fn generate_images(
				&self,
				request: &ImageRequest<'_>,
			) -> Result<Vec<Image>, Error> {
				self.1.fetch_add(1, Ordering::SeqCst);
				self.0.lock().unwrap().push((
					request.prompt.to_owned(),
					request.negative_prompt.to_owned(),
					request.count,
					request.aspect_ratio.to_owned(),
				));

				Ok(vec![Image {
					bytes: vec![1, 2, 3],
					mime_type: "image/png".into(),
				}])
			}
		}

		let recorder = Arc::new(Recorder(Mutex::new(Vec::new()), AtomicUsize::new(0)));
		let generator = Generator::new(Arc::new(FakeText::echoing()), Some(recorder.clone() as Arc<dyn ImageModel>));

		let image = generator.generate_image("a lake", None).await.unwrap();
		assert_eq!(image, "data:image/png;base64,AQID");

		generator
			.generate_image("a lake", Some("people"))
			.await
			.unwrap();

		let requests = recorder.0.lock().unwrap();

		assert_eq!(recorder.1.load(Ordering::SeqCst), 2);
		assert_eq!(requests[0].0, format!("a lake, {}", prompt::IMAGE_SUFFIX));
		assert_eq!(requests[0].1, prompt::NEGATIVE_PROMPT);
		assert_eq!(requests[0].2, 1);
		assert_eq!(requests[0].3, "1:1");
		assert_eq!(requests[1].1, "people");
	}
}
