//! In-process fakes of the generative models and a test server around them.

use std::sync::{
	atomic::{AtomicUsize, Ordering},
	Arc,
};

use async_trait::async_trait;

use crate::{
	generate::{Error, Generator, Image, ImageModel, ImageRequest, TextModel},
	store::Store,
	Concurrency, State,
};

enum Reply {
	Fixed(String),
	Echo,
	FailAt(usize),
}

/// A text model that answers from a script and counts its calls.
pub struct FakeText {
	reply: Reply,
	calls: Arc<AtomicUsize>,
}

impl FakeText {
	fn new(reply: Reply) -> Self {
		Self {
			reply,
			calls: Arc::default(),
		}
	}

	/// Always answers with `text`.
	pub fn replying(text: &str) -> Self {
		Self::new(Reply::Fixed(text.into()))
	}

	/// Answers with valid JSON whose caption and image prompt echo the
	/// variation or user request found in the prompt.
	pub fn echoing() -> Self {
		Self::new(Reply::Echo)
	}

	/// Echoes like [`FakeText::echoing`], but fails the call with the
	/// zero-based number `call`.
	pub fn failing_at(call: usize) -> Self {
		Self::new(Reply::FailAt(call))
	}

	/// The number of calls made so far.
	pub fn calls(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.calls)
	}
}

impl Default for FakeText {
	fn default() -> Self {
		Self::echoing()
	}
}

fn echo(prompt: &str) -> String {
	let subject = if let Some(start) = prompt.find("Create variation ") {
		let rest = &prompt[start + "Create ".len()..];

		rest[..rest.find('.').unwrap_or(rest.len())].to_owned()
	} else if let Some(start) = prompt.find("USER REQUEST: ") {
		let rest = &prompt[start + "USER REQUEST: ".len()..];

		rest.lines().next().unwrap_or_default().to_owned()
	} else {
		"a quiet morning".to_owned()
	};

	serde_json::json!({
		"caption": subject,
		"hashtags": ["fake", "test"],
		"image_prompt": subject,
	})
	.to_string()
}

#[async_trait]
impl TextModel for FakeText {
	async fn generate_text(&self, prompt: &str) -> Result<String, Error> {
		let call = self.calls.fetch_add(1, Ordering::SeqCst);

		match &self.reply {
			Reply::Fixed(text) => Ok(text.clone()),
			Reply::FailAt(n) if *n == call => Err(Error::Provider("model overloaded".into())),
			Reply::Echo | Reply::FailAt(..) => Ok(echo(prompt)),
		}
	}
}

/// An image model that never produces an image.
pub struct FakeImages {
	fail: bool,
}

impl FakeImages {
	/// Answers successfully, but without images.
	pub fn empty() -> Self {
		Self { fail: false }
	}

	/// Fails every call.
	pub fn failing() -> Self {
		Self { fail: true }
	}
}

#[async_trait]
impl ImageModel for FakeImages {
	async fn generate_images(&self, _: &ImageRequest<'_>) -> Result<Vec<Image>, Error> {
		if self.fail {
			Err(Error::Provider("image model unavailable".into()))
		} else {
			Ok(Vec::new())
		}
	}
}

/// The models a test server is built with. Without an image model, images
/// are placeholders.
#[derive(Default)]
pub struct Fakes {
	pub text: FakeText,
	pub images: Option<FakeImages>,
}

/// Builds a test server around the full application router.
pub fn server(fakes: Fakes) -> axum_test::TestServer {
	let gateway = Generator::new(
		Arc::new(fakes.text),
		fakes
			.images
			.map(|images| Arc::new(images) as Arc<dyn ImageModel>),
	);

	let state = State {
		store: Store::default(),
		gateway: Arc::new(gateway),
		concurrency: Concurrency::default(),
	};

	axum_test::TestServer::new(crate::app(state)).expect("failed to build test server")
}

mod test {
	use super::*;

	#[test]
	fn test_echo() {
		let variation = echo("...\nAdditional guidance: Create variation 2 of 7. Make it unique and engaging.\n");
		let request = echo("USER REQUEST: a red bicycle\n\nStay close");

		assert_eq!(
			serde_json::from_str::<serde_json::Value>(&variation).unwrap()["caption"],
			"variation 2 of 7"
		);
		assert_eq!(
			serde_json::from_str::<serde_json::Value>(&request).unwrap()["image_prompt"],
			"a red bicycle"
		);
	}
}
