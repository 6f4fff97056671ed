use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Error, TextModel};

const PROVIDER: &str = "gemini";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";

/// A Gemini text model, called through the `generateContent` REST endpoint.
pub struct Gemini {
	client: reqwest::Client,
	api_key: String,
	base_url: String,
	model: String,
}

impl Gemini {
	pub fn new(client: reqwest::Client, api_key: String) -> Self {
		Self {
			client,
			api_key,
			base_url: DEFAULT_BASE_URL.into(),
			model: DEFAULT_MODEL.into(),
		}
	}

	fn endpoint(&self) -> String {
		format!(
			"{}/{}:generateContent",
			self.base_url.trim_end_matches('/'),
			self.model
		)
	}
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
	contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
	role: &'static str,
	parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
	text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
	content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
	text: Option<String>,
}

impl GenerateContentResponse {
	/// The text of the first candidate, or an empty string when the model
	/// produced nothing (for example because the prompt was blocked).
	fn into_text(self) -> String {
		self.candidates
			.into_iter()
			.next()
			.and_then(|candidate| candidate.content)
			.map(|content| {
				content
					.parts
					.into_iter()
					.filter_map(|part| part.text)
					.collect::<String>()
			})
			.unwrap_or_default()
	}
}

#[async_trait]
impl TextModel for Gemini {
	async fn generate_text(&self, prompt: &str) -> Result<String, Error> {
		let request = GenerateContentRequest {
			contents: [Content {
				role: "user",
				parts: [RequestPart { text: prompt }],
			}],
		};

		tracing::debug!(model = %self.model, prompt_len = prompt.len(), "calling text model");

		let response = self
			.client
			.post(self.endpoint())
			.header("x-goog-api-key", &self.api_key)
			.json(&request)
			.send()
			.await
			.map_err(|source| Error::Http {
				provider: PROVIDER,
				source,
			})?;

		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();

			return Err(Error::Status {
				provider: PROVIDER,
				status,
				body,
			});
		}

		let response = response
			.json::<GenerateContentResponse>()
			.await
			.map_err(|source| Error::Http {
				provider: PROVIDER,
				source,
			})?;

		Ok(response.into_text().trim().to_owned())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_request_shape() {
		let request = GenerateContentRequest {
			contents: [Content {
				role: "user",
				parts: [RequestPart { text: "hello" }],
			}],
		};

		assert_eq!(
			serde_json::to_value(&request).unwrap(),
			serde_json::json!({ "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }] })
		);
	}

	#[test]
	fn test_response_text() {
		let response = serde_json::from_value::<GenerateContentResponse>(serde_json::json!({
			"candidates": [{
				"content": { "parts": [{ "text": "{\"caption\":" }, { "text": " \"hi\"}" }] },
				"finishReason": "STOP"
			}],
			"usageMetadata": { "totalTokenCount": 12 }
		}))
		.unwrap();

		assert_eq!(response.into_text(), "{\"caption\": \"hi\"}");
	}

	#[test]
	fn test_blocked_response_is_empty() {
		let response = serde_json::from_value::<GenerateContentResponse>(serde_json::json!({
			"promptFeedback": { "blockReason": "SAFETY" }
		}))
		.unwrap();

		assert_eq!(response.into_text(), "");
	}

	#[test]
	fn test_endpoint() {
		let gemini = Gemini::new(reqwest::Client::new(), "key".into());

		assert_eq!(
			gemini.endpoint(),
			"https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
		);
	}
}
