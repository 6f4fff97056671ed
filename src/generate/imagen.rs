use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{Error, Image, ImageModel, ImageRequest};

const PROVIDER: &str = "imagen";
const TOKEN_PROVIDER: &str = "google oauth";
const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const DEFAULT_MODEL: &str = "imagen-3.0-generate-001";

fn default_token_uri() -> String {
	"https://oauth2.googleapis.com/token".into()
}

/// The parts of a Google service account key file needed to obtain tokens.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
	pub client_email: String,
	pub private_key: String,
	#[serde(default = "default_token_uri")]
	pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServiceAccount")
			.field("client_email", &self.client_email)
			.field("token_uri", &self.token_uri)
			.finish_non_exhaustive()
	}
}

impl ServiceAccount {
	pub fn from_json(json: &str) -> Result<Self, Error> {
		serde_json::from_str(json).map_err(|e| Error::Credentials(e.to_string()))
	}
}

#[derive(Serialize)]
struct Claims<'a> {
	iss: &'a str,
	sub: &'a str,
	scope: &'static str,
	aud: &'a str,
	iat: i64,
	exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
	access_token: String,
	expires_at: i64,
}

/// A Vertex AI Imagen model in a single project and region.
pub struct Imagen {
	client: reqwest::Client,
	project: String,
	region: String,
	model: String,
	account: ServiceAccount,
	token: Mutex<Option<CachedToken>>,
}

impl Imagen {
	pub fn new(
		client: reqwest::Client,
		project: String,
		region: String,
		account: ServiceAccount,
	) -> Self {
		Self {
			client,
			project,
			region,
			model: DEFAULT_MODEL.into(),
			account,
			token: Mutex::new(None),
		}
	}

	fn endpoint(&self) -> String {
		format!(
			"https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/publishers/google/models/{model}:predict",
			region = self.region,
			project = self.project,
			model = self.model,
		)
	}

	/// Returns an access token, exchanging a freshly signed assertion when the
	/// cached token expires within a minute.
	async fn access_token(&self) -> Result<String, Error> {
		let now = Utc::now();

		let cached = self.token.lock().clone();

		if let Some(cached) = cached.filter(|cached| cached.expires_at > now.timestamp() + 60) {
			return Ok(cached.access_token);
		}

		let claims = Claims {
			iss: &self.account.client_email,
			sub: &self.account.client_email,
			scope: SCOPE,
			aud: &self.account.token_uri,
			iat: now.timestamp(),
			exp: (now + Duration::hours(1)).timestamp(),
		};

		let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())?;
		let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?;

		let response = self
			.client
			.post(&self.account.token_uri)
			.form(&[
				("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
				("assertion", assertion.as_str()),
			])
			.send()
			.await
			.map_err(|source| Error::Http {
				provider: TOKEN_PROVIDER,
				source,
			})?;

		let status = response.status();

		if !status.is_success() {
			return Err(Error::Status {
				provider: TOKEN_PROVIDER,
				status,
				body: response.text().await.unwrap_or_default(),
			});
		}

		let token = response
			.json::<TokenResponse>()
			.await
			.map_err(|source| Error::Http {
				provider: TOKEN_PROVIDER,
				source,
			})?;

		tracing::debug!(expires_in = token.expires_in, "obtained vertex access token");

		*self.token.lock() = Some(CachedToken {
			access_token: token.access_token.clone(),
			expires_at: Utc::now().timestamp() + token.expires_in,
		});

		Ok(token.access_token)
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
	instances: [Instance<'a>; 1],
	parameters: Parameters<'a>,
}

#[derive(Serialize)]
struct Instance<'a> {
	prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
	sample_count: u32,
	aspect_ratio: &'a str,
	negative_prompt: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
	#[serde(default)]
	predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
	bytes_base64_encoded: Option<String>,
	mime_type: Option<String>,
}

impl PredictResponse {
	/// Decodes every prediction that carries an image. Predictions without
	/// one (such as filtered results) are skipped.
	fn into_images(self) -> Result<Vec<Image>, Error> {
		self.predictions
			.into_iter()
			.filter_map(|prediction| {
				let payload = prediction.bytes_base64_encoded?;
				let mime_type = prediction.mime_type.unwrap_or_else(|| "image/png".into());

				Some(BASE64.decode(payload).map(|bytes| Image { bytes, mime_type }))
			})
			.collect::<Result<_, _>>()
			.map_err(Error::from)
	}
}

#[async_trait]
impl ImageModel for Imagen {
	async fn generate_images(&self, request: &ImageRequest<'_>) -> Result<Vec<Image>, Error> {
		let token = self.access_token().await?;
		let body = PredictRequest {
			instances: [Instance {
				prompt: request.prompt,
			}],
			parameters: Parameters {
				sample_count: request.count,
				aspect_ratio: request.aspect_ratio,
				negative_prompt: request.negative_prompt,
			},
		};

		tracing::debug!(model = %self.model, "calling image model");

		let response = self
			.client
			.post(self.endpoint())
			.bearer_auth(token)
			.json(&body)
			.send()
			.await
			.map_err(|source| Error::Http {
				provider: PROVIDER,
				source,
			})?;

		let status = response.status();

		if !status.is_success() {
			return Err(Error::Status {
				provider: PROVIDER,
				status,
				body: response.text().await.unwrap_or_default(),
			});
		}

		response
			.json::<PredictResponse>()
			.await
			.map_err(|source| Error::Http {
				provider: PROVIDER,
				source,
			})?
			.into_images()
	}
}
