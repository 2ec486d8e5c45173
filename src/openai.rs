use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Anything that can answer a single system+user exchange with plain text.
pub trait ChatModel {
	fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
	Gpt4oMini,
	Gpt4o,
	Gpt41Mini,
	Gpt41,
}
pub struct Cost {
	pub million_input_tokens: f32,
	pub million_output_tokens: f32,
}

impl Model {
	pub fn to_str(&self) -> &str {
		match self {
			Model::Gpt4oMini => "gpt-4o-mini",
			Model::Gpt4o => "gpt-4o",
			Model::Gpt41Mini => "gpt-4.1-mini",
			Model::Gpt41 => "gpt-4.1",
		}
	}

	/// Api echoes back dated snapshots (`gpt-4o-mini-2024-07-18`), so match on the family.
	pub fn from_str(s: &str) -> Option<Model> {
		match s {
			_ if s.starts_with("gpt-4o-mini") => Some(Model::Gpt4oMini),
			_ if s.starts_with("gpt-4o") => Some(Model::Gpt4o),
			_ if s.starts_with("gpt-4.1-mini") => Some(Model::Gpt41Mini),
			_ if s.starts_with("gpt-4.1") => Some(Model::Gpt41),
			_ => None,
		}
	}

	pub fn cost(&self) -> Cost {
		match self {
			Model::Gpt4oMini => Cost {
				million_input_tokens: 0.15,
				million_output_tokens: 0.6,
			},
			Model::Gpt4o => Cost {
				million_input_tokens: 2.5,
				million_output_tokens: 10.0,
			},
			Model::Gpt41Mini => Cost {
				million_input_tokens: 0.4,
				million_output_tokens: 1.6,
			},
			Model::Gpt41 => Cost {
				million_input_tokens: 2.0,
				million_output_tokens: 8.0,
			},
		}
	}
}

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("API error (status {status}): {message}")]
	Status { status: u16, message: String },

	#[error("API returned no choices")]
	NoChoices,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
	error: ErrorBody,
}
#[derive(Deserialize, Debug)]
struct ErrorBody {
	message: String,
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAi {
	client: Client,
	base_url: String,
	api_key: String,
	model: Model,
}

impl OpenAi {
	pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: Model) -> Result<Self> {
		// No timeout: the call blocks for as long as the api takes.
		let client = Client::builder().timeout(None::<Duration>).build()?;
		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			api_key: api_key.into(),
			model,
		})
	}

	/// Reads `OPENAI_API_KEY` (required) and `OPENAI_BASE_URL` (optional).
	pub fn from_env(model: Model) -> Result<Self> {
		let api_key = config::require_env("OPENAI_API_KEY")?;
		let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
		Self::new(base_url, api_key, model)
	}

	///docs: https://platform.openai.com/docs/api-reference/chat/create
	pub fn ask(&self, system: &str, message: &str) -> Result<Response> {
		let url = format!("{}/chat/completions", self.base_url);

		let mut headers = HeaderMap::new();
		headers.insert(
			AUTHORIZATION,
			HeaderValue::from_str(&format!("Bearer {}", self.api_key)).context("OPENAI_API_KEY is not a valid header value")?,
		);
		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		let payload = json!({
			"model": self.model.to_str(),
			"messages": [
				{
					"role": "system",
					"content": system
				},
				{
					"role": "user",
					"content": message
				}
			]
		});

		debug!(model = self.model.to_str(), %url, "sending chat completion request");
		let response = self.client.post(&url).headers(headers).json(&payload).send()?;

		let status = response.status();
		let response_raw = response.text()?;
		if !status.is_success() {
			let message = serde_json::from_str::<ErrorEnvelope>(&response_raw).map(|e| e.error.message).unwrap_or(response_raw);
			return Err(ApiError::Status {
				status: status.as_u16(),
				message,
			}
			.into());
		}

		let response: Response = serde_json::from_str(&response_raw).context("Failed to parse chat completion response body")?;
		Ok(response)
	}
}

impl ChatModel for OpenAi {
	fn complete(&self, system: &str, user: &str) -> Result<String> {
		let response = self.ask(system, user)?;
		debug!(%response, "chat completion received");
		Ok(response.text()?.to_string())
	}
}

#[allow(dead_code)]
#[derive(Deserialize, Debug)]
pub struct Response {
	id: String,
	model: String,
	choices: Vec<Choice>,
	usage: Option<Usage>,
}
impl Response {
	/// Content of the first choice. A `null` content reads as empty text.
	pub fn text(&self) -> Result<&str, ApiError> {
		let choice = self.choices.first().ok_or(ApiError::NoChoices)?;
		Ok(choice.message.content.as_deref().unwrap_or_default())
	}

	/// Zero when the api did not report usage or the model is unknown.
	pub fn cost_cents(&self) -> f32 {
		let (Some(usage), Some(model)) = (&self.usage, Model::from_str(&self.model)) else {
			return 0.0;
		};
		let cost = model.cost();
		(usage.prompt_tokens as f32 * cost.million_input_tokens + usage.completion_tokens as f32 * cost.million_output_tokens) / 10_000.0
	}
}
impl std::fmt::Display for Response {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Response: {:#?}\nCost (cents): {}", self.text().unwrap_or_default(), self.cost_cents())
	}
}
#[allow(dead_code)]
#[derive(Deserialize, Debug)]
struct Choice {
	message: ChoiceMessage,
	finish_reason: Option<String>,
}
#[allow(dead_code)]
#[derive(Deserialize, Debug)]
struct ChoiceMessage {
	role: String,
	content: Option<String>,
}
#[derive(Deserialize, Debug)]
struct Usage {
	prompt_tokens: u32,
	completion_tokens: u32,
}
