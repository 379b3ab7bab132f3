use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use super::{InferenceSettings, TextGenerator};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Completion client for the Google Generative Language API, used for the
/// question-generation prompt.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    http: Client,
    url: String,
    api_key: String,
    max_retries: u32,
}

impl GeminiGenerator {
    pub fn new(settings: &InferenceSettings) -> Result<Self> {
        if settings.gemini_api_key.trim().is_empty() {
            bail!("Gemini API key must be provided via LEXGUARD_GEMINI_API_KEY");
        }
        let base = settings
            .gemini_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = settings
            .gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base.trim_end_matches('/'),
            model
        );
        let http = Client::builder()
            .user_agent("lexguard/0.3")
            .timeout(Duration::from_secs(settings.timeout_secs.unwrap_or(30)))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self {
            http,
            url,
            api_key: settings.gemini_api_key.clone(),
            max_retries: settings.max_retries,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = GenerateRequest {
            contents: vec![RequestContent {
                role: "user".into(),
                parts: vec![RequestPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let mut attempt = 0u32;
        let mut backoff = Duration::from_millis(200);
        loop {
            let response = self
                .http
                .post(&self.url)
                .query(&[("key", &self.api_key)])
                .json(&payload)
                .send()
                .await;

            let response = match response {
                Ok(resp) => resp,
                Err(err) => {
                    if attempt >= self.max_retries {
                        return Err(err).context("failed to call Gemini generateContent API");
                    }
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(Duration::from_secs(5));
                    attempt += 1;
                    continue;
                }
            };

            if !response.status().is_success() {
                if attempt >= self.max_retries {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    bail!("Gemini API error ({status}): {body}");
                }
                sleep(backoff).await;
                backoff = (backoff * 2).min(Duration::from_secs(5));
                attempt += 1;
                continue;
            }

            let message: GenerateResponse = response
                .json()
                .await
                .context("failed to parse Gemini response")?;
            return message
                .candidates
                .into_iter()
                .flat_map(|candidate| candidate.content.parts)
                .filter_map(|part| part.text)
                .next()
                .ok_or_else(|| anyhow!("Gemini response missing message content"));
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
