use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use super::{Classifier, InferenceSettings, LabelScore, Summarizer};

const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
const DEFAULT_CLASSIFIER_MODEL: &str = "facebook/bart-large-mnli";
const DEFAULT_SUMMARIZER_MODEL: &str = "facebook/bart-large-cnn";

/// Zero-shot classification client for the Hugging Face Inference API.
#[derive(Debug, Clone)]
pub struct HfClassifier {
    http: Client,
    url: String,
    api_key: String,
    max_retries: u32,
}

impl HfClassifier {
    pub fn new(settings: &InferenceSettings) -> Result<Self> {
        let url = model_url(
            settings,
            settings
                .classifier_model
                .as_deref()
                .unwrap_or(DEFAULT_CLASSIFIER_MODEL),
        )?;
        Ok(Self {
            http: build_http(settings)?,
            url,
            api_key: settings.hf_api_key.clone(),
            max_retries: settings.max_retries,
        })
    }
}

#[async_trait]
impl Classifier for HfClassifier {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>> {
        let payload = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
            },
        };
        let response = post_with_retry(
            &self.http,
            &self.url,
            &self.api_key,
            &payload,
            self.max_retries,
        )
        .await
        .context("failed to call zero-shot classification API")?;

        let body: ZeroShotResponse = response
            .json()
            .await
            .context("failed to parse zero-shot classification response")?;
        if body.labels.is_empty() || body.labels.len() != body.scores.len() {
            bail!("classification response carried no ranked labels");
        }
        Ok(body
            .labels
            .into_iter()
            .zip(body.scores)
            .map(|(label, confidence)| LabelScore { label, confidence })
            .collect())
    }
}

/// Summarization client for the Hugging Face Inference API.
#[derive(Debug, Clone)]
pub struct HfSummarizer {
    http: Client,
    url: String,
    api_key: String,
    max_retries: u32,
}

impl HfSummarizer {
    pub fn new(settings: &InferenceSettings) -> Result<Self> {
        let url = model_url(
            settings,
            settings
                .summarizer_model
                .as_deref()
                .unwrap_or(DEFAULT_SUMMARIZER_MODEL),
        )?;
        Ok(Self {
            http: build_http(settings)?,
            url,
            api_key: settings.hf_api_key.clone(),
            max_retries: settings.max_retries,
        })
    }
}

#[async_trait]
impl Summarizer for HfSummarizer {
    async fn summarize(&self, text: &str, max_len: usize, min_len: usize) -> Result<String> {
        let payload = SummarizationRequest {
            inputs: text,
            parameters: SummarizationParameters {
                max_length: max_len,
                min_length: min_len,
                do_sample: false,
            },
        };
        let response = post_with_retry(
            &self.http,
            &self.url,
            &self.api_key,
            &payload,
            self.max_retries,
        )
        .await
        .context("failed to call summarization API")?;

        let body: Vec<SummarizationResponse> = response
            .json()
            .await
            .context("failed to parse summarization response")?;
        body.into_iter()
            .next()
            .map(|entry| entry.summary_text)
            .ok_or_else(|| anyhow!("summarization response carried no summary"))
    }
}

fn build_http(settings: &InferenceSettings) -> Result<Client> {
    Client::builder()
        .user_agent("lexguard/0.3")
        .timeout(Duration::from_secs(settings.timeout_secs.unwrap_or(30)))
        .build()
        .context("failed to build inference HTTP client")
}

fn model_url(settings: &InferenceSettings, model: &str) -> Result<String> {
    if settings.hf_api_key.trim().is_empty() {
        bail!("Hugging Face API key must be provided via LEXGUARD_HF_API_KEY");
    }
    let base = settings
        .hf_endpoint
        .clone()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    Ok(format!("{}/models/{}", base.trim_end_matches('/'), model))
}

/// POST the payload, retrying transport errors and non-success statuses
/// with capped exponential backoff. The hosted API routinely answers 503
/// while a model is loading.
async fn post_with_retry<T: Serialize>(
    http: &Client,
    url: &str,
    api_key: &str,
    payload: &T,
    max_retries: u32,
) -> Result<reqwest::Response> {
    let mut attempt = 0u32;
    let mut backoff = Duration::from_millis(200);
    loop {
        let response = http
            .post(url)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(err) => {
                if attempt >= max_retries {
                    return Err(err).context("inference request failed");
                }
                sleep(backoff).await;
                backoff = (backoff * 2).min(Duration::from_secs(5));
                attempt += 1;
                continue;
            }
        };

        if !response.status().is_success() {
            if attempt >= max_retries {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                bail!("inference API error ({status}): {body}");
            }
            sleep(backoff).await;
            backoff = (backoff * 2).min(Duration::from_secs(5));
            attempt += 1;
            continue;
        }

        return Ok(response);
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummarizationParameters,
}

#[derive(Serialize)]
struct SummarizationParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Deserialize)]
struct SummarizationResponse {
    summary_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Category;
    use httpmock::prelude::*;
    use serde_json::json;

    fn settings(endpoint: String) -> InferenceSettings {
        let mut settings = InferenceSettings::noop();
        settings.provider = "hf".into();
        settings.hf_api_key = "hf-test".into();
        settings.hf_endpoint = Some(endpoint);
        settings.timeout_secs = Some(5);
        settings
    }

    #[tokio::test]
    #[ignore = "requires loopback networking"]
    async fn classify_parses_ranked_labels() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/facebook/bart-large-mnli")
                .header("authorization", "Bearer hf-test");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "sequence": "Either party may terminate this agreement.",
                    "labels": ["Termination", "Payment Terms"],
                    "scores": [0.91, 0.04]
                }));
        });

        let classifier = HfClassifier::new(&settings(server.base_url())).unwrap();
        let ranked = classifier
            .classify(
                "Either party may terminate this agreement.",
                &Category::LABELS,
            )
            .await
            .unwrap();
        assert_eq!(ranked[0].label, "Termination");
        assert!((ranked[0].confidence - 0.91).abs() < f32::EPSILON);
        mock.assert();
    }

    #[tokio::test]
    #[ignore = "requires loopback networking"]
    async fn classify_retries_model_loading_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/models/facebook/bart-large-mnli");
            then.status(503);
        });

        let mut cfg = settings(server.base_url());
        cfg.max_retries = 1;
        let classifier = HfClassifier::new(&cfg).unwrap();
        let err = classifier
            .classify("text", &Category::LABELS)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("classification"));
        mock.assert_hits(2);
    }

    #[tokio::test]
    #[ignore = "requires loopback networking"]
    async fn summarize_returns_first_summary() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/models/facebook/bart-large-cnn");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([{"summary_text": "Condensed clause."}]));
        });

        let summarizer = HfSummarizer::new(&settings(server.base_url())).unwrap();
        let summary = summarizer.summarize("long clause text", 60, 10).await.unwrap();
        assert_eq!(summary, "Condensed clause.");
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let mut cfg = InferenceSettings::noop();
        cfg.provider = "hf".into();
        let err = HfClassifier::new(&cfg).unwrap_err();
        assert!(err.to_string().contains("LEXGUARD_HF_API_KEY"));
    }
}
