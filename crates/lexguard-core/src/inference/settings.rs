use anyhow::{Context, Result};
use std::collections::HashMap;

/// Environment-driven configuration for the inference adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceSettings {
    pub provider: String,
    pub hf_api_key: String,
    pub hf_endpoint: Option<String>,
    pub classifier_model: Option<String>,
    pub summarizer_model: Option<String>,
    pub gemini_api_key: String,
    pub gemini_endpoint: Option<String>,
    pub gemini_model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: u32,
}

impl InferenceSettings {
    const PROVIDER_ENV: &'static str = "LEXGUARD_PROVIDER";
    const HF_API_KEY_ENV: &'static str = "LEXGUARD_HF_API_KEY";
    const HF_ENDPOINT_ENV: &'static str = "LEXGUARD_HF_ENDPOINT";
    const CLASSIFIER_MODEL_ENV: &'static str = "LEXGUARD_CLASSIFIER_MODEL";
    const SUMMARIZER_MODEL_ENV: &'static str = "LEXGUARD_SUMMARIZER_MODEL";
    const GEMINI_API_KEY_ENV: &'static str = "LEXGUARD_GEMINI_API_KEY";
    const GEMINI_ENDPOINT_ENV: &'static str = "LEXGUARD_GEMINI_ENDPOINT";
    const GEMINI_MODEL_ENV: &'static str = "LEXGUARD_GEMINI_MODEL";
    const TIMEOUT_ENV: &'static str = "LEXGUARD_TIMEOUT_SECS";
    const RETRIES_ENV: &'static str = "LEXGUARD_MAX_RETRIES";

    /// Load settings from environment variables.
    ///
    /// * `LEXGUARD_PROVIDER`       — `hf` (remote, default) or `noop` (offline).
    /// * `LEXGUARD_HF_API_KEY`     — Hugging Face token (required unless noop).
    /// * `LEXGUARD_GEMINI_API_KEY` — Gemini token (required unless noop).
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }

    /// Settings for the fully offline provider; no credentials needed.
    pub fn noop() -> Self {
        Self {
            provider: "noop".to_string(),
            hf_api_key: String::new(),
            hf_endpoint: None,
            classifier_model: None,
            summarizer_model: None,
            gemini_api_key: String::new(),
            gemini_endpoint: None,
            gemini_model: None,
            timeout_secs: None,
            max_retries: 0,
        }
    }

    fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        let provider = vars
            .get(Self::PROVIDER_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "hf".to_string())
            .trim()
            .to_string();
        let offline = provider.eq_ignore_ascii_case("noop");

        let required = |env: &'static str| -> Result<String> {
            vars.get(env)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("environment variable {env} must be set"))
        };
        let optional = |env: &'static str| -> Option<String> {
            vars.get(env).cloned().filter(|v| !v.trim().is_empty())
        };

        let hf_api_key = if offline {
            optional(Self::HF_API_KEY_ENV).unwrap_or_default()
        } else {
            required(Self::HF_API_KEY_ENV)?
        };
        let gemini_api_key = if offline {
            optional(Self::GEMINI_API_KEY_ENV).unwrap_or_default()
        } else {
            required(Self::GEMINI_API_KEY_ENV)?
        };

        let timeout_secs = vars
            .get(Self::TIMEOUT_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok());
        let max_retries = vars
            .get(Self::RETRIES_ENV)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(2);

        Ok(Self {
            provider,
            hf_api_key,
            hf_endpoint: optional(Self::HF_ENDPOINT_ENV),
            classifier_model: optional(Self::CLASSIFIER_MODEL_ENV),
            summarizer_model: optional(Self::SUMMARIZER_MODEL_ENV),
            gemini_api_key,
            gemini_endpoint: optional(Self::GEMINI_ENDPOINT_ENV),
            gemini_model: optional(Self::GEMINI_MODEL_ENV),
            timeout_secs,
            max_retries,
        })
    }
}
