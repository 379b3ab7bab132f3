mod settings;

pub mod gemini;
pub mod hf;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiGenerator;
pub use hf::{HfClassifier, HfSummarizer};
pub use settings::InferenceSettings;

/// One ranked candidate label from the zero-shot classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub confidence: f32,
}

/// Zero-shot classification service: ranks the candidate labels for a
/// passage, highest confidence first, with at least one entry on success.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>>;
}

/// Abstractive summarization service with caller-supplied length bounds.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, max_len: usize, min_len: usize) -> Result<String>;
}

/// Free-form completion service used for question generation. May fail or
/// return an empty completion; the pipeline recovers locally.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Construct the adapter set selected by the settings.
///
/// The `noop` provider wires the deterministic offline stand-ins; anything
/// else builds the remote Hugging Face and Gemini clients.
pub fn build_adapters(
    settings: &InferenceSettings,
) -> Result<(Arc<dyn Classifier>, Arc<dyn Summarizer>, Arc<dyn TextGenerator>)> {
    if settings.provider.eq_ignore_ascii_case("noop") {
        return Ok((
            Arc::new(NoopClassifier),
            Arc::new(NoopSummarizer),
            Arc::new(NoopGenerator),
        ));
    }
    Ok((
        Arc::new(HfClassifier::new(settings)?),
        Arc::new(HfSummarizer::new(settings)?),
        Arc::new(GeminiGenerator::new(settings)?),
    ))
}

/// Deterministic offline classifier used by tests and the `noop` provider.
///
/// Ranks the requested labels by a crude substring heuristic; ties keep the
/// caller's label order so the output is stable.
#[derive(Debug, Default, Clone)]
pub struct NoopClassifier;

const LABEL_HINTS: &[(&str, &[&str])] = &[
    ("Payment Terms", &["payment", "fee", "invoice", "due", "payable"]),
    ("Liability & Indemnification", &["liab", "indemnif", "damages"]),
    ("Termination", &["terminat"]),
    ("Confidentiality", &["confidential", "non-disclosure", "proprietary"]),
    ("Dispute Resolution", &["dispute", "arbitrat", "governing law"]),
];

#[async_trait]
impl Classifier for NoopClassifier {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>> {
        let lower = text.to_lowercase();
        let mut ranked: Vec<LabelScore> = labels
            .iter()
            .map(|label| {
                let hit = LABEL_HINTS
                    .iter()
                    .find(|(hint_label, _)| hint_label.eq_ignore_ascii_case(label))
                    .map(|(_, hints)| hints.iter().any(|hint| lower.contains(hint)))
                    .unwrap_or(false);
                LabelScore {
                    label: label.to_string(),
                    confidence: if hit { 0.9 } else { 0.05 },
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(ranked)
    }
}

/// Deterministic offline summarizer: truncates to the word budget.
#[derive(Debug, Default, Clone)]
pub struct NoopSummarizer;

#[async_trait]
impl Summarizer for NoopSummarizer {
    async fn summarize(&self, text: &str, max_len: usize, _min_len: usize) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= max_len {
            return Ok(words.join(" "));
        }
        Ok(words[..max_len].join(" "))
    }
}

/// Deterministic offline generator: a canned four-question review list.
#[derive(Debug, Default, Clone)]
pub struct NoopGenerator;

#[async_trait]
impl TextGenerator for NoopGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok("1. Are the termination notice periods mutual for both parties?\n\
            2. Is the liability cap proportionate to the contract value?\n\
            3. Are payment deadlines and late-fee triggers unambiguous?\n\
            4. Does the confidentiality obligation survive termination?"
            .to_string())
    }
}
