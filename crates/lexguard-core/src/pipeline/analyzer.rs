use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use super::aggregate::{group_by_category, normalized_risk_score, summarize_document};
use super::findings::extract_key_findings;
use super::questions::generate_legal_questions;
use super::score::score_paragraph;
use super::segment::segment;
use super::AnalysisResult;
use crate::inference::{Classifier, Summarizer, TextGenerator};

/// Document analysis pipeline: segments the text, scores each eligible
/// clause, aggregates categories and the document summary, runs the
/// advisory rules, and asks for review questions.
///
/// Adapters are injected once at construction and shared read-only across
/// invocations; the pipeline itself holds no per-document state.
pub struct Analyzer {
    classifier: Arc<dyn Classifier>,
    summarizer: Arc<dyn Summarizer>,
    generator: Arc<dyn TextGenerator>,
}

impl Analyzer {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        summarizer: Arc<dyn Summarizer>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            classifier,
            summarizer,
            generator,
        }
    }

    /// Run the full pipeline over one document.
    ///
    /// Classifier or summarizer failures abort the analysis with context
    /// naming the failing stage; only question generation recovers locally
    /// with its fallback message.
    #[instrument(name = "analyze_document", skip(self, legal_text), fields(input_len = legal_text.len()))]
    pub async fn analyze(&self, legal_text: &str) -> Result<AnalysisResult> {
        let paragraphs = segment(legal_text);

        let mut records = Vec::new();
        let mut total_risk_points = 0.0;
        let mut clause_count = 0usize;
        for paragraph in paragraphs.iter().filter(|p| p.is_scorable()) {
            let record = score_paragraph(paragraph, &*self.classifier, &*self.summarizer)
                .await
                .with_context(|| {
                    format!("failed to score clause {}", clause_count + 1)
                })?;
            total_risk_points += record.score;
            clause_count += 1;
            records.push(record);
        }

        let categories = group_by_category(&records);
        let full_summary = summarize_document(legal_text, &*self.summarizer)
            .await
            .context("failed to build the document summary")?;
        let risk_score = normalized_risk_score(total_risk_points, clause_count, legal_text);
        let key_findings = extract_key_findings(&paragraphs);
        let legal_questions = generate_legal_questions(legal_text, &*self.generator).await;

        debug!(
            clauses = clause_count,
            categories = categories.len(),
            findings = key_findings.len(),
            %risk_score,
            "analysis completed"
        );

        Ok(AnalysisResult {
            full_summary,
            risk_score,
            categories,
            key_findings,
            legal_questions,
        })
    }
}
