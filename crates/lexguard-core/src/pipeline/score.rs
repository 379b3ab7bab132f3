use anyhow::{anyhow, Context, Result};
use tracing::trace;

use super::{Category, ParagraphUnit, RiskRecord};
use crate::inference::{Classifier, Summarizer};

/// Paragraphs longer than this many words are compressed before becoming
/// bullet points.
pub const SUMMARY_WORD_THRESHOLD: usize = 40;

/// One category-gated keyword adjustment. The delta applies once if any of
/// the keywords occurs in the lower-cased clause text; groups are checked
/// independently, so several may stack on the same clause.
#[derive(Debug, Clone, Copy)]
pub struct KeywordAdjustment {
    pub category: Category,
    pub delta: f64,
    pub keywords: &'static [&'static str],
}

pub const KEYWORD_ADJUSTMENTS: &[KeywordAdjustment] = &[
    KeywordAdjustment {
        category: Category::Termination,
        delta: -10.0,
        keywords: &["with notice", "prior notice"],
    },
    KeywordAdjustment {
        category: Category::Termination,
        delta: 10.0,
        keywords: &["immediate termination"],
    },
    KeywordAdjustment {
        category: Category::PaymentTerms,
        delta: 5.0,
        keywords: &["penalty", "late fee"],
    },
    KeywordAdjustment {
        category: Category::PaymentTerms,
        delta: 3.0,
        keywords: &["due upon receipt"],
    },
    KeywordAdjustment {
        category: Category::Confidentiality,
        delta: -5.0,
        keywords: &["no obligation", "not liable"],
    },
];

/// Sum of the adjustment deltas triggered for this category on the
/// lower-cased clause text.
pub fn keyword_adjustment(category: Category, lower_text: &str) -> f64 {
    KEYWORD_ADJUSTMENTS
        .iter()
        .filter(|adjustment| adjustment.category == category)
        .filter(|adjustment| {
            adjustment
                .keywords
                .iter()
                .any(|keyword| lower_text.contains(keyword))
        })
        .map(|adjustment| adjustment.delta)
        .sum()
}

/// Classify and score a single clause.
///
/// The top-ranked label decides the category and base points; keyword
/// adjustments are applied additively and the result is clamped at zero.
/// Long clauses are summarized into their bullet point, short ones pass
/// through verbatim.
pub async fn score_paragraph(
    paragraph: &ParagraphUnit,
    classifier: &dyn Classifier,
    summarizer: &dyn Summarizer,
) -> Result<RiskRecord> {
    let ranked = classifier
        .classify(&paragraph.text, &Category::LABELS)
        .await
        .context("clause classification failed")?;
    let top = ranked
        .first()
        .ok_or_else(|| anyhow!("classifier returned an empty ranking"))?;
    let category = Category::from_label(&top.label).ok_or_else(|| {
        anyhow!(
            "classifier returned label `{}` outside the candidate set",
            top.label
        )
    })?;

    let bullet_point = if paragraph.word_count > SUMMARY_WORD_THRESHOLD {
        let max_len = (paragraph.word_count + 20).min(60);
        summarizer
            .summarize(&paragraph.text, max_len, 10)
            .await
            .context("clause summarization failed")?
    } else {
        paragraph.text.clone()
    };

    let (risk_level, base) = category.base_risk();
    let adjustment = keyword_adjustment(category, &paragraph.text.to_lowercase());
    let score = (base + adjustment).max(0.0);
    trace!(
        category = category.label(),
        confidence = top.confidence,
        base,
        adjustment,
        score,
        "scored clause"
    );

    Ok(RiskRecord {
        category,
        risk_level,
        bullet_point,
        score,
    })
}
