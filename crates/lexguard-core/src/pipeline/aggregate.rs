use std::collections::BTreeMap;

use anyhow::{Context, Result};

use super::{Category, CategoryGroup, RiskRecord};
use crate::inference::Summarizer;

/// Word budget of one whole-document summarization chunk.
pub const CHUNK_WORDS: usize = 200;

/// Worst-case base points of a single clause; the denominator of the
/// normalization formula.
pub const MAX_CLAUSE_POINTS: f64 = 30.0;

const SUMMARY_MAX_LEN: usize = 100;
const SUMMARY_MIN_LEN: usize = 30;

/// Fold scored clauses into per-category groups. The first clause of a
/// category fixes the group's risk level; bullet points keep document
/// order.
pub fn group_by_category(records: &[RiskRecord]) -> BTreeMap<Category, CategoryGroup> {
    let mut groups: BTreeMap<Category, CategoryGroup> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.category)
            .or_insert_with(|| CategoryGroup {
                risk_level: record.risk_level,
                points: Vec::new(),
            })
            .points
            .push(record.bullet_point.clone());
    }
    groups
}

/// Split raw text into word-count-bounded chunks; the last chunk may be
/// shorter.
pub fn chunk_words(text: &str, chunk_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_words.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}

/// Summarize the whole raw document chunk by chunk and stitch the pieces
/// back together in chunk order.
pub async fn summarize_document(raw_text: &str, summarizer: &dyn Summarizer) -> Result<String> {
    let mut full_summary = String::new();
    for (idx, chunk) in chunk_words(raw_text, CHUNK_WORDS).into_iter().enumerate() {
        let summary = summarizer
            .summarize(&chunk, SUMMARY_MAX_LEN, SUMMARY_MIN_LEN)
            .await
            .with_context(|| format!("document summarization failed on chunk {idx}"))?;
        full_summary.push_str(&summary);
        full_summary.push(' ');
    }
    Ok(full_summary.trim().replace('\n', " "))
}

/// Normalize accumulated risk points into the display score.
///
/// Documents that self-identify as non-binding take a 0.9 discount on the
/// total. Zero scored clauses fixes the percentage at 100. The formula is
/// deliberately unclamped; heavily adjusted totals can print below zero.
pub fn normalized_risk_score(total_points: f64, clause_count: usize, raw_text: &str) -> String {
    let lower = raw_text.to_lowercase();
    let mut total = total_points;
    if lower.contains("non-binding") || lower.contains("memorandum of understanding") {
        total *= 0.9;
    }

    let percent = if clause_count == 0 {
        100
    } else {
        // Ties round to even: the discount can land exact .5 midpoints.
        (100.0 - (total / (clause_count as f64 * MAX_CLAUSE_POINTS)) * 100.0).round_ties_even()
            as i64
    };
    format!("{percent}/100 (Higher scores indicate lower risk)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::NoopSummarizer;
    use crate::pipeline::RiskLevel;
    use futures::executor::block_on;

    fn record(category: Category, bullet: &str, score: f64) -> RiskRecord {
        let (risk_level, _) = category.base_risk();
        RiskRecord {
            category,
            risk_level,
            bullet_point: bullet.to_string(),
            score,
        }
    }

    #[test]
    fn grouping_preserves_document_order_within_a_category() {
        let records = vec![
            record(Category::PaymentTerms, "first payment point", 5.0),
            record(Category::Termination, "termination point", 30.0),
            record(Category::PaymentTerms, "second payment point", 8.0),
        ];
        let groups = group_by_category(&records);
        assert_eq!(groups.len(), 2);
        let payment = &groups[&Category::PaymentTerms];
        assert_eq!(payment.risk_level, RiskLevel::Low);
        assert_eq!(
            payment.points,
            vec!["first payment point", "second payment point"]
        );
    }

    #[test]
    fn chunking_bounds_every_chunk_but_the_last() {
        let words = vec!["word"; 450].join(" ");
        let chunks = chunk_words(&words, CHUNK_WORDS);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split_whitespace().count(), 200);
        assert_eq!(chunks[2].split_whitespace().count(), 50);
    }

    #[test]
    fn document_summary_joins_chunks_in_order() {
        let words = vec!["alpha"; 250].join(" ");
        let summary = block_on(summarize_document(&words, &NoopSummarizer)).unwrap();
        assert!(!summary.contains('\n'));
        assert!(!summary.ends_with(' '));
        // Two chunks, each truncated to the 100-word budget.
        assert_eq!(summary.split_whitespace().count(), 150);
    }

    #[test]
    fn worked_example_normalizes_to_45() {
        // Payment clause 5 + 3 + 5 = 13, termination clause 30 - 10 = 20.
        let score = normalized_risk_score(33.0, 2, "binding services agreement");
        assert_eq!(score, "45/100 (Higher scores indicate lower risk)");
    }

    #[test]
    fn zero_clauses_pin_the_score_at_100() {
        assert_eq!(
            normalized_risk_score(0.0, 0, "Headings\nOnly"),
            "100/100 (Higher scores indicate lower risk)"
        );
    }

    #[test]
    fn non_binding_documents_take_the_discount() {
        // 0.9 * 30 = 27 → 100 - 27/30*100 = 10.
        let score = normalized_risk_score(30.0, 1, "This memorandum of understanding is draft.");
        assert_eq!(score, "10/100 (Higher scores indicate lower risk)");
        let undiscounted = normalized_risk_score(30.0, 1, "This services agreement is binding.");
        assert_eq!(undiscounted, "0/100 (Higher scores indicate lower risk)");
    }

    #[test]
    fn midpoint_percentages_round_to_even() {
        // 0.9 * 13 = 11.7 over two clauses → 80.5, which rounds down to even.
        let score = normalized_risk_score(13.0, 2, "this non-binding letter of intent");
        assert_eq!(score, "80/100 (Higher scores indicate lower risk)");
        // 0.9 * 33 = 29.7 over two clauses → 50.5.
        let score = normalized_risk_score(33.0, 2, "memorandum of understanding draft");
        assert_eq!(score, "50/100 (Higher scores indicate lower risk)");
    }

    #[test]
    fn formula_is_not_clamped_below_zero() {
        let score = normalized_risk_score(40.0, 1, "binding");
        assert_eq!(score, "-33/100 (Higher scores indicate lower risk)");
    }
}
