use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

pub mod aggregate;
pub mod analyzer;
pub mod findings;
pub mod questions;
pub mod score;
pub mod segment;

/// Closed set of clause categories the classifier is asked to rank.
///
/// Declaration order matches the candidate-label order sent to the
/// classifier and the key order of the serialized `categories` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Payment Terms")]
    PaymentTerms,
    #[serde(rename = "Liability & Indemnification")]
    Liability,
    #[serde(rename = "Termination")]
    Termination,
    #[serde(rename = "Confidentiality")]
    Confidentiality,
    #[serde(rename = "Dispute Resolution")]
    DisputeResolution,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::PaymentTerms,
        Category::Liability,
        Category::Termination,
        Category::Confidentiality,
        Category::DisputeResolution,
    ];

    /// Candidate labels in the exact form sent to the zero-shot classifier.
    pub const LABELS: [&'static str; 5] = [
        "Payment Terms",
        "Liability & Indemnification",
        "Termination",
        "Confidentiality",
        "Dispute Resolution",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::PaymentTerms => "Payment Terms",
            Category::Liability => "Liability & Indemnification",
            Category::Termination => "Termination",
            Category::Confidentiality => "Confidentiality",
            Category::DisputeResolution => "Dispute Resolution",
        }
    }

    /// Resolve a classifier label back into the closed category set.
    pub fn from_label(label: &str) -> Option<Category> {
        let trimmed = label.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
    }

    /// Base risk contribution of a clause in this category.
    pub fn base_risk(&self) -> (RiskLevel, f64) {
        match self {
            Category::Termination => (RiskLevel::High, 30.0),
            Category::PaymentTerms => (RiskLevel::Low, 5.0),
            Category::Liability | Category::Confidentiality | Category::DisputeResolution => {
                (RiskLevel::Medium, 15.0)
            }
        }
    }
}

/// Qualitative risk bucket attached to clauses and key findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Unknown => "Unknown",
        }
    }
}

/// One normalized paragraph of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphUnit {
    pub text: String,
    pub word_count: usize,
}

impl ParagraphUnit {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self { text, word_count }
    }

    /// Whether this paragraph participates in clause scoring.
    ///
    /// Very short lines and bare `N. ` heading artifacts are skipped; they
    /// still feed the key-findings scan and the document summary.
    pub fn is_scorable(&self) -> bool {
        self.word_count >= 4 && !segment::is_heading_artifact(&self.text)
    }
}

/// Scoring outcome for a single clause.
#[derive(Debug, Clone, Serialize)]
pub struct RiskRecord {
    pub category: Category,
    pub risk_level: RiskLevel,
    pub bullet_point: String,
    /// Risk points after keyword adjustments, clamped at zero.
    pub score: f64,
}

/// Clauses grouped under one category, in document order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryGroup {
    pub risk_level: RiskLevel,
    pub points: Vec<String>,
}

/// Advisory flag raised by the static keyword rules, independent of the
/// classifier-driven category breakdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KeyFinding {
    pub title: String,
    pub description: String,
    pub risk_level: RiskLevel,
    pub icon: String,
    pub section: String,
}

/// Outcome of the question-generation stage.
///
/// The success arm always carries exactly four questions; any adapter
/// failure or malformed response collapses into the single fallback
/// message. Serializes as a plain array of 4 or 1 strings.
#[derive(Debug, Clone, PartialEq)]
pub enum LegalQuestions {
    Generated([String; 4]),
    Fallback(String),
}

impl LegalQuestions {
    pub const FALLBACK_MESSAGE: &'static str =
        "Error generating legal questions. Please try again later.";

    pub fn fallback() -> Self {
        LegalQuestions::Fallback(Self::FALLBACK_MESSAGE.to_string())
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            LegalQuestions::Generated(questions) => questions.as_slice(),
            LegalQuestions::Fallback(message) => std::slice::from_ref(message),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl Serialize for LegalQuestions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let items = self.as_slice();
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// Complete analysis returned to the caller, serializable to the public
/// JSON shape (`full_summary`, `risk_score`, `categories`, `key_findings`,
/// `legal_questions`).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub full_summary: String,
    pub risk_score: String,
    pub categories: BTreeMap<Category, CategoryGroup>,
    pub key_findings: Vec<KeyFinding>,
    pub legal_questions: LegalQuestions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_category() {
        for (category, label) in Category::ALL.into_iter().zip(Category::LABELS) {
            assert_eq!(category.label(), label);
            assert_eq!(Category::from_label(label), Some(category));
        }
    }

    #[test]
    fn from_label_is_case_insensitive_and_rejects_strangers() {
        assert_eq!(
            Category::from_label("termination"),
            Some(Category::Termination)
        );
        assert_eq!(Category::from_label(" Payment Terms "), Some(Category::PaymentTerms));
        assert_eq!(Category::from_label("Force Majeure"), None);
    }

    #[test]
    fn base_risk_table_matches_policy() {
        assert_eq!(Category::Termination.base_risk(), (RiskLevel::High, 30.0));
        assert_eq!(Category::PaymentTerms.base_risk(), (RiskLevel::Low, 5.0));
        assert_eq!(Category::Liability.base_risk(), (RiskLevel::Medium, 15.0));
        assert_eq!(
            Category::Confidentiality.base_risk(),
            (RiskLevel::Medium, 15.0)
        );
        assert_eq!(
            Category::DisputeResolution.base_risk(),
            (RiskLevel::Medium, 15.0)
        );
    }

    #[test]
    fn scorability_filters_short_and_heading_lines() {
        assert!(!ParagraphUnit::new("Definitions").is_scorable());
        assert!(!ParagraphUnit::new("3. Term and renewal options").is_scorable());
        assert!(ParagraphUnit::new("Either party may terminate this agreement.").is_scorable());
    }

    #[test]
    fn legal_questions_serialize_as_arrays() {
        let generated = LegalQuestions::Generated([
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
        ]);
        assert_eq!(
            serde_json::to_value(&generated).unwrap(),
            serde_json::json!(["a", "b", "c", "d"])
        );

        let fallback = LegalQuestions::fallback();
        assert_eq!(fallback.len(), 1);
        assert!(!generated.is_empty());
        assert!(!fallback.is_empty());
        assert_eq!(
            serde_json::to_value(&fallback).unwrap(),
            serde_json::json!([LegalQuestions::FALLBACK_MESSAGE])
        );
    }

    #[test]
    fn category_map_keys_serialize_as_display_labels() {
        let mut categories = BTreeMap::new();
        categories.insert(
            Category::PaymentTerms,
            CategoryGroup {
                risk_level: RiskLevel::Low,
                points: vec!["Invoices are due within 30 days.".into()],
            },
        );
        let value = serde_json::to_value(&categories).unwrap();
        assert!(value.get("Payment Terms").is_some());
        assert_eq!(value["Payment Terms"]["risk_level"], "Low Risk");
    }
}
