use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use thiserror::Error;

use super::{KeyFinding, ParagraphUnit, RiskLevel};

/// Static advisory rule: fires at most once per document when any of its
/// keywords occurs in any paragraph.
#[derive(Debug, Clone, Copy)]
pub struct FindingRule {
    pub title: &'static str,
    pub keywords: &'static [&'static str],
    pub risk_level: RiskLevel,
    pub icon: &'static str,
    pub section: &'static str,
    pub description: &'static str,
}

/// The advisory rule table, checked in order against every paragraph.
///
/// Keywords are matched literally against the lower-cased paragraph text,
/// so a keyword carrying upper-case characters (`IP`) never fires.
pub const FINDING_RULES: &[FindingRule] = &[
    FindingRule {
        title: "Broad Termination Clause",
        keywords: &["terminate", "termination", "notice"],
        risk_level: RiskLevel::High,
        icon: "🔴",
        section: "Section 8.2",
        description: "Agreement allows broad termination clauses which may result in early contract cancellation.",
    },
    FindingRule {
        title: "Limited Liability Cap",
        keywords: &["liability", "limited liability", "liability cap"],
        risk_level: RiskLevel::Medium,
        icon: "🟡",
        section: "Section 12.1",
        description: "Liability limits are present, potentially capping damages recoverable under this agreement.",
    },
    FindingRule {
        title: "Clear Payment Terms",
        keywords: &["payment", "fee", "invoice"],
        risk_level: RiskLevel::Low,
        icon: "🟢",
        section: "Section 4",
        description: "Clear payment terms are defined, reducing payment-related ambiguities.",
    },
    FindingRule {
        title: "IP Ownership Ambiguity",
        keywords: &["intellectual property", "IP", "ownership"],
        risk_level: RiskLevel::Medium,
        icon: "🟡",
        section: "Section 9.3",
        description: "Intellectual Property (IP) ownership clauses may lack clarity, review is recommended.",
    },
];

/// Errors emitted while validating the advisory rule table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleValidationError {
    #[error("finding rule title must not be blank")]
    EmptyTitle,
    #[error("finding rule `{title}` must declare at least one keyword")]
    NoKeywords { title: String },
    #[error("finding rule `{title}` has a blank keyword")]
    EmptyKeyword { title: String },
}

impl FindingRule {
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.title.trim().is_empty() {
            return Err(RuleValidationError::EmptyTitle);
        }
        if self.keywords.is_empty() {
            return Err(RuleValidationError::NoKeywords {
                title: self.title.to_string(),
            });
        }
        if self.keywords.iter().any(|keyword| keyword.trim().is_empty()) {
            return Err(RuleValidationError::EmptyKeyword {
                title: self.title.to_string(),
            });
        }
        Ok(())
    }
}

// One automaton over every keyword, with a parallel pattern-index → rule
// mapping, built once.
static KEYWORD_AUTOMATON: Lazy<(AhoCorasick, Vec<usize>)> = Lazy::new(|| {
    let mut patterns = Vec::new();
    let mut rule_of_pattern = Vec::new();
    for (rule_idx, rule) in FINDING_RULES.iter().enumerate() {
        for keyword in rule.keywords {
            patterns.push(*keyword);
            rule_of_pattern.push(rule_idx);
        }
    }
    let automaton = AhoCorasick::new(&patterns).expect("finding keywords compile");
    (automaton, rule_of_pattern)
});

/// Scan every paragraph (scorable or not) against the rule table and emit
/// at most one [`KeyFinding`] per rule, in table order.
pub fn extract_key_findings(paragraphs: &[ParagraphUnit]) -> Vec<KeyFinding> {
    let (automaton, rule_of_pattern) = &*KEYWORD_AUTOMATON;
    let mut matched = vec![false; FINDING_RULES.len()];

    for paragraph in paragraphs {
        let lower = paragraph.text.to_lowercase();
        for mat in automaton.find_iter(&lower) {
            matched[rule_of_pattern[mat.pattern().as_usize()]] = true;
        }
        if matched.iter().all(|hit| *hit) {
            break;
        }
    }

    FINDING_RULES
        .iter()
        .zip(&matched)
        .filter(|(_, hit)| **hit)
        .map(|(rule, _)| KeyFinding {
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            risk_level: rule.risk_level,
            icon: rule.icon.to_string(),
            section: rule.section.to_string(),
        })
        .collect()
}
