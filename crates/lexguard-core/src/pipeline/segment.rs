use once_cell::sync::Lazy;
use regex::Regex;

use super::ParagraphUnit;

/// A line break immediately followed by a `12.`-style numeral is a
/// numbered sub-clause continuation, not a paragraph boundary.
static NUMBERED_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(\d+\.)").expect("numbered-break pattern"));

static HEADING_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\. ").expect("heading-prefix pattern"));

/// Normalize and split raw document text into paragraph units.
///
/// Numbered-list breaks are rejoined to their parent line, then the text
/// is split on line breaks with blank lines dropped. Every surviving line
/// becomes one [`ParagraphUnit`]; scorability is decided later via
/// [`ParagraphUnit::is_scorable`].
pub fn segment(raw_text: &str) -> Vec<ParagraphUnit> {
    let rejoined = NUMBERED_BREAK.replace_all(raw_text, " $1");
    rejoined
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ParagraphUnit::new)
        .collect()
}

/// True for lines that start with a bare numeral-dot prefix (`7. `),
/// treated as heading/number artifacts rather than clause text.
pub(crate) fn is_heading_artifact(text: &str) -> bool {
    HEADING_PREFIX.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_line_breaks_and_trims() {
        let paragraphs = segment("First clause here.\n\n  Second clause here.  \n");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text, "First clause here.");
        assert_eq!(paragraphs[1].text, "Second clause here.");
        assert_eq!(paragraphs[1].word_count, 3);
    }

    #[test]
    fn numbered_breaks_rejoin_their_parent_line() {
        let raw = "Obligations of the parties:\n1. Pay all invoices on time.\n2. Keep records confidential.";
        let paragraphs = segment(raw);
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].text.contains("1. Pay all invoices"));
        assert!(paragraphs[0].text.contains("2. Keep records confidential"));
    }

    #[test]
    fn non_numeral_breaks_stay_separate() {
        let raw = "Clause one stands alone.\nClause two stands alone as well.";
        assert_eq!(segment(raw).len(), 2);
    }

    #[test]
    fn heading_artifacts_are_flagged() {
        assert!(is_heading_artifact("4. Payment schedule and invoicing terms"));
        assert!(!is_heading_artifact("Payment is due within 4. days")); // anchored at start
        assert!(!is_heading_artifact("4.Payment schedule")); // no trailing space
    }

    #[test]
    fn degenerate_input_yields_no_scorable_paragraphs() {
        let paragraphs = segment("Title\nShort line\nAnother");
        assert!(!paragraphs.is_empty());
        assert!(paragraphs.iter().all(|p| !p.is_scorable()));
    }
}
