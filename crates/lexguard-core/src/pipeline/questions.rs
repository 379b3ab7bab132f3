use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::LegalQuestions;
use crate::inference::TextGenerator;

/// Leading list markup on a generated line: whitespace, numerals, dots,
/// parens, colons, dashes, slashes.
static LIST_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\d.):/\-]+").expect("list-markup pattern"));

const QUESTION_COUNT: usize = 4;

fn build_prompt(legal_text: &str) -> String {
    format!(
        "You are a legal expert. Read the following legal agreement carefully:\n\n\
         {legal_text}\n\n\
         Suggest exactly 4 specific, practical questions that a lawyer should ask to improve this agreement.\n\
         Only provide the questions as a numbered list. Do not include any answers, explanations, or extra text.\n\n\
         Questions:"
    )
}

fn clean_line(line: &str) -> String {
    LIST_MARKUP.replace(line, "").replace('/', "").trim().to_string()
}

/// Ask the completion service for exactly four review questions.
///
/// Never fails: adapter errors, blank completions, and completions that
/// clean down to fewer than four lines all collapse into the single-item
/// fallback, logged on the way.
pub async fn generate_legal_questions(
    legal_text: &str,
    generator: &dyn TextGenerator,
) -> LegalQuestions {
    let prompt = build_prompt(legal_text);
    let completion = match generator.complete(&prompt).await {
        Ok(completion) => completion,
        Err(err) => {
            warn!(error = %err, "question generation failed, using fallback");
            return LegalQuestions::fallback();
        }
    };
    if completion.trim().is_empty() {
        warn!("question generation returned a blank completion, using fallback");
        return LegalQuestions::fallback();
    }

    let mut questions: Vec<String> = completion
        .lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect();
    if questions.len() < QUESTION_COUNT {
        warn!(
            returned = questions.len(),
            expected = QUESTION_COUNT,
            "question generation returned too few questions, using fallback"
        );
        return LegalQuestions::fallback();
    }
    questions.truncate(QUESTION_COUNT);
    match <[String; QUESTION_COUNT]>::try_from(questions) {
        Ok(questions) => LegalQuestions::Generated(questions),
        Err(_) => LegalQuestions::fallback(),
    }
}
