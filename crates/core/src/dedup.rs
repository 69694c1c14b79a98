use crate::models::Question;
use std::collections::HashSet;

/// The dedup identity of a question: a prefix of its canonical text plus the
/// page it came from. Overlapping boundary-pattern families emit the same
/// question with different trailing content, so only the prefix is trusted.
fn identity_key(question: &Question, prefix_chars: usize) -> (String, u32) {
    let prefix: String = question.text_clean.chars().take(prefix_chars).collect();
    (prefix.to_lowercase(), question.page)
}

/// Collapses near-identical spans to one record per question, first
/// occurrence winning, then assigns final 1-based ordinals. Idempotent:
/// running it over its own output changes nothing but re-confirms ordinals.
pub fn dedup_questions(questions: Vec<Question>, prefix_chars: usize) -> Vec<Question> {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for question in questions {
        if seen.insert(identity_key(&question, prefix_chars)) {
            kept.push(question);
        }
    }

    for (index, question) in kept.iter_mut().enumerate() {
        question.ordinal = (index + 1) as u32;
    }

    kept
}
