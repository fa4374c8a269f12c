use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{AnswerKey, QuestionId, SkillLevel};

/// Outcome of checking one key entry against the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerCheck {
    pub question_id: QuestionId,
    pub correct_answer: String,
    pub submitted: Option<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSheet {
    pub score: u32,
    pub total: u32,
    pub checks: Vec<AnswerCheck>,
}

/// Score `answers` against every entry of `key`.
///
/// The total is the size of the key, not of the submission. Answers are looked up
/// by the decimal question id; a missing answer counts as incorrect.
pub fn score(key: &AnswerKey, answers: &BTreeMap<String, String>) -> ScoreSheet {
    let checks: Vec<AnswerCheck> = key
        .iter()
        .map(|(question_id, correct)| {
            let submitted = answers.get(&question_id.to_string()).cloned();
            let is_correct = submitted
                .as_deref()
                .is_some_and(|answer| answers_match(answer, correct));
            AnswerCheck {
                question_id,
                correct_answer: correct.to_string(),
                submitted,
                is_correct,
            }
        })
        .collect();

    let score = checks.iter().filter(|check| check.is_correct).count() as u32;
    ScoreSheet {
        score,
        total: checks.len() as u32,
        checks,
    }
}

/// Case-insensitive exact comparison. Whitespace is significant.
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    submitted
        .chars()
        .flat_map(char::to_lowercase)
        .eq(correct.chars().flat_map(char::to_lowercase))
}

/// Map a score to a skill band. A score sitting exactly on the 25% or 75% line
/// belongs to the lower band; an empty test is Beginner.
pub fn classify(score: u32, total: u32) -> SkillLevel {
    if total == 0 {
        return SkillLevel::Beginner;
    }

    // score <= 0.25 * total and score <= 0.75 * total, kept in integers.
    let score = u64::from(score) * 4;
    let total = u64::from(total);
    if score <= total {
        SkillLevel::Beginner
    } else if score <= total * 3 {
        SkillLevel::Intermediate
    } else {
        SkillLevel::Advanced
    }
}
