//! Candidate validation and deduplication.

use std::collections::HashSet;
use std::fmt;

use crate::model::{Question, CHOICES_PER_QUESTION};
use crate::traits::RawCandidate;

/// Why a candidate was discarded. Internal only — rejected candidates are
/// dropped and the gap feeds back into the generation retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyText,
    DuplicateText,
    WrongChoiceCount(usize),
    DuplicateChoices,
    AnswerNotInChoices,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyText => write!(f, "empty question text"),
            Rejection::DuplicateText => write!(f, "duplicate question text"),
            Rejection::WrongChoiceCount(n) => {
                write!(f, "expected {CHOICES_PER_QUESTION} choices, got {n}")
            }
            Rejection::DuplicateChoices => write!(f, "choices are not distinct"),
            Rejection::AnswerNotInChoices => write!(f, "answer is not one of the choices"),
        }
    }
}

/// Check a raw candidate against the structural rules and the set of
/// question texts already in the session.
///
/// The caller must add each accepted text to `seen_texts` before validating
/// the next candidate of the same batch, so same-batch duplicates are
/// rejected too. Pure: no side effects beyond the return value.
pub fn validate_candidate(
    candidate: &RawCandidate,
    seen_texts: &HashSet<String>,
) -> Result<Question, Rejection> {
    let text = candidate.question.trim();
    if text.is_empty() {
        return Err(Rejection::EmptyText);
    }
    if seen_texts.contains(text) {
        return Err(Rejection::DuplicateText);
    }
    if candidate.choices.len() != CHOICES_PER_QUESTION {
        return Err(Rejection::WrongChoiceCount(candidate.choices.len()));
    }
    let distinct: HashSet<&str> = candidate.choices.iter().map(String::as_str).collect();
    if distinct.len() != CHOICES_PER_QUESTION {
        return Err(Rejection::DuplicateChoices);
    }
    if !candidate.choices.iter().any(|c| c == &candidate.answer) {
        return Err(Rejection::AnswerNotInChoices);
    }

    Ok(Question {
        text: text.to_string(),
        choices: candidate.choices.clone(),
        answer: candidate.answer.clone(),
        concepts: candidate.concepts.clone(),
        explanation: candidate.explanation.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str) -> RawCandidate {
        RawCandidate {
            question: text.into(),
            choices: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            answer: "4".into(),
            concepts: vec!["arithmetic".into()],
            explanation: "Two plus two equals four.".into(),
        }
    }

    #[test]
    fn accepts_valid_candidate() {
        let question = validate_candidate(&candidate("What is 2 + 2?"), &HashSet::new()).unwrap();
        assert_eq!(question.text, "What is 2 + 2?");
        assert_eq!(question.answer, "4");
        assert_eq!(question.choices.len(), CHOICES_PER_QUESTION);
    }

    #[test]
    fn trims_question_text() {
        let question =
            validate_candidate(&candidate("  What is 2 + 2?  "), &HashSet::new()).unwrap();
        assert_eq!(question.text, "What is 2 + 2?");
    }

    #[test]
    fn rejects_empty_text() {
        assert_eq!(
            validate_candidate(&candidate("   "), &HashSet::new()),
            Err(Rejection::EmptyText)
        );
    }

    #[test]
    fn rejects_seen_text() {
        let seen: HashSet<String> = ["What is 2 + 2?".to_string()].into();
        assert_eq!(
            validate_candidate(&candidate("What is 2 + 2?"), &seen),
            Err(Rejection::DuplicateText)
        );
    }

    #[test]
    fn rejects_wrong_choice_count() {
        let mut short = candidate("Q");
        short.choices.pop();
        assert_eq!(
            validate_candidate(&short, &HashSet::new()),
            Err(Rejection::WrongChoiceCount(3))
        );

        let mut long = candidate("Q");
        long.choices.push("7".into());
        assert_eq!(
            validate_candidate(&long, &HashSet::new()),
            Err(Rejection::WrongChoiceCount(5))
        );
    }

    #[test]
    fn rejects_duplicate_choices() {
        let mut dup = candidate("Q");
        dup.choices[3] = "4".into();
        assert_eq!(
            validate_candidate(&dup, &HashSet::new()),
            Err(Rejection::DuplicateChoices)
        );
    }

    #[test]
    fn rejects_answer_outside_choices() {
        let mut stray = candidate("Q");
        stray.answer = "7".into();
        assert_eq!(
            validate_candidate(&stray, &HashSet::new()),
            Err(Rejection::AnswerNotInChoices)
        );
    }

    #[test]
    fn same_batch_duplicates_rejected_via_seen_set() {
        let mut seen = HashSet::new();
        let first = validate_candidate(&candidate("Q"), &seen).unwrap();
        seen.insert(first.text.clone());
        assert_eq!(
            validate_candidate(&candidate("Q"), &seen),
            Err(Rejection::DuplicateText)
        );
    }
}
