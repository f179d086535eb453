//! Scoring of a finished attempt.

use super::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome for a single question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total_questions: usize,
    pub correct_count: usize,
    pub score_percentage: u32,
    pub elapsed_seconds: u64,
    pub completed_at: DateTime<Utc>,
    pub per_question_detail: Vec<QuestionResult>,
}

impl ResultSummary {
    pub fn time_spent_formatted(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    pub fn incorrect_count(&self) -> usize {
        self.total_questions - self.correct_count
    }
}

/// Scores `user_answers` against `questions`.
///
/// A question is correct when the chosen label equals the label of the answer
/// flagged correct. Unanswered questions, and answers missing from the slice,
/// count as incorrect.
pub fn score(
    questions: &[Question],
    user_answers: &[Option<String>],
    elapsed_seconds: u64,
    completed_at: DateTime<Utc>,
) -> ResultSummary {
    let per_question_detail: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let user_answer = user_answers.get(i).cloned().flatten();
            let correct_answer = question
                .correct_answer()
                .map(|a| a.label.clone())
                .unwrap_or_default();
            let is_correct = question.correct_answer().is_some()
                && user_answer.as_deref() == Some(correct_answer.as_str());

            QuestionResult {
                question: question.prompt.clone(),
                user_answer,
                correct_answer,
                is_correct,
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    let total_questions = questions.len();
    let correct_count = per_question_detail.iter().filter(|r| r.is_correct).count();

    ResultSummary {
        total_questions,
        correct_count,
        score_percentage: percentage(correct_count, total_questions),
        elapsed_seconds,
        completed_at,
        per_question_detail,
    }
}

/// `round(correct / total * 100)`, 0 for an empty test.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// "M мин S сек", the format used on the results screen and in exports.
pub fn format_elapsed(total_seconds: u64) -> String {
    format!("{} мин {} сек", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Answer;
    use chrono::TimeZone;

    fn questions() -> Vec<Question> {
        vec![
            Question::new(
                "Q1",
                vec![Answer::new("a", true), Answer::new("b", false)],
            ),
            Question::new(
                "Q2",
                vec![Answer::new("c", false), Answer::new("d", true)],
            )
            .with_explanation("d is right"),
        ]
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_one_correct_one_unanswered() {
        let summary = score(&questions(), &[Some("a".into()), None], 75, at());

        assert_eq!(summary.correct_count, 1);
        assert_eq!(summary.score_percentage, 50);
        let q2 = &summary.per_question_detail[1];
        assert_eq!(q2.user_answer, None);
        assert!(!q2.is_correct);
        assert_eq!(q2.correct_answer, "d");
        assert_eq!(q2.explanation.as_deref(), Some("d is right"));
    }

    #[test]
    fn test_no_answers_scores_zero() {
        let summary = score(&questions(), &[None, None], 0, at());

        assert_eq!(summary.score_percentage, 0);
        assert!(summary.per_question_detail.iter().all(|r| !r.is_correct));
    }

    #[test]
    fn test_short_answer_slice_does_not_panic() {
        let summary = score(&questions(), &[], 0, at());
        assert_eq!(summary.correct_count, 0);
        assert_eq!(summary.per_question_detail.len(), 2);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let answers = vec![Some("b".to_string()), Some("d".to_string())];
        let first = score(&questions(), &answers, 10, at());
        let second = score(&questions(), &answers, 10, at());

        assert_eq!(first.score_percentage, second.score_percentage);
        assert_eq!(first.per_question_detail, second.per_question_detail);
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(75), "1 мин 15 сек");
        assert_eq!(format_elapsed(0), "0 мин 0 сек");
    }
}
