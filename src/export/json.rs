//! JSON exports.

use crate::errors::AppResult;
use crate::models::result_summary::format_elapsed;
use crate::models::{Question, QuestionResult, ResultSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const RESULTS_TITLE: &str = "Результаты теста ICEQ";
pub const TEST_TITLE: &str = "ICEQ Тест";

#[derive(Serialize)]
struct ResultsDocument<'a> {
    test_title: &'a str,
    completed_at: DateTime<Utc>,
    summary: SummaryBlock,
    questions: &'a [Question],
    user_answers: &'a [Option<String>],
    detailed_results: &'a [QuestionResult],
}

#[derive(Serialize)]
struct SummaryBlock {
    total_questions: usize,
    correct_answers: usize,
    score_percentage: u32,
    time_spent_seconds: u64,
    time_spent_formatted: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestDocument<'a> {
    title: &'a str,
    date_created: DateTime<Utc>,
    questions: &'a [Question],
}

/// Full dump of an attempt: summary, per-question detail, raw questions and answers.
pub fn results_json(
    summary: &ResultSummary,
    questions: &[Question],
    user_answers: &[Option<String>],
) -> AppResult<String> {
    let document = ResultsDocument {
        test_title: RESULTS_TITLE,
        completed_at: summary.completed_at,
        summary: SummaryBlock {
            total_questions: summary.total_questions,
            correct_answers: summary.correct_count,
            score_percentage: summary.score_percentage,
            time_spent_seconds: summary.elapsed_seconds,
            time_spent_formatted: format_elapsed(summary.elapsed_seconds),
        },
        questions,
        user_answers,
        detailed_results: &summary.per_question_detail,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// A test without answers; loadable again as a ready-made test file.
pub fn test_json(questions: &[Question], created_at: DateTime<Utc>) -> AppResult<String> {
    let document = TestDocument {
        title: TEST_TITLE,
        date_created: created_at,
        questions,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
