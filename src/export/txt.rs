//! Plain-text reports.

use crate::errors::{AppError, AppResult};
use crate::models::result_summary::format_elapsed;
use crate::models::{Question, ResultSummary};
use chrono::Local;
use std::fmt::Write;

const ANSWER_MARKERS: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Human-readable report of an attempt.
pub fn results_txt(summary: &ResultSummary) -> String {
    let mut report = String::new();
    let rule = "=".repeat(60);

    // Writing into a String cannot fail.
    let _ = writeln!(report, "{}", rule);
    let _ = writeln!(report, "           РЕЗУЛЬТАТЫ ТЕСТА ICEQ");
    let _ = writeln!(report, "{}", rule);
    report.push('\n');

    let taken_at = summary.completed_at.with_timezone(&Local);
    let _ = writeln!(report, "Дата прохождения: {}", taken_at.format("%d.%m.%Y, %H:%M:%S"));
    let _ = writeln!(report, "Общее количество вопросов: {}", summary.total_questions);
    let _ = writeln!(report, "Правильных ответов: {}", summary.correct_count);
    let _ = writeln!(report, "Процент выполнения: {}%", summary.score_percentage);
    let _ = writeln!(
        report,
        "Затраченное время: {}",
        format_elapsed(summary.elapsed_seconds)
    );
    report.push('\n');

    let _ = writeln!(report, "ДЕТАЛЬНЫЙ РАЗБОР:");
    let _ = writeln!(report, "{}", "-".repeat(40));
    report.push('\n');

    for (index, result) in summary.per_question_detail.iter().enumerate() {
        let _ = writeln!(report, "{}. {}", index + 1, result.question);
        let _ = writeln!(
            report,
            "   Ваш ответ: {}",
            result.user_answer.as_deref().unwrap_or("Не отвечено")
        );
        let _ = writeln!(report, "   Правильный ответ: {}", result.correct_answer);
        let _ = writeln!(
            report,
            "   Результат: {}",
            if result.is_correct {
                "✓ Правильно"
            } else {
                "✗ Неправильно"
            }
        );
        if let Some(explanation) = &result.explanation {
            let _ = writeln!(report, "   Объяснение: {}", explanation);
        }
        report.push('\n');
    }

    report
}

/// A test in the numbered text format that the TXT import reads back:
/// `1. prompt`, then `a) answer` lines with `*` after the correct one.
///
/// Fails when a question has more answers than there are markers, or when a
/// wrong answer would read back as correct (a label starting with `+` or
/// ending with `*`).
pub fn test_txt(questions: &[Question]) -> AppResult<String> {
    let mut out = String::new();
    for (index, question) in questions.iter().enumerate() {
        if question.answers.len() > ANSWER_MARKERS.len() {
            return Err(AppError::Validation(format!(
                "Вопрос {}: в TXT можно сохранить не больше {} вариантов ответа",
                index + 1,
                ANSWER_MARKERS.len()
            )));
        }
        let _ = writeln!(out, "{}. {}", index + 1, question.prompt);
        for (answer, marker) in question.answers.iter().zip(ANSWER_MARKERS) {
            let label = answer.label.trim();
            if !answer.is_correct && (label.starts_with('+') || label.ends_with('*')) {
                return Err(AppError::Validation(format!(
                    "Вопрос {}: ответ «{}» нельзя сохранить в TXT",
                    index + 1,
                    label
                )));
            }
            let star = if answer.is_correct { " *" } else { "" };
            let _ = writeln!(out, "{}) {}{}", marker, label, star);
        }
        out.push('\n');
    }
    Ok(out)
}
