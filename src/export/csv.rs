//! CSV exports. Text fields are always quoted, embedded quotes doubled.

use crate::models::{Question, ResultSummary};

pub const RESULTS_HEADER: &str = "Номер,Вопрос,Ваш ответ,Правильный ответ,Результат,Объяснение";
pub const TEST_HEADER: &str = "Вопрос,Правильный ответ,Варианты ответов,Объяснение";

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn results_csv(summary: &ResultSummary) -> String {
    let mut csv = String::from(RESULTS_HEADER);
    csv.push('\n');

    for (index, result) in summary.per_question_detail.iter().enumerate() {
        let row = [
            (index + 1).to_string(),
            quoted(&result.question),
            quoted(result.user_answer.as_deref().unwrap_or("Не отвечено")),
            quoted(&result.correct_answer),
            if result.is_correct {
                "Правильно"
            } else {
                "Неправильно"
            }
            .to_string(),
            quoted(result.explanation.as_deref().unwrap_or("")),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

pub fn test_csv(questions: &[Question]) -> String {
    let mut csv = String::from(TEST_HEADER);
    csv.push('\n');

    for question in questions {
        let correct = question
            .correct_answer()
            .map(|a| a.label.as_str())
            .unwrap_or("");
        let options = question
            .answers
            .iter()
            .map(|a| a.label.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let row = [
            quoted(&question.prompt),
            quoted(correct),
            quoted(&options),
            quoted(question.explanation.as_deref().unwrap_or("")),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}
