//! Ready-made test files: JSON (`{"questions": [...]}` or a bare array) and
//! the numbered TXT format.
//!
//! ```text
//! 1. Какая планета самая большая?
//! a) Марс
//! b) Юпитер *
//! ```
//!
//! A `*` or `+` anywhere on an answer line marks it correct.

use crate::errors::{AppError, AppResult};
use crate::models::tier::MAX_TEST_FILE_BYTES;
use crate::models::{Answer, Question};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestFileKind {
    Json,
    Txt,
}

impl TestFileKind {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(TestFileKind::Json),
            Some("txt") => Ok(TestFileKind::Txt),
            _ => Err(AppError::Validation(
                "Поддерживаются только JSON и TXT файлы".to_string(),
            )),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TestDocument {
    Wrapped { questions: Vec<Question> },
    Bare(Vec<Question>),
}

/// Reads and parses a test file after checking its extension and size.
pub fn load_test_file(path: &Path) -> AppResult<Vec<Question>> {
    let kind = TestFileKind::from_path(path)?;

    let size = fs::metadata(path)?.len();
    if size > MAX_TEST_FILE_BYTES {
        return Err(AppError::Validation(
            "Файл слишком большой. Максимум 1 МБ".to_string(),
        ));
    }

    let content = fs::read_to_string(path)?;
    let questions = parse_test(kind, &content)?;
    log::info!(
        "Loaded {} questions from {}",
        questions.len(),
        path.display()
    );
    Ok(questions)
}

pub fn parse_test(kind: TestFileKind, content: &str) -> AppResult<Vec<Question>> {
    let questions = match kind {
        TestFileKind::Json => parse_json_test(content)?,
        TestFileKind::Txt => parse_txt_test(content),
    };

    let well_formed = !questions.is_empty()
        && questions
            .iter()
            .all(|q| !q.prompt.is_empty() && !q.answers.is_empty() && q.correct_answer().is_some());
    if !well_formed {
        return Err(AppError::Validation(
            "Неверный формат файла теста".to_string(),
        ));
    }
    Ok(questions)
}

pub fn parse_json_test(content: &str) -> AppResult<Vec<Question>> {
    let document: TestDocument = serde_json::from_str(content)
        .map_err(|e| AppError::Validation(format!("Неверный формат файла теста: {}", e)))?;
    Ok(match document {
        TestDocument::Wrapped { questions } => questions,
        TestDocument::Bare(questions) => questions,
    })
}

/// Lines that fit neither pattern are ignored, as are answers before the first question.
pub fn parse_txt_test(content: &str) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut current: Option<Question> = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(prompt) = strip_question_number(line) {
            if let Some(done) = current.take() {
                questions.push(done);
            }
            current = Some(Question::new(prompt, Vec::new()));
        } else if let Some(rest) = strip_answer_marker(line) {
            if let Some(question) = current.as_mut() {
                let (label, is_correct) = split_correct_flag(rest);
                question.answers.push(Answer::new(label, is_correct));
            }
        }
    }

    if let Some(done) = current {
        questions.push(done);
    }
    questions
}

/// `12. text` → `text`
fn strip_question_number(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.').map(str::trim_start)
}

/// `text *` or `+text` → (`text`, true). Marks inside the label are kept.
fn split_correct_flag(rest: &str) -> (&str, bool) {
    if let Some(label) = rest.strip_suffix('*') {
        (label.trim_end(), true)
    } else if let Some(label) = rest.strip_prefix('+') {
        (label.trim_start(), true)
    } else {
        (rest, false)
    }
}

/// `b) text` or `б) text` → `text`
fn strip_answer_marker(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    let is_marker = letter.is_ascii_alphabetic()
        || matches!(letter.to_lowercase().next(), Some('а'..='я'));
    if !is_marker {
        return None;
    }
    chars.as_str().strip_prefix(')').map(str::trim_start)
}
