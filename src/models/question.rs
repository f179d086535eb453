//! A test question with its answer options.
//!
//! Question payloads reach the client from several places (the generation API,
//! `/test/{id}`, JSON files written by the web editor, the local store) and
//! they do not agree on field names. Every one of them is deserialized through
//! [`WireQuestion`], so the rest of the crate only ever sees the canonical
//! [`Question`] / [`Answer`] shape.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireAnswer")]
pub struct Answer {
    #[serde(rename = "answer")]
    pub label: String,
    pub is_correct: bool,
}

impl Answer {
    pub fn new(label: impl Into<String>, is_correct: bool) -> Self {
        Self {
            label: label.into(),
            is_correct,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireQuestion")]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, answers: Vec<Answer>) -> Self {
        Self {
            prompt: prompt.into(),
            answers,
            explanation: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// The first answer flagged correct. Validated questions have exactly one.
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    pub fn has_answer(&self, label: &str) -> bool {
        self.answers.iter().any(|a| a.label == label)
    }

    /// Checks the invariants a question must hold before it can be taken.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("отсутствует текст вопроса".to_string());
        }
        if self.answers.len() < 2 {
            return Err("должно быть минимум 2 варианта ответа".to_string());
        }
        if self.answers.iter().any(|a| a.label.trim().is_empty()) {
            return Err("все варианты ответов должны быть заполнены".to_string());
        }
        // Answers are scored by label.
        let mut seen = HashSet::new();
        if !self
            .answers
            .iter()
            .all(|a| seen.insert(a.label.trim().to_lowercase()))
        {
            return Err("варианты ответов не должны дублироваться".to_string());
        }
        match self.correct_count() {
            0 => Err("не отмечен правильный ответ".to_string()),
            1 => Ok(()),
            n => Err(format!(
                "отмечено {} правильных ответа, допускается только один",
                n
            )),
        }
    }
}

/// Validates a whole question set for loading into a session.
pub fn validate_questions(questions: &[Question]) -> AppResult<()> {
    if questions.is_empty() {
        return Err(AppError::Validation("Тест не содержит вопросов".to_string()));
    }
    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|reason| AppError::Validation(format!("Вопрос {}: {}", index + 1, reason)))?;
    }
    Ok(())
}

/// Answer as it appears on the wire. Older payloads use `correct`/`text`,
/// the generator uses `is_correct`/`answer`, the web editor writes both.
#[derive(Deserialize)]
struct WireAnswer {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    is_correct: Option<bool>,
    #[serde(default)]
    correct: Option<bool>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Deserialize)]
struct WireQuestion {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    answers: Vec<WireAnswer>,
    #[serde(default)]
    explanation: Option<String>,
}

impl From<WireAnswer> for Answer {
    fn from(wire: WireAnswer) -> Self {
        Answer {
            label: wire.text.or(wire.answer).or(wire.label).unwrap_or_default(),
            is_correct: wire.is_correct.unwrap_or(false) || wire.correct.unwrap_or(false),
        }
    }
}

impl From<WireQuestion> for Question {
    fn from(wire: WireQuestion) -> Self {
        // Some generators attach the explanation to the correct answer instead.
        let answer_explanation = wire
            .answers
            .iter()
            .find(|a| a.is_correct.unwrap_or(false) || a.correct.unwrap_or(false))
            .and_then(|a| a.explanation.clone());

        let explanation = wire
            .explanation
            .filter(|e| !e.trim().is_empty())
            .or(answer_explanation.filter(|e| !e.trim().is_empty()));

        Question {
            prompt: wire
                .question
                .or(wire.prompt)
                .or(wire.text)
                .unwrap_or_default(),
            answers: wire.answers.into_iter().map(Answer::from).collect(),
            explanation,
        }
    }
}
