//! In-place editing of a generated test before it is taken.
//!
//! Editing is deliberately looser than loading: a question may be incomplete
//! while the user works on it. [`TestEditor::validate`] reports what still
//! blocks the test and [`TestEditor::auto_fix`] repairs the mechanical issues.

use super::{Answer, Question};
use std::collections::{BTreeMap, HashSet};

pub const MIN_PROMPT_CHARS: usize = 10;

#[derive(Clone, Debug, Default)]
pub struct TestEditor {
    questions: Vec<Question>,
    dirty: bool,
}

impl TestEditor {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            dirty: false,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    /// Unsaved changes; the window close guard checks this.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    /// Appends an empty question with four answers, the first one correct.
    pub fn add_question(&mut self) -> usize {
        self.questions.push(Question::new(
            "",
            vec![
                Answer::new("", true),
                Answer::new("", false),
                Answer::new("", false),
                Answer::new("", false),
            ],
        ));
        self.touch();
        self.questions.len() - 1
    }

    pub fn delete_question(&mut self, index: usize) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        self.questions.remove(index);
        self.touch();
        true
    }

    /// Inserts a copy right after the original.
    pub fn duplicate_question(&mut self, index: usize) -> bool {
        let Some(question) = self.questions.get(index).cloned() else {
            return false;
        };
        self.questions.insert(index + 1, question);
        self.touch();
        true
    }

    pub fn set_prompt(&mut self, index: usize, prompt: &str) {
        if let Some(question) = self.questions.get_mut(index) {
            question.prompt = prompt.to_string();
            self.dirty = true;
        }
    }

    pub fn set_explanation(&mut self, index: usize, explanation: &str) {
        if let Some(question) = self.questions.get_mut(index) {
            question.explanation = if explanation.trim().is_empty() {
                None
            } else {
                Some(explanation.to_string())
            };
            self.dirty = true;
        }
    }

    pub fn add_answer(&mut self, question_index: usize) {
        if let Some(question) = self.questions.get_mut(question_index) {
            question.answers.push(Answer::new("", false));
            self.dirty = true;
        }
    }

    pub fn delete_answer(&mut self, question_index: usize, answer_index: usize) -> bool {
        let Some(question) = self.questions.get_mut(question_index) else {
            return false;
        };
        if answer_index >= question.answers.len() {
            return false;
        }
        question.answers.remove(answer_index);
        self.dirty = true;
        true
    }

    pub fn set_answer_label(&mut self, question_index: usize, answer_index: usize, label: &str) {
        if let Some(answer) = self
            .questions
            .get_mut(question_index)
            .and_then(|q| q.answers.get_mut(answer_index))
        {
            answer.label = label.to_string();
            self.dirty = true;
        }
    }

    /// Single-correct toggle: marking an answer correct unmarks the others.
    pub fn toggle_correct(&mut self, question_index: usize, answer_index: usize) {
        let Some(question) = self.questions.get_mut(question_index) else {
            return;
        };
        let Some(was_correct) = question.answers.get(answer_index).map(|a| a.is_correct) else {
            return;
        };
        if !was_correct {
            for answer in &mut question.answers {
                answer.is_correct = false;
            }
        }
        question.answers[answer_index].is_correct = !was_correct;
        self.dirty = true;
    }

    /// Problems per question index; an empty map means the test is ready.
    pub fn validate(&self) -> BTreeMap<usize, Vec<String>> {
        self.questions
            .iter()
            .enumerate()
            .filter_map(|(i, q)| {
                let errors = question_errors(q);
                (!errors.is_empty()).then_some((i, errors))
            })
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Repairs correctness flags and pads short answer lists.
    /// Returns how many questions were changed.
    pub fn auto_fix(&mut self) -> usize {
        let mut fixed = 0;
        for question in &mut self.questions {
            let mut changed = false;

            match question.correct_count() {
                0 if !question.answers.is_empty() => {
                    question.answers[0].is_correct = true;
                    changed = true;
                }
                n if n > 1 => {
                    let mut seen = false;
                    for answer in &mut question.answers {
                        if answer.is_correct && seen {
                            answer.is_correct = false;
                        }
                        seen |= answer.is_correct;
                    }
                    changed = true;
                }
                _ => {}
            }

            while question.answers.len() < 2 {
                let label = format!("Вариант {}", question.answers.len() + 1);
                let is_correct = question.answers.is_empty();
                question.answers.push(Answer::new(label, is_correct));
                changed = true;
            }

            if changed {
                fixed += 1;
            }
        }
        if fixed > 0 {
            self.touch();
        }
        fixed
    }
}

fn question_errors(question: &Question) -> Vec<String> {
    let mut errors = Vec::new();

    if question.prompt.trim().chars().count() < MIN_PROMPT_CHARS {
        errors.push(format!(
            "Текст вопроса должен содержать минимум {} символов",
            MIN_PROMPT_CHARS
        ));
    }

    if question.answers.len() < 2 {
        errors.push("Должно быть минимум 2 варианта ответа".to_string());
        return errors;
    }

    if question.answers.iter().any(|a| a.label.trim().is_empty()) {
        errors.push("Все варианты ответов должны быть заполнены".to_string());
    }

    match question.correct_count() {
        0 => errors.push("Должен быть выбран хотя бы один правильный ответ".to_string()),
        1 => {}
        _ => errors.push("Должен быть выбран только один правильный ответ".to_string()),
    }

    let mut seen = HashSet::new();
    let has_duplicates = question
        .answers
        .iter()
        .any(|a| !seen.insert(a.label.trim().to_lowercase()));
    if has_duplicates {
        errors.push("Варианты ответов не должны дублироваться".to_string());
    }

    errors
}
