//! Quiz-taking state machine.
//!
//! `Upload → InProgress → Results ⇄ Review`, with `retake` going back to
//! `InProgress` on the same questions and `create_new` going back to `Upload`.
//! Only one question is shown at a time; answers are kept per index.

use super::result_summary::{self, ResultSummary};
use super::{Question, validate_questions};
use crate::database::StatsStore;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuizState {
    #[default]
    Upload,
    InProgress,
    Results,
    Review,
}

/// What a navigation or finish request did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Moved,
    Unchanged,
    /// Finishing needs the user's confirmation because some questions are unanswered.
    NeedsConfirmation { unanswered: usize },
    Finished,
}

pub struct QuizSession {
    stats: Arc<dyn StatsStore>,
    state: QuizState,
    questions: Vec<Question>,
    current_index: usize,
    user_answers: Vec<Option<String>>,
    started_at: Option<DateTime<Utc>>,
    summary: Option<ResultSummary>,
}

impl QuizSession {
    pub fn new(stats: Arc<dyn StatsStore>) -> Self {
        Self {
            stats,
            state: QuizState::Upload,
            questions: Vec::new(),
            current_index: 0,
            user_answers: Vec::new(),
            started_at: None,
            summary: None,
        }
    }

    /// Starts a test on `questions`. Rejected sets leave the session untouched.
    pub fn load(&mut self, questions: Vec<Question>) -> AppResult<()> {
        self.require(QuizState::Upload, "load a test")?;
        validate_questions(&questions)?;

        log::info!("Test loaded: {} questions", questions.len());
        self.questions = questions;
        self.start(Utc::now());
        Ok(())
    }

    fn start(&mut self, now: DateTime<Utc>) {
        self.user_answers = vec![None; self.questions.len()];
        self.current_index = 0;
        self.started_at = Some(now);
        self.summary = None;
        self.state = QuizState::InProgress;
    }

    fn require(&self, expected: QuizState, action: &str) -> AppResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AppError::InvalidState(format!(
                "cannot {} while in {:?}",
                action, self.state
            )))
        }
    }

    /// Records `label` for the current question without moving on.
    pub fn select_answer(&mut self, label: &str) -> AppResult<()> {
        self.require(QuizState::InProgress, "select an answer")?;
        let question = &self.questions[self.current_index];
        if !question.has_answer(label) {
            return Err(AppError::Validation(format!(
                "Вариант «{}» отсутствует в вопросе {}",
                label,
                self.current_index + 1
            )));
        }
        self.user_answers[self.current_index] = Some(label.to_string());
        Ok(())
    }

    pub fn clear_answer(&mut self) -> AppResult<()> {
        self.require(QuizState::InProgress, "clear an answer")?;
        self.user_answers[self.current_index] = None;
        Ok(())
    }

    /// Moves forward; on the last question this becomes a finish request.
    pub fn next(&mut self) -> AppResult<Transition> {
        self.require(QuizState::InProgress, "navigate")?;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            Ok(Transition::Moved)
        } else {
            self.finish(false)
        }
    }

    pub fn prev(&mut self) -> AppResult<Transition> {
        self.require(QuizState::InProgress, "navigate")?;
        if self.current_index == 0 {
            return Ok(Transition::Unchanged);
        }
        self.current_index -= 1;
        Ok(Transition::Moved)
    }

    pub fn go_to(&mut self, index: usize) -> AppResult<Transition> {
        self.require(QuizState::InProgress, "navigate")?;
        if index >= self.questions.len() || index == self.current_index {
            return Ok(Transition::Unchanged);
        }
        self.current_index = index;
        Ok(Transition::Moved)
    }

    /// Leaves the current question unanswered and moves on.
    pub fn skip(&mut self) -> AppResult<Transition> {
        self.clear_answer()?;
        self.next()
    }

    pub fn finish(&mut self, confirmed: bool) -> AppResult<Transition> {
        self.finish_at(confirmed, Utc::now())
    }

    /// Finishes the attempt as of `now`.
    ///
    /// Stats are updated best-effort: a failed write is logged and the results
    /// are shown anyway.
    pub fn finish_at(&mut self, confirmed: bool, now: DateTime<Utc>) -> AppResult<Transition> {
        self.require(QuizState::InProgress, "finish")?;

        let unanswered = self.unanswered_count();
        if unanswered > 0 && !confirmed {
            return Ok(Transition::NeedsConfirmation { unanswered });
        }

        let summary = result_summary::score(
            &self.questions,
            &self.user_answers,
            self.elapsed_seconds_at(now),
            now,
        );
        log::info!(
            "Test finished: {}/{} correct ({}%)",
            summary.correct_count,
            summary.total_questions,
            summary.score_percentage
        );

        if let Err(e) = self.stats.record_test_completed(summary.score_percentage) {
            log::warn!("Failed to save test statistics: {}", e);
        }

        self.summary = Some(summary);
        self.state = QuizState::Results;
        Ok(Transition::Finished)
    }

    pub fn review(&mut self) -> AppResult<()> {
        self.require(QuizState::Results, "open the review")?;
        self.state = QuizState::Review;
        Ok(())
    }

    pub fn back_to_results(&mut self) -> AppResult<()> {
        self.require(QuizState::Review, "return to results")?;
        self.state = QuizState::Results;
        Ok(())
    }

    /// Same questions again, from the first one, with a fresh timer.
    pub fn retake(&mut self) -> AppResult<()> {
        if !matches!(self.state, QuizState::Results | QuizState::Review) {
            return Err(AppError::InvalidState(format!(
                "cannot retake while in {:?}",
                self.state
            )));
        }
        self.start(Utc::now());
        Ok(())
    }

    /// Drops an in-progress attempt and returns to source selection.
    pub fn abort(&mut self) -> AppResult<()> {
        self.require(QuizState::InProgress, "abort")?;
        self.reset();
        Ok(())
    }

    /// Clears everything; allowed from any state.
    pub fn create_new(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = QuizState::Upload;
        self.questions.clear();
        self.user_answers.clear();
        self.current_index = 0;
        self.started_at = None;
        self.summary = None;
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    /// Navigation guard: leaving now would lose progress.
    pub fn is_in_progress(&self) -> bool {
        self.state == QuizState::InProgress
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn user_answers(&self) -> &[Option<String>] {
        &self.user_answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            QuizState::InProgress => self.questions.get(self.current_index),
            _ => None,
        }
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.user_answers
            .get(self.current_index)
            .and_then(|a| a.as_deref())
    }

    pub fn answered_flags(&self) -> Vec<bool> {
        self.user_answers.iter().map(Option::is_some).collect()
    }

    pub fn unanswered_count(&self) -> usize {
        self.user_answers.iter().filter(|a| a.is_none()).count()
    }

    pub fn progress_text(&self) -> String {
        format!(
            "Вопрос {} из {}",
            self.current_index + 1,
            self.questions.len()
        )
    }

    pub fn progress_fraction(&self) -> f32 {
        if self.questions.is_empty() {
            return 0.0;
        }
        (self.current_index + 1) as f32 / self.questions.len() as f32
    }

    fn elapsed_seconds_at(&self, now: DateTime<Utc>) -> u64 {
        self.started_at
            .map(|start| (now - start).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    pub fn elapsed_seconds(&self) -> u64 {
        match &self.summary {
            Some(summary) => summary.elapsed_seconds,
            None => self.elapsed_seconds_at(Utc::now()),
        }
    }

    /// `MM:SS`, as shown next to the progress bar.
    pub fn timer_text(&self) -> String {
        let secs = self.elapsed_seconds();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }
}
