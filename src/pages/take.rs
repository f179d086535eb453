//! Take screen: picks a test source and drives the quiz session.

use crate::api::QuizApi;
use crate::database::{LocalStore, StatsStore};
use crate::errors::{AppError, AppResult};
use crate::export::{self, ExportFormat};
use crate::import::load_test_file;
use crate::models::{Question, QuizSession, QuizState, validate_questions};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

/// Where the running test came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestSource {
    File(String),
    Remote(String),
    Stored,
}

impl TestSource {
    pub fn describe(&self) -> String {
        match self {
            TestSource::File(name) => format!("Файл: {}", name),
            TestSource::Remote(id) => format!("Тест #{}", id),
            TestSource::Stored => "Созданный тест".to_string(),
        }
    }
}

pub struct TakePage {
    api: Arc<dyn QuizApi>,
    store: LocalStore,
    session: QuizSession,
    source: Option<TestSource>,
}

impl TakePage {
    pub fn new(api: Arc<dyn QuizApi>, stats: Arc<dyn StatsStore>, store: LocalStore) -> Self {
        Self {
            api,
            store,
            session: QuizSession::new(stats),
            source: None,
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    pub fn source(&self) -> Option<&TestSource> {
        self.source.as_ref()
    }

    pub fn has_stored_test(&self) -> bool {
        matches!(self.store.current_test(), Ok(Some(_)))
    }

    pub fn load_file(&mut self, path: &Path) -> AppResult<()> {
        let questions = load_test_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.start(questions, TestSource::File(name))
    }

    /// Blocking form of `load_fetched(id, api.fetch_test(id))`.
    pub fn load_remote(&mut self, id: &str) -> AppResult<()> {
        let result = self.api.fetch_test(id);
        self.load_fetched(id, result)
    }

    pub fn load_fetched(&mut self, id: &str, result: AppResult<Vec<Question>>) -> AppResult<()> {
        let questions = result?;
        self.start(questions, TestSource::Remote(id.trim().to_string()))
    }

    /// Starts the test stored under `iceq_current_test`.
    pub fn load_stored(&mut self) -> AppResult<()> {
        let test = self
            .store
            .current_test()?
            .ok_or_else(|| AppError::Validation("Сохранённый тест не найден".to_string()))?;
        self.start(test.questions, TestSource::Stored)
    }

    /// A rejected set leaves the current attempt, finished or not, untouched.
    pub fn start(&mut self, questions: Vec<Question>, source: TestSource) -> AppResult<()> {
        validate_questions(&questions)?;
        if self.session.state() != QuizState::Upload {
            self.session.create_new();
        }
        self.session.load(questions)?;
        log::info!("Test started from {:?}", source);
        self.source = Some(source);
        Ok(())
    }

    /// Back to source selection. Drops any attempt in progress and the
    /// stored current test.
    pub fn reset(&mut self) {
        self.session.create_new();
        self.source = None;
        if let Err(e) = self.store.clear_current_test() {
            log::warn!("Failed to clear current test: {}", e);
        }
    }

    /// File name and contents of the results in `format`.
    pub fn download_results(
        &self,
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> AppResult<(String, String)> {
        let summary = self
            .session
            .summary()
            .ok_or_else(|| AppError::InvalidState("Нет результатов для экспорта".to_string()))?;
        let contents = export::export_results(
            format,
            summary,
            self.session.questions(),
            self.session.user_answers(),
        )?;
        Ok((export::export_filename(format, now), contents))
    }

    /// The server-rendered export of the questions and answers of this attempt.
    pub fn remote_export_payload(&self) -> AppResult<(Vec<Question>, Vec<Option<String>>)> {
        if self.session.summary().is_none() {
            return Err(AppError::InvalidState(
                "Нет результатов для экспорта".to_string(),
            ));
        }
        Ok((
            self.session.questions().to_vec(),
            self.session.user_answers().to_vec(),
        ))
    }

    pub fn export_remote(&self, format: ExportFormat) -> AppResult<Vec<u8>> {
        let (questions, answers) = self.remote_export_payload()?;
        self.api.export_remote(&questions, &answers, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockQuizApi;
    use crate::database::LocalStatsStore;
    use crate::models::{Answer, StoredTest, Transition};
    use std::fs;

    fn questions() -> Vec<Question> {
        vec![
            Question::new(
                "Столица Франции?",
                vec![Answer::new("Париж", true), Answer::new("Лион", false)],
            ),
            Question::new(
                "2 + 2?",
                vec![Answer::new("3", false), Answer::new("4", true)],
            ),
        ]
    }

    fn page(api: MockQuizApi) -> (TakePage, LocalStore) {
        let store = LocalStore::in_memory().unwrap();
        let stats = Arc::new(LocalStatsStore::new(store.clone()));
        (TakePage::new(Arc::new(api), stats, store.clone()), store)
    }

    #[test]
    fn test_load_stored_test() {
        let (mut page, store) = page(MockQuizApi::new());
        assert!(!page.has_stored_test());
        assert!(page.load_stored().is_err());

        store
            .save_current_test(&StoredTest::new(questions(), None))
            .unwrap();
        assert!(page.has_stored_test());

        page.load_stored().unwrap();
        assert!(page.session().is_in_progress());
        assert_eq!(page.source(), Some(&TestSource::Stored));
    }

    #[test]
    fn test_load_remote() {
        let mut api = MockQuizApi::new();
        api.expect_fetch_test()
            .withf(|id| id == "42")
            .times(1)
            .returning(|_| Ok(questions()));

        let (mut page, _) = page(api);
        page.load_remote("42").unwrap();

        assert_eq!(page.session().questions().len(), 2);
        assert_eq!(page.source().unwrap().describe(), "Тест #42");
    }

    #[test]
    fn test_remote_error_keeps_upload_state() {
        let mut api = MockQuizApi::new();
        api.expect_fetch_test()
            .returning(|_| Err(AppError::Api("Тест не найден".into())));

        let (mut page, _) = page(api);

        assert_eq!(
            page.load_remote("missing"),
            Err(AppError::Api("Тест не найден".into()))
        );
        assert_eq!(page.session().state(), QuizState::Upload);
        assert!(page.source().is_none());
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join("iceq_take_file.txt");
        fs::write(&path, "1. Вопрос один?\na) Да *\nb) Нет\n").unwrap();

        let (mut page, _) = page(MockQuizApi::new());
        let result = page.load_file(&path);
        let _ = fs::remove_file(&path);

        result.unwrap();
        assert_eq!(
            page.source(),
            Some(&TestSource::File("iceq_take_file.txt".to_string()))
        );
    }

    #[test]
    fn test_download_requires_results() {
        let (mut page, _) = page(MockQuizApi::new());
        page.start(questions(), TestSource::Stored).unwrap();

        assert!(matches!(
            page.download_results(ExportFormat::Csv, Utc::now()),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_finish_and_download_csv() {
        let (mut page, _) = page(MockQuizApi::new());
        page.start(questions(), TestSource::Stored).unwrap();

        let session = page.session_mut();
        session.select_answer("Париж").unwrap();
        session.next().unwrap();
        assert_eq!(
            session.finish(false).unwrap(),
            Transition::NeedsConfirmation { unanswered: 1 }
        );
        assert_eq!(session.finish(true).unwrap(), Transition::Finished);

        let (name, csv) = page
            .download_results(ExportFormat::Csv, Utc::now())
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(name.starts_with("test_results_") && name.ends_with(".csv"));
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("Неправильно"));
    }

    #[test]
    fn test_start_after_results_begins_fresh() {
        let (mut page, _) = page(MockQuizApi::new());
        page.start(questions(), TestSource::Stored).unwrap();
        page.session_mut().finish(true).unwrap();
        assert_eq!(page.session().state(), QuizState::Results);

        page.start(questions(), TestSource::Remote("7".into())).unwrap();

        assert!(page.session().is_in_progress());
        assert!(page.session().user_answers().iter().all(Option::is_none));
    }

    #[test]
    fn test_rejected_start_keeps_finished_attempt() {
        let (mut page, _) = page(MockQuizApi::new());
        page.start(questions(), TestSource::Stored).unwrap();
        page.session_mut().finish(true).unwrap();

        let mut invalid = questions();
        invalid[0].answers[1].is_correct = true;
        let result = page.start(invalid, TestSource::Remote("9".into()));

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(page.session().state(), QuizState::Results);
        assert!(page.session().summary().is_some());
        assert_eq!(page.source(), Some(&TestSource::Stored));
        assert!(page.download_results(ExportFormat::Txt, Utc::now()).is_ok());
    }

    #[test]
    fn test_reset_forgets_stored_test() {
        let (mut page, store) = page(MockQuizApi::new());
        store
            .save_current_test(&StoredTest::new(questions(), None))
            .unwrap();
        page.load_stored().unwrap();

        page.reset();

        assert_eq!(page.session().state(), QuizState::Upload);
        assert!(!page.has_stored_test());
    }

    #[test]
    fn test_export_remote_sends_attempt() {
        let mut api = MockQuizApi::new();
        api.expect_export_remote()
            .withf(|q, a, f| {
                q.len() == 2 && a[0].as_deref() == Some("Париж") && *f == ExportFormat::Txt
            })
            .times(1)
            .returning(|_, _, _| Ok(b"report".to_vec()));

        let (mut page, _) = page(api);
        page.start(questions(), TestSource::Stored).unwrap();
        page.session_mut().select_answer("Париж").unwrap();
        page.session_mut().finish(true).unwrap();

        assert_eq!(page.export_remote(ExportFormat::Txt).unwrap(), b"report");
    }
}
