//! Create screen: source text, generation settings, and what happens with
//! the generated test.

use super::Notice;
use crate::api::QuizApi;
use crate::database::{LocalStore, StatsStore};
use crate::errors::{AppError, AppResult};
use crate::import::{SourceDocument, load_document};
use crate::models::demo::demo_questions;
use crate::models::{GenerationModel, GenerationRequest, Question, StoredTest, TextType, Tier};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_QUESTION_COUNT: u32 = 10;

/// A test ready for the preview screen.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOutcome {
    pub test: StoredTest,
    /// The backend was unreachable and the demo questions were used instead.
    pub is_demo: bool,
}

pub struct CreatePage {
    api: Arc<dyn QuizApi>,
    stats: Arc<dyn StatsStore>,
    store: LocalStore,
    demo_fallback: bool,
    tier: Tier,
    text: String,
    question_count: u32,
    model: GenerationModel,
    document: Option<SourceDocument>,
}

impl CreatePage {
    pub fn new(
        api: Arc<dyn QuizApi>,
        stats: Arc<dyn StatsStore>,
        store: LocalStore,
        demo_fallback: bool,
    ) -> Self {
        let tier = stats.load().tier();
        let mut page = Self {
            api,
            stats,
            store,
            demo_fallback,
            tier,
            text: String::new(),
            question_count: DEFAULT_QUESTION_COUNT,
            model: GenerationModel::default(),
            document: None,
        };
        page.set_question_count(DEFAULT_QUESTION_COUNT);
        page
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn model(&self) -> GenerationModel {
        self.model
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn can_generate(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Re-applies limits after a tier change: the count is clamped, the text
    /// truncated, and a locked model falls back to the default one.
    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
        self.set_question_count(self.question_count);
        let text = std::mem::take(&mut self.text);
        self.set_text(&text);
        if !tier.allows_model(self.model) {
            self.model = GenerationModel::default();
        }
    }

    /// Stores `text`, cut to the tier's character limit. Returns a warning
    /// when something was cut.
    pub fn set_text(&mut self, text: &str) -> Option<Notice> {
        let limit = self.tier.max_text_chars();
        match text.char_indices().nth(limit) {
            Some((cut, _)) => {
                self.text = text[..cut].to_string();
                Some(Notice::warning(format!(
                    "Текст обрезан до {} символов",
                    limit
                )))
            }
            None => {
                self.text = text.to_string();
                None
            }
        }
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
        self.document = None;
    }

    pub fn set_question_count(&mut self, count: u32) {
        let range = self.tier.question_range();
        self.question_count = count.clamp(*range.start(), *range.end());
    }

    pub fn increase_questions(&mut self) {
        self.set_question_count(self.question_count.saturating_add(1));
    }

    pub fn decrease_questions(&mut self) {
        self.set_question_count(self.question_count.saturating_sub(1));
    }

    /// `~ 2-3 минут` for 10 questions.
    pub fn estimated_time_text(&self) -> String {
        let minutes = self.question_count.div_ceil(5).max(1);
        format!("~ {}-{} минут", minutes, minutes + 1)
    }

    pub fn select_model(&mut self, model: GenerationModel) -> AppResult<()> {
        if !self.tier.allows_model(model) {
            return Err(AppError::Validation(
                "Эта модель доступна только с Premium подпиской".to_string(),
            ));
        }
        self.model = model;
        Ok(())
    }

    /// Reads a `.txt` source document into the text field.
    pub fn load_document(&mut self, path: &Path) -> AppResult<Option<Notice>> {
        let document = load_document(path, self.tier)?;
        let notice = self.set_text(&document.text);
        log::info!(
            "Loaded source document {} ({} bytes)",
            document.file_name,
            document.file_size
        );
        self.document = Some(document);
        Ok(notice)
    }

    pub fn remove_document(&mut self) {
        self.document = None;
    }

    pub fn build_request(&self) -> AppResult<GenerationRequest> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(AppError::Validation(
                "Введите текст для генерации теста".to_string(),
            ));
        }
        if !self.stats.can_create_test() {
            return Err(AppError::Validation(
                "Достигнут дневной лимит тестов. Перейдите на Premium, чтобы создавать больше"
                    .to_string(),
            ));
        }

        let (file_size, text_type) = match &self.document {
            Some(doc) => (doc.file_size, doc.text_type),
            None => (0, TextType::Text),
        };
        Ok(GenerationRequest {
            text: text.to_string(),
            question_number: self.question_count,
            model: self.model,
            file_size,
            text_type,
        })
    }

    /// Blocking generation: request, call, complete.
    pub fn generate(&mut self) -> AppResult<GenerationOutcome> {
        let request = self.build_request()?;
        let result = self.api.generate(&request);
        self.complete(request, result)
    }

    /// Stores the generated test for the preview and take screens and counts
    /// it against the daily allowance. A transport failure falls back to the
    /// demo questions when that is enabled; every other failure is returned.
    pub fn complete(
        &mut self,
        request: GenerationRequest,
        result: AppResult<Vec<Question>>,
    ) -> AppResult<GenerationOutcome> {
        let (questions, is_demo) = match result {
            Ok(questions) if questions.is_empty() => {
                return Err(AppError::Api("Сервер не вернул ни одного вопроса".to_string()));
            }
            Ok(questions) => (questions, false),
            Err(e) if e.is_transport() && self.demo_fallback => {
                log::warn!("Generation failed ({}), using demo questions", e);
                (demo_questions(), true)
            }
            Err(e) => return Err(e),
        };

        let count = questions.len() as u32;
        let test = StoredTest::new(questions, Some(request));
        self.store.save_generated_test(&test)?;

        if is_demo {
            log::info!("Demo test stored ({} questions)", count);
        } else {
            if let Err(e) = self.stats.record_test_generated(count) {
                log::warn!("Failed to update stats after generation: {}", e);
            }
            log::info!("Generated test {} with {} questions", test.id, count);
        }

        Ok(GenerationOutcome { test, is_demo })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockQuizApi;
    use crate::database::stats_store::MockStatsStore;
    use crate::database::{LocalStatsStore, db};
    use crate::models::{Answer, UserStats};
    use std::fs;

    fn premium_stats() -> UserStats {
        let mut stats = UserStats::default();
        stats.apply_tier(Tier::Premium);
        stats
    }

    fn page_with(
        api: MockQuizApi,
        stats: Arc<dyn StatsStore>,
        fallback: bool,
    ) -> (CreatePage, LocalStore) {
        let store = LocalStore::in_memory().unwrap();
        let page = CreatePage::new(Arc::new(api), stats, store.clone(), fallback);
        (page, store)
    }

    fn local_page(api: MockQuizApi, fallback: bool) -> (CreatePage, LocalStore) {
        let store = LocalStore::in_memory().unwrap();
        let stats = Arc::new(LocalStatsStore::new(store.clone()));
        let page = CreatePage::new(Arc::new(api), stats, store.clone(), fallback);
        (page, store)
    }

    fn generated() -> Vec<Question> {
        vec![Question::new(
            "Какая планета самая большая?",
            vec![Answer::new("Юпитер", true), Answer::new("Марс", false)],
        )]
    }

    #[test]
    fn test_free_tier_text_is_truncated() {
        let (mut page, _) = local_page(MockQuizApi::new(), true);

        let notice = page.set_text(&"я".repeat(10_005));

        assert_eq!(page.char_count(), 10_000);
        assert!(notice.is_some());
        assert!(page.set_text("короткий текст").is_none());
    }

    #[test]
    fn test_question_count_is_clamped_to_tier() {
        let (mut page, _) = local_page(MockQuizApi::new(), true);
        assert_eq!(page.question_count(), 10);

        page.set_question_count(42);
        assert_eq!(page.question_count(), 10);
        page.set_question_count(1);
        assert_eq!(page.question_count(), 5);
        page.decrease_questions();
        assert_eq!(page.question_count(), 5);

        page.set_tier(Tier::Premium);
        page.set_question_count(42);
        assert_eq!(page.question_count(), 42);

        page.set_tier(Tier::Free);
        assert_eq!(page.question_count(), 10);
    }

    #[test]
    fn test_locked_models_on_free_tier() {
        let (mut page, _) = local_page(MockQuizApi::new(), true);

        assert!(page.select_model(GenerationModel::Deepseek).is_err());
        assert_eq!(page.model(), GenerationModel::Iceq);

        page.set_tier(Tier::Premium);
        page.select_model(GenerationModel::Qwen).unwrap();
        page.set_tier(Tier::Free);
        assert_eq!(page.model(), GenerationModel::Iceq);
    }

    #[test]
    fn test_estimated_time() {
        let (mut page, _) = local_page(MockQuizApi::new(), true);
        assert_eq!(page.estimated_time_text(), "~ 2-3 минут");
        page.set_question_count(5);
        assert_eq!(page.estimated_time_text(), "~ 1-2 минут");
    }

    #[test]
    fn test_build_request_requires_text() {
        let (page, _) = local_page(MockQuizApi::new(), true);
        assert!(matches!(page.build_request(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_build_request_respects_daily_limit() {
        let mut stats = MockStatsStore::new();
        stats.expect_load().returning(UserStats::default);
        stats.expect_can_create_test().returning(|| false);

        let (mut page, _) = page_with(MockQuizApi::new(), Arc::new(stats), true);
        page.set_text("Юпитер — крупнейшая планета.");

        let err = page.build_request().unwrap_err();
        assert!(err.user_message().contains("лимит"));
    }

    #[test]
    fn test_build_request_carries_document_meta() {
        let path = std::env::temp_dir().join("iceq_create_source.txt");
        fs::write(&path, "Юпитер — крупнейшая планета Солнечной системы.").unwrap();

        let (mut page, _) = local_page(MockQuizApi::new(), true);
        page.load_document(&path).unwrap();
        let _ = fs::remove_file(&path);

        let request = page.build_request().unwrap();
        assert_eq!(request.text_type, TextType::Txt);
        assert!(request.file_size > 0);
        assert_eq!(request.question_number, 10);
        assert_eq!(request.model, GenerationModel::Iceq);
    }

    #[test]
    fn test_generate_stores_test_and_updates_stats() {
        let mut api = MockQuizApi::new();
        api.expect_generate()
            .withf(|req| req.question_number == 10 && req.text == "Текст про планеты")
            .times(1)
            .returning(|_| Ok(generated()));

        let (mut page, store) = local_page(api, true);
        page.set_text("  Текст про планеты  ");

        let outcome = page.generate().unwrap();

        assert!(!outcome.is_demo);
        assert_eq!(store.generated_test().unwrap().unwrap(), outcome.test);
        assert_eq!(store.current_test().unwrap().unwrap(), outcome.test);

        let stats: UserStats = store.get_json(db::KEY_USER_STATS).unwrap().unwrap();
        assert_eq!(stats.tests_created, 1);
        assert_eq!(stats.questions_generated, 1);
        assert_eq!(stats.tests_remaining, 4);
    }

    #[test]
    fn test_transport_failure_falls_back_to_demo() {
        let mut api = MockQuizApi::new();
        api.expect_generate()
            .returning(|_| Err(AppError::Network("connection refused".into())));

        let mut stats = MockStatsStore::new();
        stats.expect_load().returning(premium_stats);
        stats.expect_can_create_test().returning(|| true);
        stats.expect_record_test_generated().never();

        let (mut page, store) = page_with(api, Arc::new(stats), true);
        page.set_text("Текст");

        let outcome = page.generate().unwrap();

        assert!(outcome.is_demo);
        assert_eq!(outcome.test.questions, demo_questions());
        assert!(store.generated_test().unwrap().is_some());
    }

    #[test]
    fn test_transport_failure_without_fallback_is_error() {
        let mut api = MockQuizApi::new();
        api.expect_generate()
            .returning(|_| Err(AppError::Network("timeout".into())));

        let (mut page, store) = local_page(api, false);
        page.set_text("Текст");

        assert!(page.generate().unwrap_err().is_transport());
        assert!(store.generated_test().unwrap().is_none());
    }

    #[test]
    fn test_api_error_never_falls_back() {
        let mut api = MockQuizApi::new();
        api.expect_generate()
            .returning(|_| Err(AppError::Api("Текст слишком короткий".into())));

        let (mut page, _) = local_page(api, true);
        page.set_text("Текст");

        assert_eq!(
            page.generate(),
            Err(AppError::Api("Текст слишком короткий".into()))
        );
    }

    #[test]
    fn test_empty_question_list_is_error() {
        let mut api = MockQuizApi::new();
        api.expect_generate().returning(|_| Ok(Vec::new()));

        let (mut page, _) = local_page(api, true);
        page.set_text("Текст");

        assert!(matches!(page.generate(), Err(AppError::Api(_))));
    }

    #[test]
    fn test_stats_failure_does_not_block_generation() {
        let mut api = MockQuizApi::new();
        api.expect_generate().returning(|_| Ok(generated()));

        let mut stats = MockStatsStore::new();
        stats.expect_load().returning(UserStats::default);
        stats.expect_can_create_test().returning(|| true);
        stats
            .expect_record_test_generated()
            .times(1)
            .returning(|_| Err(AppError::Storage("disk full".into())));

        let (mut page, _) = page_with(api, Arc::new(stats), true);
        page.set_text("Текст");

        assert!(page.generate().is_ok());
    }
}
