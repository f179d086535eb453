//! Preview screen with the test editor.

use crate::database::LocalStore;
use crate::errors::{AppError, AppResult};
use crate::export::{self, ExportFormat};
use crate::models::{Question, StoredTest, TestEditor, Tier};
use chrono::{DateTime, Local, Utc};

pub struct PreviewPage {
    store: LocalStore,
    test: Option<StoredTest>,
    editor: TestEditor,
    editing: bool,
}

impl PreviewPage {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            test: None,
            editor: TestEditor::default(),
            editing: false,
        }
    }

    /// Loads the editor copy, or the generated test when there is none.
    /// Returns whether a test was found.
    pub fn load(&mut self) -> AppResult<bool> {
        self.test = self.store.test_for_edit()?;
        self.editor = TestEditor::new(
            self.test
                .as_ref()
                .map(|t| t.questions.clone())
                .unwrap_or_default(),
        );
        self.editing = false;
        Ok(self.test.is_some())
    }

    pub fn test(&self) -> Option<&StoredTest> {
        self.test.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        self.editor.questions()
    }

    pub fn editor(&self) -> &TestEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TestEditor {
        &mut self.editor
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.editor.is_dirty()
    }

    pub fn model_name(&self) -> Option<&'static str> {
        self.test
            .as_ref()
            .and_then(|t| t.settings.as_ref())
            .map(|s| s.model.display_name())
    }

    /// `Только что`, `N мин назад`, or the local date for older tests.
    pub fn created_label(&self, now: DateTime<Utc>) -> Option<String> {
        let created_at = self.test.as_ref()?.created_at;
        let minutes = (now - created_at).num_minutes();
        Some(if minutes < 1 {
            "Только что".to_string()
        } else if minutes < 60 {
            format!("{} мин назад", minutes)
        } else {
            created_at
                .with_timezone(&Local)
                .format("%d.%m.%Y")
                .to_string()
        })
    }

    /// Editing is a premium feature.
    pub fn start_editing(&mut self, tier: Tier) -> AppResult<()> {
        if !tier.is_premium() {
            return Err(AppError::Validation(
                "Редактирование вопросов доступно только с премиум подпиской".to_string(),
            ));
        }
        let test = self.require_test()?.clone();
        self.store.save_test_for_edit(&test)?;
        self.editing = true;
        Ok(())
    }

    /// Drops unsaved edits.
    pub fn cancel_editing(&mut self) {
        let questions = self
            .test
            .as_ref()
            .map(|t| t.questions.clone())
            .unwrap_or_default();
        self.editor = TestEditor::new(questions);
        self.editing = false;
    }

    /// Writes the edited questions to every stored copy. Rejected while any
    /// question still has problems; the first one is reported.
    pub fn save(&mut self) -> AppResult<()> {
        if let Some((index, errors)) = self.editor.validate().into_iter().next() {
            return Err(AppError::Validation(format!(
                "Вопрос {}: {}",
                index + 1,
                errors.join("; ")
            )));
        }
        if self.editor.questions().is_empty() {
            return Err(AppError::Validation(
                "Тест должен содержать хотя бы один вопрос".to_string(),
            ));
        }

        let mut test = self.require_test()?.clone();
        test.questions = self.editor.questions().to_vec();
        self.store.save_edited_test(&test)?;
        self.editor.mark_saved();
        log::info!("Saved edited test {} ({} questions)", test.id, test.question_count());
        self.test = Some(test);
        Ok(())
    }

    /// Makes the shown test the one to take and returns its questions.
    pub fn start_test(&mut self) -> AppResult<Vec<Question>> {
        if self.editor.is_dirty() {
            return Err(AppError::Validation(
                "Сохраните изменения перед началом теста".to_string(),
            ));
        }
        let test = self.require_test()?;
        self.store.save_current_test(test)?;
        let questions = test.questions.clone();
        self.editing = false;
        Ok(questions)
    }

    pub fn create_new(&mut self) -> AppResult<()> {
        self.store.clear_generated_test()?;
        self.test = None;
        self.editor = TestEditor::default();
        self.editing = false;
        Ok(())
    }

    /// Renders the shown questions (saved or not) as a test file.
    pub fn export_test(&self, format: ExportFormat, now: DateTime<Utc>) -> AppResult<String> {
        if self.editor.questions().is_empty() {
            return Err(AppError::Validation("Нет данных для экспорта".to_string()));
        }
        export::export_test(format, self.editor.questions(), now)
    }

    fn require_test(&self) -> AppResult<&StoredTest> {
        self.test
            .as_ref()
            .ok_or_else(|| AppError::Validation("Данные теста не найдены".to_string()))
    }
}
