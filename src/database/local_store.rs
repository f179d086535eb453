//! Typed access to the key-value store.
//!
//! Reads are forgiving: a value that no longer parses is logged and treated as
//! missing, so a corrupt entry never blocks a page from loading.

use super::db;
use crate::errors::{AppError, AppResult};
use crate::models::StoredTest;
use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn in_memory() -> AppResult<Self> {
        Ok(Self::new(db::init_in_memory()?))
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("local store lock poisoned".to_string()))
    }

    pub fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(db::get_item(key, &*self.lock()?)?)
    }

    pub fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        Ok(db::set_item(key, value, &*self.lock()?)?)
    }

    pub fn remove_item(&self, key: &str) -> AppResult<()> {
        Ok(db::remove_item(key, &*self.lock()?)?)
    }

    pub fn clear(&self) -> AppResult<()> {
        Ok(db::clear(&*self.lock()?)?)
    }

    /// Reads and parses a JSON value. Corrupt JSON is logged and reported as `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Ignoring corrupt value under '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw)
    }

    pub fn theme(&self) -> Theme {
        match self.get_item(db::KEY_THEME) {
            Ok(Some(value)) if value == "light" => Theme::Light,
            Ok(_) => Theme::Dark,
            Err(e) => {
                log::warn!("Failed to read theme: {}", e);
                Theme::Dark
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> AppResult<()> {
        self.set_item(db::KEY_THEME, theme.as_str())
    }

    pub fn generated_test(&self) -> AppResult<Option<StoredTest>> {
        self.get_json(db::KEY_GENERATED_TEST)
    }

    pub fn current_test(&self) -> AppResult<Option<StoredTest>> {
        self.get_json(db::KEY_CURRENT_TEST)
    }

    /// The editor prefers its own working copy and falls back to the generated test.
    pub fn test_for_edit(&self) -> AppResult<Option<StoredTest>> {
        match self.get_json(db::KEY_TEST_FOR_EDIT)? {
            Some(test) => Ok(Some(test)),
            None => self.generated_test(),
        }
    }

    /// A freshly generated test is both the preview copy and the one to take.
    /// Any editor copy of an older test is dropped.
    pub fn save_generated_test(&self, test: &StoredTest) -> AppResult<()> {
        self.remove_item(db::KEY_TEST_FOR_EDIT)?;
        self.set_json(db::KEY_GENERATED_TEST, test)?;
        self.set_json(db::KEY_CURRENT_TEST, test)
    }

    pub fn save_current_test(&self, test: &StoredTest) -> AppResult<()> {
        self.set_json(db::KEY_CURRENT_TEST, test)
    }

    pub fn save_test_for_edit(&self, test: &StoredTest) -> AppResult<()> {
        self.set_json(db::KEY_TEST_FOR_EDIT, test)
    }

    /// Saving from the editor updates every copy.
    pub fn save_edited_test(&self, test: &StoredTest) -> AppResult<()> {
        self.set_json(db::KEY_GENERATED_TEST, test)?;
        self.set_json(db::KEY_CURRENT_TEST, test)?;
        self.set_json(db::KEY_TEST_FOR_EDIT, test)
    }

    pub fn clear_generated_test(&self) -> AppResult<()> {
        self.remove_item(db::KEY_GENERATED_TEST)?;
        self.remove_item(db::KEY_TEST_FOR_EDIT)
    }

    pub fn clear_current_test(&self) -> AppResult<()> {
        self.remove_item(db::KEY_CURRENT_TEST)
    }

    pub fn favorite_books(&self) -> Vec<String> {
        self.get_json(db::KEY_FAVORITE_BOOKS)
            .unwrap_or_else(|e| {
                log::warn!("Failed to read favourites: {}", e);
                None
            })
            .unwrap_or_default()
    }

    /// Adds or removes a book from favourites; returns whether it is now a favourite.
    pub fn toggle_favorite(&self, book_id: &str) -> AppResult<bool> {
        let mut favorites = self.favorite_books();
        let now_favorite = if let Some(pos) = favorites.iter().position(|id| id == book_id) {
            favorites.remove(pos);
            false
        } else {
            favorites.push(book_id.to_string());
            true
        };
        self.set_json(db::KEY_FAVORITE_BOOKS, &favorites)?;
        Ok(now_favorite)
    }

    pub fn user_ratings(&self) -> HashMap<String, u8> {
        self.get_json(db::KEY_USER_RATINGS)
            .unwrap_or_else(|e| {
                log::warn!("Failed to read ratings: {}", e);
                None
            })
            .unwrap_or_default()
    }

    pub fn set_user_rating(&self, book_id: &str, rating: u8) -> AppResult<()> {
        let mut ratings = self.user_ratings();
        ratings.insert(book_id.to_string(), rating);
        self.set_json(db::KEY_USER_RATINGS, &ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answer, Question};

    fn store() -> LocalStore {
        LocalStore::in_memory().unwrap()
    }

    fn sample_test() -> StoredTest {
        StoredTest::new(
            vec![Question::new(
                "Вопрос",
                vec![Answer::new("да", true), Answer::new("нет", false)],
            )],
            None,
        )
    }

    #[test]
    fn test_raw_items_through_shared_connection() {
        let store = store();
        let other = store.clone();

        store.set_item(db::KEY_THEME, "light").unwrap();
        assert_eq!(other.get_item(db::KEY_THEME).unwrap().as_deref(), Some("light"));

        other.remove_item(db::KEY_THEME).unwrap();
        assert_eq!(store.get_item(db::KEY_THEME).unwrap(), None);

        store.set_item(db::KEY_FAVORITE_BOOKS, "[]").unwrap();
        store.clear().unwrap();
        assert_eq!(other.get_item(db::KEY_FAVORITE_BOOKS).unwrap(), None);
    }

    #[test]
    fn test_theme_defaults_to_dark_and_persists() {
        let store = store();
        assert_eq!(store.theme(), Theme::Dark);

        store.set_theme(Theme::Light).unwrap();
        assert_eq!(store.theme(), Theme::Light);
        assert_eq!(store.theme().toggled(), Theme::Dark);
    }

    #[test]
    fn test_corrupt_json_reads_as_missing() {
        let store = store();
        store.set_item(db::KEY_CURRENT_TEST, "{not json").unwrap();

        assert_eq!(store.current_test().unwrap(), None);
    }

    #[test]
    fn test_generated_test_is_also_current() {
        let store = store();
        let test = sample_test();
        store.save_generated_test(&test).unwrap();

        assert_eq!(store.current_test().unwrap(), Some(test.clone()));
        assert_eq!(store.test_for_edit().unwrap(), Some(test));
    }

    #[test]
    fn test_new_generation_drops_stale_edit_copy() {
        let store = store();
        let old = sample_test();
        store.save_edited_test(&old).unwrap();

        let mut fresh = sample_test();
        fresh.id = "fresh".to_string();
        store.save_generated_test(&fresh).unwrap();

        assert_eq!(store.test_for_edit().unwrap(), Some(fresh));
    }

    #[test]
    fn test_clear_generated_keeps_current() {
        let store = store();
        store.save_generated_test(&sample_test()).unwrap();
        store.clear_generated_test().unwrap();

        assert!(store.generated_test().unwrap().is_none());
        assert!(store.current_test().unwrap().is_some());
    }

    #[test]
    fn test_toggle_favorite() {
        let store = store();
        assert!(store.toggle_favorite("42").unwrap());
        assert_eq!(store.favorite_books(), vec!["42".to_string()]);
        assert!(!store.toggle_favorite("42").unwrap());
        assert!(store.favorite_books().is_empty());
    }

    #[test]
    fn test_user_ratings() {
        let store = store();
        store.set_user_rating("7", 4).unwrap();
        store.set_user_rating("7", 5).unwrap();

        assert_eq!(store.user_ratings().get("7"), Some(&5));
    }
}
