//! Book catalogue with local favourites and ratings.

use super::Notice;
use crate::api::{Book, BookCatalog, QuizApi};
use crate::database::LocalStore;
use crate::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Arc;

pub const MAX_RATING: u8 = 5;

pub struct BooksPage {
    api: Arc<dyn QuizApi>,
    store: LocalStore,
    catalog: BookCatalog,
    favorites: Vec<String>,
    ratings: HashMap<String, u8>,
    genre: Option<String>,
}

impl BooksPage {
    pub fn new(api: Arc<dyn QuizApi>, store: LocalStore) -> Self {
        let favorites = store.favorite_books();
        let ratings = store.user_ratings();
        Self {
            api,
            store,
            catalog: BookCatalog::default(),
            favorites,
            ratings,
            genre: None,
        }
    }

    pub fn refresh(&mut self) -> Option<Notice> {
        let result = self.api.books();
        self.apply_catalog(result)
    }

    /// A failed load leaves an empty shelf and an error toast.
    pub fn apply_catalog(&mut self, result: AppResult<BookCatalog>) -> Option<Notice> {
        match result {
            Ok(catalog) => {
                log::debug!("Loaded {} books", catalog.books.len());
                self.catalog = catalog;
                None
            }
            Err(e) => {
                log::warn!("Failed to load books: {}", e);
                self.catalog = BookCatalog::default();
                Some(Notice::error("Не удалось загрузить книги"))
            }
        }
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    pub fn select_genre(&mut self, genre: Option<String>) {
        self.genre = genre;
    }

    pub fn selected_genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn favorite_books(&self) -> Vec<&Book> {
        self.catalog
            .books
            .iter()
            .filter(|b| self.is_favorite(&b.id))
            .collect()
    }

    pub fn recommended_books(&self) -> Vec<&Book> {
        self.catalog.books.iter().filter(|b| b.recommended).collect()
    }

    /// Popular books, narrowed to the selected genre if any.
    pub fn popular_books(&self) -> Vec<&Book> {
        self.catalog
            .books
            .iter()
            .filter(|b| b.popular)
            .filter(|b| match &self.genre {
                Some(genre) => b.genre.as_deref() == Some(genre.as_str()),
                None => true,
            })
            .collect()
    }

    pub fn is_favorite(&self, book_id: &str) -> bool {
        self.favorites.iter().any(|id| id == book_id)
    }

    pub fn rating(&self, book_id: &str) -> Option<u8> {
        self.ratings.get(book_id).copied()
    }

    pub fn toggle_favorite(&mut self, book_id: &str) -> AppResult<bool> {
        let now_favorite = self.store.toggle_favorite(book_id)?;
        self.favorites = self.store.favorite_books();
        Ok(now_favorite)
    }

    /// Stores the rating locally. Sending it to the server is up to the caller.
    pub fn set_rating(&mut self, book_id: &str, rating: u8) -> AppResult<()> {
        if !(1..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "Оценка должна быть от 1 до {}",
                MAX_RATING
            )));
        }
        self.store.set_user_rating(book_id, rating)?;
        self.ratings.insert(book_id.to_string(), rating);
        Ok(())
    }

    /// Rates locally, then reports to the server. A server failure is logged only.
    pub fn rate(&mut self, book_id: &str, rating: u8) -> AppResult<()> {
        self.set_rating(book_id, rating)?;
        if let Err(e) = self.api.update_rating(book_id, rating) {
            log::warn!("Failed to send rating for book {}: {}", book_id, e);
        }
        Ok(())
    }

    /// Favourites and ratings as sent to `/api/refresh_recommendations`.
    pub fn preferences(&self) -> (Vec<String>, HashMap<String, u8>) {
        (self.favorites.clone(), self.ratings.clone())
    }

    pub fn refresh_recommendations(&mut self) -> Option<Notice> {
        let (favorites, ratings) = self.preferences();
        if let Err(e) = self.api.refresh_recommendations(&favorites, &ratings) {
            log::warn!("Failed to refresh recommendations: {}", e);
        }
        self.refresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Genre, MockQuizApi};

    fn book(id: &str, genre: &str, popular: bool, recommended: bool) -> Book {
        Book {
            id: id.to_string(),
            title: format!("Книга {}", id),
            author: "Автор".to_string(),
            rating: 4.5,
            genre: Some(genre.to_string()),
            genre_name: None,
            year: None,
            pages: None,
            description: None,
            popular,
            recommended,
        }
    }

    fn catalog() -> BookCatalog {
        BookCatalog {
            books: vec![
                book("1", "fiction", true, true),
                book("2", "fantasy", true, false),
                book("3", "science", false, true),
            ],
            genres: vec![Genre {
                id: "fiction".into(),
                name: "Художественная литература".into(),
            }],
        }
    }

    #[test]
    fn test_refresh_and_shelves() {
        let mut api = MockQuizApi::new();
        api.expect_books().times(1).returning(|| Ok(catalog()));

        let mut page = BooksPage::new(Arc::new(api), LocalStore::in_memory().unwrap());
        assert!(page.refresh().is_none());

        assert_eq!(page.popular_books().len(), 2);
        assert_eq!(page.recommended_books().len(), 2);

        page.select_genre(Some("fantasy".into()));
        let popular: Vec<&str> = page.popular_books().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(popular, vec!["2"]);
    }

    #[test]
    fn test_failed_load_gives_empty_list() {
        let mut api = MockQuizApi::new();
        api.expect_books()
            .returning(|| Err(AppError::Network("timeout".into())));

        let mut page = BooksPage::new(Arc::new(api), LocalStore::in_memory().unwrap());
        page.apply_catalog(Ok(catalog()));

        let notice = page.refresh().unwrap();
        assert_eq!(notice.level, crate::pages::NoticeLevel::Error);
        assert!(page.catalog().books.is_empty());
    }

    #[test]
    fn test_favorites_persist() {
        let store = LocalStore::in_memory().unwrap();
        let mut page = BooksPage::new(Arc::new(MockQuizApi::new()), store.clone());
        page.apply_catalog(Ok(catalog()));

        assert!(page.toggle_favorite("3").unwrap());
        assert_eq!(page.favorite_books()[0].id, "3");

        let reopened = BooksPage::new(Arc::new(MockQuizApi::new()), store);
        assert!(reopened.is_favorite("3"));
    }

    #[test]
    fn test_rating_bounds() {
        let mut page = BooksPage::new(
            Arc::new(MockQuizApi::new()),
            LocalStore::in_memory().unwrap(),
        );

        assert!(page.set_rating("1", 0).is_err());
        assert!(page.set_rating("1", 6).is_err());
        page.set_rating("1", 4).unwrap();
        assert_eq!(page.rating("1"), Some(4));
    }

    #[test]
    fn test_rate_survives_server_failure() {
        let mut api = MockQuizApi::new();
        api.expect_update_rating()
            .withf(|id, rating| id == "2" && *rating == 5)
            .times(1)
            .returning(|_, _| Err(AppError::Network("offline".into())));

        let store = LocalStore::in_memory().unwrap();
        let mut page = BooksPage::new(Arc::new(api), store.clone());

        page.rate("2", 5).unwrap();

        assert_eq!(store.user_ratings().get("2"), Some(&5));
    }

    #[test]
    fn test_refresh_recommendations_sends_preferences() {
        let mut api = MockQuizApi::new();
        api.expect_refresh_recommendations()
            .withf(|favorites, ratings| {
                favorites.len() == 1 && favorites[0] == "1" && ratings.get("1") == Some(&3)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_books().times(1).returning(|| Ok(catalog()));

        let mut page = BooksPage::new(Arc::new(api), LocalStore::in_memory().unwrap());
        page.toggle_favorite("1").unwrap();
        page.set_rating("1", 3).unwrap();

        assert!(page.refresh_recommendations().is_none());
    }
}
