//! Wire types of the ICEQ backend.

use crate::errors::{AppError, AppResult};
use crate::models::Question;
use serde::{Deserialize, Serialize};

/// The `{status, message}` envelope every JSON endpoint answers with.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiStatus {
    /// `status != "success"` becomes `AppError::Api` carrying the server message.
    pub fn ensure_success(&self, fallback: &str) -> AppResult<()> {
        if self.status == "success" {
            Ok(())
        } else {
            Err(AppError::Api(
                self.message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }
}

/// Answer of `/generate` and `/test/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionsResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PremiumFeatures {
    #[serde(default)]
    pub daily_tests_limit: Option<u32>,
    #[serde(default)]
    pub max_questions: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PremiumStatus {
    #[serde(default)]
    pub premium_active: bool,
    #[serde(default)]
    pub features: Option<PremiumFeatures>,
}

impl PremiumStatus {
    pub fn daily_tests_limit(&self) -> Option<u32> {
        self.features.as_ref().and_then(|f| f.daily_tests_limit)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireBook")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub rating: f32,
    pub genre: Option<String>,
    pub genre_name: Option<String>,
    pub year: Option<i32>,
    pub pages: Option<u32>,
    pub description: Option<String>,
    pub popular: bool,
    pub recommended: bool,
}

/// Book ids come back as numbers or strings depending on the catalogue source.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBook {
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    genre_name: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    pages: Option<u32>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    popular: bool,
    #[serde(default)]
    recommended: bool,
}

impl From<WireBook> for Book {
    fn from(wire: WireBook) -> Self {
        let id = match wire.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Book {
            id,
            title: wire.title,
            author: wire.author,
            rating: wire.rating,
            genre: wire.genre,
            genre_name: wire.genre_name,
            year: wire.year,
            pages: wire.pages,
            description: wire.description,
            popular: wire.popular,
            recommended: wire.recommended,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BookCatalog {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_success() {
        let ok = ApiStatus {
            status: "success".into(),
            message: None,
        };
        let failed = ApiStatus {
            status: "error".into(),
            message: Some("Текст слишком короткий".into()),
        };
        let silent = ApiStatus {
            status: "error".into(),
            message: Some(String::new()),
        };

        assert!(ok.ensure_success("x").is_ok());
        assert_eq!(
            failed.ensure_success("x"),
            Err(AppError::Api("Текст слишком короткий".into()))
        );
        assert_eq!(
            silent.ensure_success("Ошибка генерации"),
            Err(AppError::Api("Ошибка генерации".into()))
        );
    }

    #[test]
    fn test_questions_response_normalises_wire_shape() {
        let body = r#"{"status": "success", "questions": [
            {"question": "Q?", "answers": [
                {"answer": "A", "is_correct": true, "correct": true},
                {"answer": "B", "is_correct": false}
            ]}
        ]}"#;

        let response: QuestionsResponse = serde_json::from_str(body).unwrap();

        assert!(response.status.ensure_success("").is_ok());
        assert_eq!(response.questions[0].correct_answer().unwrap().label, "A");
    }

    #[test]
    fn test_error_response_without_questions() {
        let body = r#"{"status": "error", "message": "Модель недоступна"}"#;
        let response: QuestionsResponse = serde_json::from_str(body).unwrap();

        assert!(response.questions.is_empty());
        assert!(matches!(response.status.ensure_success(""), Err(AppError::Api(_))));
    }

    #[test]
    fn test_premium_status() {
        let status: PremiumStatus = serde_json::from_str(
            r#"{"premium_active": true, "features": {"daily_tests_limit": 50}}"#,
        )
        .unwrap();
        assert!(status.premium_active);
        assert_eq!(status.daily_tests_limit(), Some(50));

        let bare: PremiumStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(bare, PremiumStatus::default());
    }

    #[test]
    fn test_book_ids_are_strings() {
        let catalog: BookCatalog = serde_json::from_str(
            r#"{"books": [
                {"id": 1, "title": "Преступление и наказание", "author": "Фёдор Достоевский",
                 "rating": 4.7, "genreName": "Художественная литература", "popular": true},
                {"id": "b-2", "title": "Мастер и Маргарита"}
            ], "genres": [{"id": "fiction", "name": "Художественная литература"}]}"#,
        )
        .unwrap();

        assert_eq!(catalog.books[0].id, "1");
        assert_eq!(catalog.books[1].id, "b-2");
        assert!(catalog.books[0].popular);
        assert_eq!(
            catalog.books[0].genre_name.as_deref(),
            Some("Художественная литература")
        );
        assert_eq!(catalog.genres.len(), 1);
    }
}
