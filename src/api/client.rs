//! HTTP access to the ICEQ backend.
//!
//! Calls are blocking; the UI runs them on a worker thread.

use super::types::{ApiStatus, BookCatalog, PremiumStatus, QuestionsResponse};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::models::{GenerationRequest, Question};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;

#[cfg_attr(test, mockall::automock)]
pub trait QuizApi: Send + Sync {
    /// `POST /generate`
    fn generate(&self, request: &GenerationRequest) -> AppResult<Vec<Question>>;

    /// `GET /premium/status`
    fn premium_status(&self) -> AppResult<PremiumStatus>;

    /// `POST /premium/toggle`. Flips the server-side flag.
    fn toggle_premium(&self) -> AppResult<()>;

    /// `GET /test/{id}`
    fn fetch_test(&self, id: &str) -> AppResult<Vec<Question>>;

    /// `GET /api/books`
    fn books(&self) -> AppResult<BookCatalog>;

    fn refresh_recommendations(
        &self,
        favorites: &[String],
        ratings: &HashMap<String, u8>,
    ) -> AppResult<()>;

    fn update_rating(&self, book_id: &str, rating: u8) -> AppResult<()>;

    /// `POST /export`. Returns the file the server rendered.
    fn export_remote(
        &self,
        questions: &[Question],
        user_answers: &[Option<String>],
        format: ExportFormat,
    ) -> AppResult<Vec<u8>>;
}

pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        log::debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send()?;
        read_json(response)
    }

    fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        log::debug!("POST {}", path);
        let response = self.client.post(self.url(path)).json(body).send()?;
        read_json(response)
    }
}

fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(http_error(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Non-2xx: the server `message` if the body has one, the status line otherwise.
fn http_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ApiStatus>(body)
        .ok()
        .and_then(|s| s.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("сервер ответил {}", status));
    AppError::Network(message)
}

impl QuizApi for HttpApiClient {
    fn generate(&self, request: &GenerationRequest) -> AppResult<Vec<Question>> {
        let response: QuestionsResponse = self.post_json("/generate", request)?;
        response
            .status
            .ensure_success("Ошибка при генерации вопросов")?;
        Ok(response.questions)
    }

    fn premium_status(&self) -> AppResult<PremiumStatus> {
        self.get_json("/premium/status")
    }

    fn toggle_premium(&self) -> AppResult<()> {
        let status: ApiStatus = self.post_json("/premium/toggle", &json!({}))?;
        status.ensure_success("Не удалось изменить тариф")
    }

    fn fetch_test(&self, id: &str) -> AppResult<Vec<Question>> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::Validation("Введите ID теста".to_string()));
        }
        let response: QuestionsResponse = self.get_json(&format!("/test/{}", id))?;
        response.status.ensure_success("Тест не найден")?;
        Ok(response.questions)
    }

    fn books(&self) -> AppResult<BookCatalog> {
        self.get_json("/api/books")
    }

    fn refresh_recommendations(
        &self,
        favorites: &[String],
        ratings: &HashMap<String, u8>,
    ) -> AppResult<()> {
        let _: serde_json::Value = self.post_json(
            "/api/refresh_recommendations",
            &json!({ "favoriteBooks": favorites, "userRatings": ratings }),
        )?;
        Ok(())
    }

    fn update_rating(&self, book_id: &str, rating: u8) -> AppResult<()> {
        let _: serde_json::Value = self.post_json(
            "/api/update_rating",
            &json!({ "bookId": book_id, "rating": rating }),
        )?;
        Ok(())
    }

    fn export_remote(
        &self,
        questions: &[Question],
        user_answers: &[Option<String>],
        format: ExportFormat,
    ) -> AppResult<Vec<u8>> {
        log::debug!("POST /export ({})", format.extension());
        let body = json!({
            "format": format.extension(),
            "questions": questions,
            "userAnswers": user_answers,
        });
        let response = self.client.post(self.url("/export")).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text()?;
            return Err(http_error(status, &text));
        }
        Ok(response.bytes()?.to_vec())
    }
}
