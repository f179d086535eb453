//! Crate-wide error type.
//!
//! Nothing here is fatal to the application: every variant ends up as a toast
//! on screen, and the page that raised it stays usable.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl AppError {
    /// Text shown to the user in a toast, without the technical prefix.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Api(msg) | AppError::InvalidState(msg) => {
                msg.clone()
            }
            AppError::Network(msg) => format!("Ошибка сети: {}", msg),
            AppError::Storage(msg) => format!("Ошибка хранилища: {}", msg),
            AppError::Serialization(msg) => format!("Ошибка формата данных: {}", msg),
            AppError::Io(msg) => format!("Ошибка файла: {}", msg),
        }
    }

    /// Transport-level failures are the only ones that allow the demo fallback.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::Validation("Введите текст".into());
        assert_eq!(err.to_string(), "Validation error: Введите текст");
        assert_eq!(err.user_message(), "Введите текст");
    }

    #[test]
    fn test_only_network_errors_are_transport() {
        assert!(AppError::Network("timeout".into()).is_transport());
        assert!(!AppError::Api("Тест не найден".into()).is_transport());
        assert!(!AppError::Validation("empty".into()).is_transport());
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{ nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
