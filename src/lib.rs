pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod export;
pub mod import;
pub mod models;
pub mod pages;
pub mod ui;

pub use errors::{AppError, AppResult};
pub use models::{Question, QuizSession, ResultSummary, StoredTest, UserStats};
