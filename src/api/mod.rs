pub mod client;
pub mod types;

#[cfg(test)]
pub use client::MockQuizApi;
pub use client::{HttpApiClient, QuizApi};
pub use types::{ApiStatus, Book, BookCatalog, Genre, PremiumFeatures, PremiumStatus};
