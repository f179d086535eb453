//! Page controllers: the state and operations behind each screen.
//!
//! Controllers get their collaborators through the constructor and never
//! draw anything. Calls that hit the network come in two halves where the UI
//! needs them off the main thread: a free function doing the request, and an
//! `apply_*` method folding the result into the page.

pub mod books;
pub mod create;
pub mod home;
pub mod preview;
pub mod take;

pub use books::BooksPage;
pub use create::{CreatePage, GenerationOutcome};
pub use home::HomePage;
pub use preview::PreviewPage;
pub use take::TakePage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A message for the user, shown as a toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl From<crate::errors::AppError> for Notice {
    fn from(err: crate::errors::AppError) -> Self {
        Notice::error(err.user_message())
    }
}
