//! egui rendering of the screens plus the pieces the app shell needs
//! (toasts and the background request worker).
//!
//! Screens never call the network or open dialogs themselves. They push
//! [`Action`]s, and the app applies them after the frame is drawn.

pub mod books;
pub mod create;
pub mod home;
pub mod preview;
pub mod take;
pub mod toast;
pub mod worker;

use crate::export::ExportFormat;
use crate::models::{GenerationRequest, Tier};
use crate::pages::Notice;

pub use toast::Toasts;
pub use worker::{Reply, Worker};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Home,
    Create,
    Preview,
    Take,
    Books,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Create,
        Screen::Preview,
        Screen::Take,
        Screen::Books,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Главная",
            Screen::Create => "Создать тест",
            Screen::Preview => "Предпросмотр",
            Screen::Take => "Пройти тест",
            Screen::Books => "Книги",
        }
    }
}

/// Something a screen asks the app to do once the frame is drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Navigate(Screen),
    Notify(Notice),
    RefreshPremium,
    SwitchTier(Tier),
    Generate(GenerationRequest),
    PickDocument,
    PickTestFile,
    FetchTest(String),
    StartTest,
    SaveResults(ExportFormat),
    RemoteExport(ExportFormat),
    ExportTest(ExportFormat),
    LoadBooks,
    RefreshRecommendations,
    SendRating { book_id: String, rating: u8 },
}

/// Pushes the error of `result`, if any, as a toast.
pub(crate) fn notify_err<T>(actions: &mut Vec<Action>, result: crate::errors::AppResult<T>) {
    if let Err(e) = result {
        actions.push(Action::Notify(e.into()));
    }
}
