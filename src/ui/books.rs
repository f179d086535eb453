use super::{Action, notify_err};
use crate::api::Book;
use crate::pages::books::MAX_RATING;
use crate::pages::BooksPage;
use eframe::egui;

pub fn show(ui: &mut egui::Ui, page: &mut BooksPage, busy: bool, actions: &mut Vec<Action>) {
    ui.horizontal(|ui| {
        ui.heading("Книги");
        if ui
            .add_enabled(!busy, egui::Button::new("⟳ Обновить"))
            .clicked()
        {
            actions.push(Action::LoadBooks);
        }
        if ui
            .add_enabled(!busy, egui::Button::new("Обновить рекомендации"))
            .clicked()
        {
            actions.push(Action::RefreshRecommendations);
        }
        if busy {
            ui.spinner();
        }
    });

    let mut genre = page.selected_genre().map(str::to_string);
    let selected_name = genre
        .as_deref()
        .and_then(|id| page.catalog().genres.iter().find(|g| g.id == id))
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "Все жанры".to_string());
    egui::ComboBox::from_label("Жанр")
        .selected_text(selected_name)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut genre, None, "Все жанры");
            for g in &page.catalog().genres {
                ui.selectable_value(&mut genre, Some(g.id.clone()), g.name.as_str());
            }
        });
    if genre.as_deref() != page.selected_genre() {
        page.select_genre(genre);
    }
    ui.separator();

    let favorites: Vec<Book> = page.favorite_books().into_iter().cloned().collect();
    let recommended: Vec<Book> = page.recommended_books().into_iter().cloned().collect();
    let popular: Vec<Book> = page.popular_books().into_iter().cloned().collect();

    egui::ScrollArea::vertical().id_salt("books").show(ui, |ui| {
        shelf(ui, page, "Избранное", &favorites, actions);
        shelf(ui, page, "Рекомендации", &recommended, actions);
        shelf(ui, page, "Популярное", &popular, actions);
    });
}

fn shelf(
    ui: &mut egui::Ui,
    page: &mut BooksPage,
    title: &str,
    books: &[Book],
    actions: &mut Vec<Action>,
) {
    ui.label(egui::RichText::new(title).heading());
    if books.is_empty() {
        ui.label(egui::RichText::new("Пусто").weak());
    }
    for book in books {
        // Same book can sit on several shelves; ids keep their widgets apart.
        ui.push_id((title, &book.id), |ui| book_row(ui, page, book, actions));
    }
    ui.add_space(10.0);
}

fn book_row(ui: &mut egui::Ui, page: &mut BooksPage, book: &Book, actions: &mut Vec<Action>) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let star = if page.is_favorite(&book.id) { "★" } else { "☆" };
            if ui.button(star).clicked() {
                let result = page.toggle_favorite(&book.id);
                notify_err(actions, result);
            }
            ui.label(egui::RichText::new(&book.title).strong());
            ui.label(format!("· {}", book.author));
            if let Some(year) = book.year {
                ui.label(format!("· {}", year));
            }
        });

        let mut details = format!("Рейтинг {:.1}", book.rating);
        if let Some(genre) = book.genre_name.as_ref().or(book.genre.as_ref()) {
            details.push_str(&format!(" · {}", genre));
        }
        if let Some(pages) = book.pages {
            details.push_str(&format!(" · {} стр.", pages));
        }
        ui.label(egui::RichText::new(details).weak());
        if let Some(description) = &book.description {
            ui.label(description.as_str());
        }

        ui.horizontal(|ui| {
            ui.label("Ваша оценка:");
            let current = page.rating(&book.id).unwrap_or(0);
            for value in 1..=MAX_RATING {
                let mark = if value <= current { "★" } else { "☆" };
                if ui.small_button(mark).clicked() {
                    match page.set_rating(&book.id, value) {
                        Ok(()) => actions.push(Action::SendRating {
                            book_id: book.id.clone(),
                            rating: value,
                        }),
                        Err(e) => actions.push(Action::Notify(e.into())),
                    }
                }
            }
        });
    });
}
