use super::{Action, notify_err};
use crate::import::format_file_size;
use crate::models::GenerationModel;
use crate::pages::CreatePage;
use eframe::egui;

pub fn show(ui: &mut egui::Ui, page: &mut CreatePage, busy: bool, actions: &mut Vec<Action>) {
    let tier = page.tier();
    ui.heading("Создание теста");
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        if ui.button("📄 Загрузить файл").clicked() {
            actions.push(Action::PickDocument);
        }
        if ui.button("Очистить").clicked() {
            page.clear_text();
        }
    });

    if let Some(doc) = page.document() {
        let (name, size) = (doc.file_name.clone(), format_file_size(doc.file_size));
        ui.horizontal(|ui| {
            ui.label(format!("{} ({})", name, size));
            if ui.small_button("✕").clicked() {
                page.remove_document();
            }
        });
    }

    let mut text = page.text().to_string();
    let response = egui::ScrollArea::vertical()
        .id_salt("create_text")
        .max_height(260.0)
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut text)
                    .hint_text("Вставьте текст, по которому нужно составить вопросы")
                    .desired_rows(12)
                    .desired_width(f32::INFINITY),
            )
        })
        .inner;
    if response.changed() {
        if let Some(notice) = page.set_text(&text) {
            actions.push(Action::Notify(notice));
        }
    }
    ui.label(format!(
        "{} / {} символов",
        page.char_count(),
        tier.max_text_chars()
    ));

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.label("Количество вопросов:");
        if ui.small_button("−").clicked() {
            page.decrease_questions();
        }
        let mut count = page.question_count();
        if ui
            .add(egui::Slider::new(&mut count, tier.question_range()))
            .changed()
        {
            page.set_question_count(count);
        }
        if ui.small_button("+").clicked() {
            page.increase_questions();
        }
        ui.label(page.estimated_time_text());
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label("Модель:");
        for model in GenerationModel::ALL {
            let locked = !tier.allows_model(model);
            let label = if locked {
                format!("🔒 {}", model.display_name())
            } else {
                model.display_name().to_string()
            };
            if ui.radio(page.model() == model, label).clicked() {
                let result = page.select_model(model);
                notify_err(actions, result);
            }
        }
    });

    ui.add_space(16.0);
    let button = egui::Button::new(if busy { "Генерация..." } else { "Сгенерировать тест" });
    if ui.add_enabled(page.can_generate() && !busy, button).clicked() {
        match page.build_request() {
            Ok(request) => actions.push(Action::Generate(request)),
            Err(e) => actions.push(Action::Notify(e.into())),
        }
    }
    if busy {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Это может занять несколько минут");
        });
    }
}
