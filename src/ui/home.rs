use super::{Action, Screen};
use crate::models::Tier;
use crate::pages::HomePage;
use eframe::egui;

pub fn show(ui: &mut egui::Ui, page: &HomePage, busy: bool, actions: &mut Vec<Action>) {
    let stats = page.stats();
    let tier = page.tier();

    ui.heading("ICEQ");
    ui.label("Генерация тестов по любому тексту");
    ui.add_space(12.0);

    ui.horizontal(|ui| {
        if ui.button("Создать тест").clicked() {
            actions.push(Action::Navigate(Screen::Create));
        }
        if ui.button("Пройти тест").clicked() {
            actions.push(Action::Navigate(Screen::Take));
        }
        if ui
            .add_enabled(!busy, egui::Button::new("⟳ Обновить"))
            .clicked()
        {
            actions.push(Action::RefreshPremium);
        }
    });

    ui.add_space(12.0);
    ui.group(|ui| {
        ui.label(egui::RichText::new("Статистика").strong());
        egui::Grid::new("home_stats")
            .num_columns(2)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                ui.label("Создано тестов");
                ui.label(stats.tests_created.to_string());
                ui.end_row();

                ui.label("Сгенерировано вопросов");
                ui.label(stats.questions_generated.to_string());
                ui.end_row();

                ui.label("Осталось тестов сегодня");
                if stats.is_premium {
                    ui.label("без ограничений");
                } else {
                    ui.label(format!("{} из {}", stats.tests_remaining, stats.max_tests));
                }
                ui.end_row();

                ui.label("Пройдено тестов");
                ui.label(stats.tests_completed.to_string());
                ui.end_row();

                ui.label("Средний результат");
                ui.label(
                    stats
                        .average_score
                        .map(|s| format!("{}%", s))
                        .unwrap_or_else(|| "-".to_string()),
                );
                ui.end_row();
            });
    });

    ui.add_space(12.0);
    ui.label(egui::RichText::new("Тариф").strong());
    ui.horizontal(|ui| {
        for candidate in [Tier::Free, Tier::Premium] {
            tier_card(ui, candidate, candidate == tier, busy, actions);
        }
    });
}

fn tier_card(ui: &mut egui::Ui, tier: Tier, active: bool, busy: bool, actions: &mut Vec<Action>) {
    ui.group(|ui| {
        ui.set_min_width(220.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(tier.label()).heading());
            let range = tier.question_range();
            ui.label(format!("{} тестов в день", tier.daily_tests()));
            ui.label(format!("{}-{} вопросов в тесте", range.start(), range.end()));
            ui.label(format!("до {} символов текста", tier.max_text_chars()));
            ui.label(format!("файлы до {}", tier.max_document_label()));
            if tier.is_premium() {
                ui.label("Все модели, редактирование вопросов");
            }
            ui.add_space(6.0);

            if active {
                ui.label(egui::RichText::new("✓ Текущий тариф").strong());
            } else if ui
                .add_enabled(!busy, egui::Button::new("Выбрать"))
                .clicked()
            {
                actions.push(Action::SwitchTier(tier));
            }
        });
    });
}
