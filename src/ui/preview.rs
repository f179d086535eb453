use super::{Action, Screen, notify_err};
use crate::export::ExportFormat;
use crate::models::{Question, Tier};
use crate::pages::{Notice, PreviewPage};
use chrono::Utc;
use eframe::egui;

/// Editor changes collected while drawing and applied afterwards, so the
/// question list is not mutated while it is being iterated.
enum Edit {
    Prompt(usize, String),
    Explanation(usize, String),
    AnswerLabel(usize, usize, String),
    ToggleCorrect(usize, usize),
    AddAnswer(usize),
    DeleteAnswer(usize, usize),
    Duplicate(usize),
    Delete(usize),
}

pub fn show(ui: &mut egui::Ui, page: &mut PreviewPage, tier: Tier, actions: &mut Vec<Action>) {
    ui.heading("Предпросмотр теста");

    let Some(test) = page.test() else {
        ui.label("Сгенерированный тест не найден.");
        if ui.button("Создать тест").clicked() {
            actions.push(Action::Navigate(Screen::Create));
        }
        return;
    };

    let mut info = format!("{} вопросов", test.question_count());
    if let Some(model) = page.model_name() {
        info.push_str(&format!(" · модель {}", model));
    }
    if let Some(created) = page.created_label(Utc::now()) {
        info.push_str(&format!(" · {}", created));
    }
    ui.label(info);
    ui.add_space(8.0);

    if page.is_editing() {
        editor_toolbar(ui, page, actions);
    } else {
        ui.horizontal(|ui| {
            if ui.button("▶ Начать тест").clicked() {
                actions.push(Action::StartTest);
            }
            let edit_label = if tier.is_premium() {
                "✏ Редактировать"
            } else {
                "🔒 Редактировать"
            };
            if ui.button(edit_label).clicked() {
                let result = page.start_editing(tier);
                notify_err(actions, result);
            }
            ui.menu_button("Экспорт", |ui| {
                for format in ExportFormat::ALL {
                    if ui.button(format.label()).clicked() {
                        actions.push(Action::ExportTest(format));
                        ui.close_menu();
                    }
                }
            });
            if ui.button("Создать новый").clicked() {
                match page.create_new() {
                    Ok(()) => actions.push(Action::Navigate(Screen::Create)),
                    Err(e) => actions.push(Action::Notify(e.into())),
                }
            }
        });
    }
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("preview_questions")
        .show(ui, |ui| {
            if page.is_editing() {
                question_editor(ui, page);
            } else {
                for (i, question) in page.questions().iter().enumerate() {
                    question_card(ui, i, question);
                }
            }
        });
}

fn editor_toolbar(ui: &mut egui::Ui, page: &mut PreviewPage, actions: &mut Vec<Action>) {
    ui.horizontal(|ui| {
        if ui.button("＋ Вопрос").clicked() {
            page.editor_mut().add_question();
        }
        if ui.button("Исправить автоматически").clicked() {
            let fixed = page.editor_mut().auto_fix();
            actions.push(Action::Notify(if fixed > 0 {
                Notice::success(format!("Исправлено вопросов: {}", fixed))
            } else {
                Notice::info("Исправлять нечего")
            }));
        }
        if ui.button("💾 Сохранить").clicked() {
            match page.save() {
                Ok(()) => actions.push(Action::Notify(Notice::success("Изменения сохранены"))),
                Err(e) => actions.push(Action::Notify(e.into())),
            }
        }
        if ui.button("Отмена").clicked() {
            page.cancel_editing();
        }
        if page.has_unsaved_changes() {
            ui.label(egui::RichText::new("● есть несохранённые изменения").weak());
        }
    });
}

fn question_card(ui: &mut egui::Ui, index: usize, question: &Question) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.label(egui::RichText::new(format!("{}. {}", index + 1, question.prompt)).strong());
        for answer in &question.answers {
            if answer.is_correct {
                ui.colored_label(
                    egui::Color32::from_rgb(46, 160, 67),
                    format!("✓ {}", answer.label),
                );
            } else {
                ui.label(format!("   {}", answer.label));
            }
        }
        if let Some(explanation) = &question.explanation {
            ui.label(egui::RichText::new(explanation).italics().weak());
        }
    });
    ui.add_space(4.0);
}

fn question_editor(ui: &mut egui::Ui, page: &mut PreviewPage) {
    let problems = page.editor().validate();
    let mut edits = Vec::new();

    for (qi, question) in page.questions().iter().enumerate() {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("Вопрос {}", qi + 1)).strong());
                if ui.small_button("Дублировать").clicked() {
                    edits.push(Edit::Duplicate(qi));
                }
                if ui.small_button("🗑").clicked() {
                    edits.push(Edit::Delete(qi));
                }
            });

            let mut prompt = question.prompt.clone();
            if ui
                .add(egui::TextEdit::multiline(&mut prompt).desired_rows(2))
                .changed()
            {
                edits.push(Edit::Prompt(qi, prompt));
            }

            for (ai, answer) in question.answers.iter().enumerate() {
                ui.horizontal(|ui| {
                    let mut correct = answer.is_correct;
                    if ui.checkbox(&mut correct, "").changed() {
                        edits.push(Edit::ToggleCorrect(qi, ai));
                    }
                    let mut label = answer.label.clone();
                    if ui.text_edit_singleline(&mut label).changed() {
                        edits.push(Edit::AnswerLabel(qi, ai, label));
                    }
                    if ui.small_button("✕").clicked() {
                        edits.push(Edit::DeleteAnswer(qi, ai));
                    }
                });
            }
            if ui.small_button("＋ Вариант").clicked() {
                edits.push(Edit::AddAnswer(qi));
            }

            let mut explanation = question.explanation.clone().unwrap_or_default();
            ui.horizontal(|ui| {
                ui.label("Объяснение:");
                if ui.text_edit_singleline(&mut explanation).changed() {
                    edits.push(Edit::Explanation(qi, explanation));
                }
            });

            if let Some(errors) = problems.get(&qi) {
                for error in errors {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 60), format!("⚠ {}", error));
                }
            }
        });
        ui.add_space(4.0);
    }

    let editor = page.editor_mut();
    for edit in edits {
        match edit {
            Edit::Prompt(q, text) => editor.set_prompt(q, &text),
            Edit::Explanation(q, text) => editor.set_explanation(q, &text),
            Edit::AnswerLabel(q, a, text) => editor.set_answer_label(q, a, &text),
            Edit::ToggleCorrect(q, a) => editor.toggle_correct(q, a),
            Edit::AddAnswer(q) => editor.add_answer(q),
            Edit::DeleteAnswer(q, a) => {
                editor.delete_answer(q, a);
            }
            Edit::Duplicate(q) => {
                editor.duplicate_question(q);
            }
            Edit::Delete(q) => {
                editor.delete_question(q);
            }
        }
    }
}
