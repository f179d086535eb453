use super::{Action, notify_err};
use crate::export::ExportFormat;
use crate::models::{QuizState, Transition};
use crate::pages::{Notice, TakePage};
use eframe::egui;

const CORRECT: egui::Color32 = egui::Color32::from_rgb(46, 160, 67);
const WRONG: egui::Color32 = egui::Color32::from_rgb(220, 80, 60);

enum Step {
    Prev,
    Skip,
    Next,
    Finish,
}

enum ResultStep {
    Review,
    Retake,
    Other,
}

/// Widget state of the take screen that the controller does not own.
#[derive(Default)]
pub struct TakeView {
    remote_id: String,
    confirm_unanswered: Option<usize>,
}

impl TakeView {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        page: &mut TakePage,
        busy: bool,
        actions: &mut Vec<Action>,
    ) {
        match page.session().state() {
            QuizState::Upload => self.show_upload(ui, page, busy, actions),
            QuizState::InProgress => self.show_question(ui, page, actions),
            QuizState::Results => show_results(ui, page, busy, actions),
            QuizState::Review => show_review(ui, page, actions),
        }

        if !page.session().is_in_progress() {
            self.confirm_unanswered = None;
        }
        if let Some(unanswered) = self.confirm_unanswered {
            self.show_finish_confirmation(ui.ctx(), page, unanswered, actions);
        }
    }

    fn show_upload(
        &mut self,
        ui: &mut egui::Ui,
        page: &mut TakePage,
        busy: bool,
        actions: &mut Vec<Action>,
    ) {
        ui.heading("Пройти тест");
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.label(egui::RichText::new("Из файла").strong());
            ui.label("JSON или TXT, до 1 МБ");
            if ui.button("📂 Выбрать файл").clicked() {
                actions.push(Action::PickTestFile);
            }
        });

        ui.group(|ui| {
            ui.label(egui::RichText::new("По номеру теста").strong());
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.remote_id);
                if ui
                    .add_enabled(!busy, egui::Button::new("Загрузить"))
                    .clicked()
                {
                    let id = self.remote_id.trim();
                    if id.is_empty() {
                        actions.push(Action::Notify(Notice::warning("Введите номер теста")));
                    } else {
                        actions.push(Action::FetchTest(id.to_string()));
                    }
                }
                if busy {
                    ui.spinner();
                }
            });
        });

        if page.has_stored_test() {
            ui.group(|ui| {
                ui.label(egui::RichText::new("Созданный тест").strong());
                if ui.button("▶ Начать").clicked() {
                    let result = page.load_stored();
                    notify_err(actions, result);
                }
            });
        }
    }

    fn show_question(&mut self, ui: &mut egui::Ui, page: &mut TakePage, actions: &mut Vec<Action>) {
        let session = page.session();
        if let Some(source) = page.source() {
            ui.label(egui::RichText::new(source.describe()).weak());
        }
        ui.horizontal(|ui| {
            ui.label(session.progress_text());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("⏱ {}", session.timer_text()));
            });
        });
        ui.add(egui::ProgressBar::new(session.progress_fraction()));
        ui.add_space(8.0);

        let Some(question) = session.current_question().cloned() else {
            return;
        };
        let selected = session.current_answer().map(str::to_string);
        let answered = session.answered_flags();
        let current = session.current_index();
        let is_last = session.is_last_question();

        ui.label(egui::RichText::new(&question.prompt).heading());
        ui.add_space(8.0);
        for answer in &question.answers {
            let checked = selected.as_deref() == Some(answer.label.as_str());
            if ui.radio(checked, answer.label.as_str()).clicked() {
                let result = page.session_mut().select_answer(&answer.label);
                notify_err(actions, result);
            }
        }

        ui.add_space(12.0);
        let mut step = None;
        ui.horizontal(|ui| {
            if ui.add_enabled(current > 0, egui::Button::new("← Назад")).clicked() {
                step = Some(Step::Prev);
            }
            if ui.button("Пропустить").clicked() {
                step = Some(Step::Skip);
            }
            let next_label = if is_last { "Завершить" } else { "Далее →" };
            if ui.button(next_label).clicked() {
                step = Some(Step::Next);
            }
            if !is_last && ui.button("Завершить тест").clicked() {
                step = Some(Step::Finish);
            }
        });

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for (i, done) in answered.iter().enumerate() {
                let mut text = egui::RichText::new((i + 1).to_string());
                if *done {
                    text = text.color(CORRECT);
                }
                if ui.selectable_label(i == current, text).clicked() {
                    let result = page.session_mut().go_to(i);
                    notify_err(actions, result);
                }
            }
        });

        ui.add_space(12.0);
        if ui.small_button("Прервать тест").clicked() {
            let result = page.session_mut().abort();
            notify_err(actions, result);
        }

        if let Some(step) = step {
            let session = page.session_mut();
            let result = match step {
                Step::Prev => session.prev(),
                Step::Skip => session.skip(),
                Step::Next => session.next(),
                Step::Finish => session.finish(false),
            };
            match result {
                Ok(Transition::NeedsConfirmation { unanswered }) => {
                    self.confirm_unanswered = Some(unanswered);
                }
                Ok(_) => {}
                Err(e) => actions.push(Action::Notify(e.into())),
            }
        }
    }

    fn show_finish_confirmation(
        &mut self,
        ctx: &egui::Context,
        page: &mut TakePage,
        unanswered: usize,
        actions: &mut Vec<Action>,
    ) {
        egui::Window::new("Завершить тест?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Вопросов без ответа: {}", unanswered));
                ui.horizontal(|ui| {
                    if ui.button("Вернуться к тесту").clicked() {
                        self.confirm_unanswered = None;
                    }
                    if ui.button("Завершить").clicked() {
                        self.confirm_unanswered = None;
                        let result = page.session_mut().finish(true);
                        notify_err(actions, result);
                    }
                });
            });
    }
}

fn show_results(ui: &mut egui::Ui, page: &mut TakePage, busy: bool, actions: &mut Vec<Action>) {
    let Some(summary) = page.session().summary() else {
        return;
    };

    ui.heading("Результаты");
    ui.add_space(8.0);
    let color = if summary.score_percentage >= 50 { CORRECT } else { WRONG };
    ui.label(
        egui::RichText::new(format!("{}%", summary.score_percentage))
            .size(48.0)
            .color(color),
    );
    ui.label(format!(
        "Правильных ответов: {} из {}",
        summary.correct_count, summary.total_questions
    ));
    ui.label(format!("Неправильных: {}", summary.incorrect_count()));
    ui.label(format!("Затраченное время: {}", summary.time_spent_formatted()));
    ui.add_space(12.0);

    let mut step = None;
    ui.horizontal(|ui| {
        if ui.button("Разбор ответов").clicked() {
            step = Some(ResultStep::Review);
        }
        if ui.button("Пройти заново").clicked() {
            step = Some(ResultStep::Retake);
        }
        if ui.button("Другой тест").clicked() {
            step = Some(ResultStep::Other);
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.menu_button("💾 Скачать результаты", |ui| {
            for format in ExportFormat::ALL {
                if ui.button(format.label()).clicked() {
                    actions.push(Action::SaveResults(format));
                    ui.close_menu();
                }
            }
        });
        ui.add_enabled_ui(!busy, |ui| {
            ui.menu_button("Отчёт с сервера", |ui| {
                for format in ExportFormat::ALL {
                    if ui.button(format.label()).clicked() {
                        actions.push(Action::RemoteExport(format));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    let result = match step {
        Some(ResultStep::Review) => page.session_mut().review(),
        Some(ResultStep::Retake) => page.session_mut().retake(),
        Some(ResultStep::Other) => {
            page.reset();
            Ok(())
        }
        None => Ok(()),
    };
    notify_err(actions, result);
}

fn show_review(ui: &mut egui::Ui, page: &mut TakePage, actions: &mut Vec<Action>) {
    ui.horizontal(|ui| {
        ui.heading("Разбор ответов");
        if ui.button("← К результатам").clicked() {
            let result = page.session_mut().back_to_results();
            notify_err(actions, result);
        }
    });
    let Some(summary) = page.session().summary() else {
        return;
    };

    egui::ScrollArea::vertical()
        .id_salt("review")
        .show(ui, |ui| {
            for (i, detail) in summary.per_question_detail.iter().enumerate() {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.label(egui::RichText::new(format!("{}. {}", i + 1, detail.question)).strong());
                    let answer = detail.user_answer.as_deref().unwrap_or("Не отвечено");
                    if detail.is_correct {
                        ui.colored_label(CORRECT, format!("✓ {}", answer));
                    } else {
                        ui.colored_label(WRONG, format!("✗ {}", answer));
                        ui.label(format!("Правильный ответ: {}", detail.correct_answer));
                    }
                    if let Some(explanation) = &detail.explanation {
                        ui.label(egui::RichText::new(explanation).italics().weak());
                    }
                });
                ui.add_space(4.0);
            }
        });
}
