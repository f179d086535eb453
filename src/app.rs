//! Application shell: navigation, toasts, dialogs, and the background
//! requests behind the page controllers.

use chrono::Utc;
use eframe::egui;
use iceq_app::api::QuizApi;
use iceq_app::config::Config;
use iceq_app::database::{LocalStore, StatsStore, Theme};
use iceq_app::errors::AppResult;
use iceq_app::export::{self, ExportFormat};
use iceq_app::pages::home::switch_tier;
use iceq_app::pages::take::TestSource;
use iceq_app::pages::{BooksPage, CreatePage, HomePage, Notice, PreviewPage, TakePage};
use iceq_app::ui::take::TakeView;
use iceq_app::ui::{self as screens, Action, Reply, Screen, Toasts, Worker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct IceqApp {
    config: Config,
    api: Arc<dyn QuizApi>,
    store: LocalStore,
    theme: Theme,
    screen: Screen,

    home: HomePage,
    create: CreatePage,
    preview: PreviewPage,
    take: TakePage,
    take_view: TakeView,
    books: BooksPage,

    toasts: Toasts,
    worker: Worker,

    books_requested: bool,
    /// Screen the user asked for while leaving would lose work.
    pending_screen: Option<Screen>,
    show_confirmation_dialog: bool,
    allowed_to_close: bool,
}

impl eframe::App for IceqApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(reply) = self.worker.poll() {
            self.handle_reply(reply);
        }

        let mut actions = Vec::new();
        self.render_top_bar(ctx, &mut actions);
        self.render_screen(ctx, &mut actions);

        for action in actions {
            self.handle_action(ctx, action);
        }

        // First visit to the books screen loads the catalogue.
        if self.screen == Screen::Books && !self.books_requested && !self.worker.is_busy() {
            self.books_requested = true;
            self.handle_action(ctx, Action::LoadBooks);
        }

        self.toasts.show(ctx);

        // Keep the timer ticking.
        if self.take.session().is_in_progress() {
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        if ctx.input(|i| i.viewport().close_requested())
            && !self.allowed_to_close
            && self.work_at_risk()
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Закрыть приложение?")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Несохранённый прогресс будет потерян.");
                    ui.horizontal(|ui| {
                        if ui.button("Остаться").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }
                        if ui.button("Закрыть").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if let Some(target) = self.pending_screen {
            let mut decision = None;
            egui::Window::new("Покинуть страницу?")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(self.leave_warning());
                    ui.horizontal(|ui| {
                        if ui.button("Остаться").clicked() {
                            decision = Some(false);
                        }
                        if ui.button("Покинуть").clicked() {
                            decision = Some(true);
                        }
                    });
                });

            match decision {
                Some(true) => {
                    self.pending_screen = None;
                    self.discard_work();
                    self.enter(target);
                }
                Some(false) => self.pending_screen = None,
                None => {}
            }
        }
    }
}

impl IceqApp {
    pub fn new(
        ctx: &egui::Context,
        config: Config,
        store: LocalStore,
        stats: Arc<dyn StatsStore>,
        api: Arc<dyn QuizApi>,
    ) -> Self {
        let theme = store.theme();
        apply_theme(ctx, theme);

        let home = HomePage::new(api.clone(), stats.clone());
        let mut create = CreatePage::new(
            api.clone(),
            stats.clone(),
            store.clone(),
            config.demo_fallback,
        );
        create.set_tier(home.tier());

        let mut app = Self {
            preview: PreviewPage::new(store.clone()),
            take: TakePage::new(api.clone(), stats, store.clone()),
            books: BooksPage::new(api.clone(), store.clone()),
            take_view: TakeView::default(),
            home,
            create,
            config,
            api,
            store,
            theme,
            screen: Screen::Home,
            toasts: Toasts::default(),
            worker: Worker::default(),
            books_requested: false,
            pending_screen: None,
            show_confirmation_dialog: false,
            allowed_to_close: false,
        };
        app.handle_action(ctx, Action::RefreshPremium);
        app
    }

    fn render_top_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("ICEQ").strong());
                ui.separator();
                for screen in Screen::ALL {
                    if ui
                        .selectable_label(self.screen == screen, screen.title())
                        .clicked()
                    {
                        actions.push(Action::Navigate(screen));
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let icon = match self.theme {
                        Theme::Dark => "☀",
                        Theme::Light => "🌙",
                    };
                    if ui.button(icon).on_hover_text("Сменить тему").clicked() {
                        self.toggle_theme(ui.ctx());
                    }
                    ui.label(self.home.tier().label());
                    if let Some(label) = self.worker.busy_label() {
                        ui.label(label);
                        ui.spinner();
                    }
                });
            });
        });
    }

    fn render_screen(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let busy = self.worker.is_busy();
        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Home => screens::home::show(ui, &self.home, busy, actions),
            Screen::Create => screens::create::show(ui, &mut self.create, busy, actions),
            Screen::Preview => {
                screens::preview::show(ui, &mut self.preview, self.home.tier(), actions)
            }
            Screen::Take => self.take_view.show(ui, &mut self.take, busy, actions),
            Screen::Books => screens::books::show(ui, &mut self.books, busy, actions),
        });
    }

    fn handle_action(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Navigate(screen) => self.navigate(screen),
            Action::Notify(notice) => self.toasts.push(notice),
            Action::RefreshPremium => {
                let api = self.api.clone();
                self.spawn(ctx, "Обновление статистики", move || {
                    Reply::PremiumStatus(api.premium_status())
                });
            }
            Action::SwitchTier(tier) => {
                let api = self.api.clone();
                self.spawn(ctx, "Смена тарифа", move || {
                    Reply::TierSwitched(tier, switch_tier(api.as_ref(), tier))
                });
            }
            Action::Generate(request) => {
                let api = self.api.clone();
                log::info!(
                    "Generating {} questions with {:?}",
                    request.question_number,
                    request.model
                );
                self.spawn(ctx, "Генерация теста", move || {
                    let result = api.generate(&request);
                    Reply::Generated(request, result)
                });
            }
            Action::PickDocument => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Документы", &["txt", "pdf", "docx"])
                    .pick_file()
                {
                    match self.create.load_document(&path) {
                        Ok(Some(notice)) => self.toasts.push(notice),
                        Ok(None) => self.toasts.push(Notice::success("Файл загружен")),
                        Err(e) => self.toasts.push(e.into()),
                    }
                }
            }
            Action::PickTestFile => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Тесты", &["json", "txt"])
                    .pick_file()
                {
                    match self.take.load_file(&path) {
                        Ok(()) => self.toasts.push(Notice::success("Тест загружен")),
                        Err(e) => self.toasts.push(e.into()),
                    }
                }
            }
            Action::FetchTest(id) => {
                let api = self.api.clone();
                self.spawn(ctx, "Загрузка теста", move || {
                    let result = api.fetch_test(&id);
                    Reply::TestFetched(id, result)
                });
            }
            Action::StartTest => {
                let started = self
                    .preview
                    .start_test()
                    .and_then(|questions| self.take.start(questions, TestSource::Stored));
                match started {
                    Ok(()) => self.enter(Screen::Take),
                    Err(e) => self.toasts.push(e.into()),
                }
            }
            Action::SaveResults(format) => {
                let result = self
                    .take
                    .download_results(format, Utc::now())
                    .and_then(|(name, contents)| {
                        self.save_as(format, &name, contents.as_bytes())
                    });
                self.report_saved(result, "Результаты сохранены");
            }
            Action::RemoteExport(format) => match self.take.remote_export_payload() {
                Ok((questions, answers)) => {
                    let api = self.api.clone();
                    self.spawn(ctx, "Экспорт на сервере", move || {
                        Reply::RemoteExport(format, api.export_remote(&questions, &answers, format))
                    });
                }
                Err(e) => self.toasts.push(e.into()),
            },
            Action::ExportTest(format) => {
                let now = Utc::now();
                let result = self.preview.export_test(format, now).and_then(|contents| {
                    self.save_as(format, &export::test_filename(format, now), contents.as_bytes())
                });
                self.report_saved(result, "Тест экспортирован");
            }
            Action::LoadBooks => {
                let api = self.api.clone();
                self.spawn(ctx, "Загрузка книг", move || Reply::Books(api.books()));
            }
            Action::RefreshRecommendations => {
                let api = self.api.clone();
                let (favorites, ratings) = self.books.preferences();
                self.spawn(ctx, "Обновление рекомендаций", move || {
                    if let Err(e) = api.refresh_recommendations(&favorites, &ratings) {
                        log::warn!("Failed to refresh recommendations: {}", e);
                    }
                    Reply::Books(api.books())
                });
            }
            Action::SendRating { book_id, rating } => {
                let api = self.api.clone();
                self.spawn(ctx, "Отправка оценки", move || {
                    Reply::RatingSent(api.update_rating(&book_id, rating))
                });
            }
        }
    }

    fn handle_reply(&mut self, reply: Reply) {
        match reply {
            Reply::PremiumStatus(result) => {
                if let Some(notice) = self.home.apply_premium_status(result) {
                    self.toasts.push(notice);
                }
                self.create.set_tier(self.home.tier());
            }
            Reply::TierSwitched(tier, result) => {
                match result.and_then(|changed| self.home.apply_tier_switch(tier, changed)) {
                    Ok(notice) => self.toasts.push(notice),
                    Err(e) => self.toasts.push(e.into()),
                }
                self.create.set_tier(self.home.tier());
            }
            Reply::Generated(request, result) => match self.create.complete(request, result) {
                Ok(outcome) => {
                    self.toasts.push(if outcome.is_demo {
                        Notice::warning("Сервер недоступен, показан демонстрационный тест")
                    } else {
                        Notice::success(format!(
                            "Тест создан: {} вопросов",
                            outcome.test.question_count()
                        ))
                    });
                    self.home.reload();
                    self.navigate(Screen::Preview);
                }
                Err(e) => self.toasts.push(e.into()),
            },
            Reply::TestFetched(id, result) => match self.take.load_fetched(&id, result) {
                Ok(()) => self.toasts.push(Notice::success("Тест загружен")),
                Err(e) => self.toasts.push(e.into()),
            },
            Reply::Books(result) => {
                if let Some(notice) = self.books.apply_catalog(result) {
                    self.toasts.push(notice);
                }
            }
            Reply::RatingSent(result) => {
                if let Err(e) = result {
                    log::warn!("Rating was kept locally only: {}", e);
                }
            }
            Reply::RemoteExport(format, result) => {
                let saved = result.and_then(|bytes| {
                    let name = export::export_filename(format, Utc::now());
                    self.save_as(format, &name, &bytes)
                });
                self.report_saved(saved, "Отчёт сохранён");
            }
        }
    }

    fn spawn<F>(&mut self, ctx: &egui::Context, label: &'static str, job: F)
    where
        F: FnOnce() -> Reply + Send + 'static,
    {
        if !self.worker.spawn(ctx, label, job) {
            self.toasts
                .push(Notice::info("Дождитесь завершения текущего запроса"));
        }
    }

    /// Asks where to save and writes the file. `Ok(None)` when the dialog was cancelled.
    fn save_as(
        &self,
        format: ExportFormat,
        file_name: &str,
        contents: &[u8],
    ) -> AppResult<Option<PathBuf>> {
        let Some(path) = rfd::FileDialog::new()
            .set_directory(&self.config.export_dir)
            .set_file_name(file_name)
            .add_filter(format.label(), &[format.extension()])
            .save_file()
        else {
            return Ok(None);
        };
        export::write_export_bytes(&path, contents)?;
        Ok(Some(path))
    }

    fn report_saved(&mut self, result: AppResult<Option<PathBuf>>, message: &str) {
        match result {
            Ok(Some(path)) => self
                .toasts
                .push(Notice::success(format!("{}: {}", message, path.display()))),
            Ok(None) => {}
            Err(e) => self.toasts.push(e.into()),
        }
    }

    /// Leaving the take screen mid-test or the editor with unsaved changes
    /// goes through a confirmation first.
    fn navigate(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }
        let at_risk = match self.screen {
            Screen::Take => self.take.session().is_in_progress(),
            Screen::Preview => self.preview.has_unsaved_changes(),
            _ => false,
        };
        if at_risk {
            self.pending_screen = Some(screen);
        } else {
            self.enter(screen);
        }
    }

    fn enter(&mut self, screen: Screen) {
        match screen {
            Screen::Home => self.home.reload(),
            Screen::Create => self.create.set_tier(self.home.tier()),
            Screen::Preview => {
                if let Err(e) = self.preview.load() {
                    self.toasts.push(e.into());
                }
            }
            Screen::Take | Screen::Books => {}
        }
        log::debug!("Screen {:?} -> {:?}", self.screen, screen);
        self.screen = screen;
    }

    fn leave_warning(&self) -> &'static str {
        if self.take.session().is_in_progress() {
            "Тест ещё не завершён. Прогресс будет потерян."
        } else {
            "Есть несохранённые изменения в тесте. Они будут потеряны."
        }
    }

    fn discard_work(&mut self) {
        if self.take.session().is_in_progress() {
            if let Err(e) = self.take.session_mut().abort() {
                log::warn!("Failed to abort test: {}", e);
            }
        }
        if self.preview.has_unsaved_changes() {
            self.preview.cancel_editing();
        }
    }

    fn work_at_risk(&self) -> bool {
        self.take.session().is_in_progress() || self.preview.has_unsaved_changes()
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme = self.theme.toggled();
        apply_theme(ctx, self.theme);
        if let Err(e) = self.store.set_theme(self.theme) {
            log::warn!("Failed to save theme: {}", e);
        }
    }
}

fn apply_theme(ctx: &egui::Context, theme: Theme) {
    ctx.set_visuals(match theme {
        Theme::Dark => egui::Visuals::dark(),
        Theme::Light => egui::Visuals::light(),
    });
}
