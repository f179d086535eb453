//! Transient notifications in the top-right corner.

use crate::pages::{Notice, NoticeLevel};
use eframe::egui;
use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

struct Toast {
    notice: Notice,
    shown_at: Instant,
}

#[derive(Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn push(&mut self, notice: Notice) {
        self.push_at(notice, Instant::now());
    }

    pub fn push_at(&mut self, notice: Notice, now: Instant) {
        match notice.level {
            NoticeLevel::Error => log::warn!("Error shown to user: {}", notice.text),
            _ => log::debug!("Toast: {}", notice.text),
        }
        self.items.push(Toast {
            notice,
            shown_at: now,
        });
    }

    /// Drops toasts older than [`TOAST_LIFETIME`].
    pub fn prune(&mut self, now: Instant) {
        self.items
            .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_LIFETIME);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|t| t.notice.text.as_str())
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.prune(now);
        if self.items.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 48.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (i, toast) in self.items.iter().enumerate() {
                    egui::Frame::none()
                        .fill(level_color(toast.notice.level))
                        .rounding(6.0)
                        .inner_margin(10.0)
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(&toast.notice.text)
                                        .color(egui::Color32::WHITE),
                                );
                                if ui.small_button("✕").clicked() {
                                    dismissed = Some(i);
                                }
                            });
                        });
                    ui.add_space(6.0);
                }
            });

        if let Some(i) = dismissed {
            self.items.remove(i);
        }

        // Wake up again when the oldest toast expires.
        if let Some(oldest) = self.items.iter().map(|t| t.shown_at).min() {
            let left = TOAST_LIFETIME.saturating_sub(now.saturating_duration_since(oldest));
            ctx.request_repaint_after(left);
        }
    }
}

fn level_color(level: NoticeLevel) -> egui::Color32 {
    match level {
        NoticeLevel::Success => egui::Color32::from_rgb(46, 125, 50),
        NoticeLevel::Info => egui::Color32::from_rgb(2, 119, 189),
        NoticeLevel::Warning => egui::Color32::from_rgb(239, 108, 0),
        NoticeLevel::Error => egui::Color32::from_rgb(198, 40, 40),
    }
}
