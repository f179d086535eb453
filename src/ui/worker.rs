//! One background thread per request, reporting back over a channel that
//! the UI polls every frame.

use crate::api::{BookCatalog, PremiumStatus};
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::models::{GenerationRequest, Question, Tier};
use eframe::egui;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Result of a background request, with whatever the UI needs to apply it.
#[derive(Debug)]
pub enum Reply {
    PremiumStatus(AppResult<PremiumStatus>),
    TierSwitched(Tier, AppResult<bool>),
    Generated(GenerationRequest, AppResult<Vec<Question>>),
    TestFetched(String, AppResult<Vec<Question>>),
    Books(AppResult<BookCatalog>),
    RatingSent(AppResult<()>),
    RemoteExport(ExportFormat, AppResult<Vec<u8>>),
}

struct Pending {
    label: &'static str,
    rx: Receiver<Reply>,
}

/// At most one request in flight.
#[derive(Default)]
pub struct Worker {
    pending: Option<Pending>,
}

impl Worker {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// What is running, for the spinner text.
    pub fn busy_label(&self) -> Option<&'static str> {
        self.pending.as_ref().map(|p| p.label)
    }

    /// Runs `job` on a new thread. Refused (returns `false`) while another
    /// request is still in flight.
    pub fn spawn<F>(&mut self, ctx: &egui::Context, label: &'static str, job: F) -> bool
    where
        F: FnOnce() -> Reply + Send + 'static,
    {
        if self.is_busy() {
            log::debug!("Request '{}' refused, '{:?}' in flight", label, self.busy_label());
            return false;
        }

        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let reply = job();
            // The receiver is gone only if the app has shut down.
            let _ = tx.send(reply);
            ctx.request_repaint();
        });

        log::debug!("Request '{}' started", label);
        self.pending = Some(Pending { label, rx });
        true
    }

    pub fn poll(&mut self) -> Option<Reply> {
        let pending = self.pending.as_ref()?;
        match pending.rx.try_recv() {
            Ok(reply) => {
                self.pending = None;
                Some(reply)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Request '{}' ended without a reply", pending.label);
                self.pending = None;
                None
            }
        }
    }
}
