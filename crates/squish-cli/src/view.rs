//! Display surface driven by a [`Session`](crate::session::Session).
//!
//! The session never renders anything itself. It emits [`ViewUpdate`]s and a
//! [`View`] decides how to show them; [`ViewState`] folds updates into the
//! current picture of the screen.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub const SUBMIT_LABEL: &str = "Compress File";
pub const PROCESSING_LABEL: &str = "Processing...";
pub const STATS_LOADING: &str = "Loading...";
pub const STATS_ERROR: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatSlot {
    Views,
    Pdfs,
    Images,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Show the file details panel and hide the drop target.
    FileShown { name: String, size: String },
    /// Reset the file input, show the drop target and hide the details panel.
    FileCleared,
    SubmitEnabled(bool),
    /// Swap the submit label for the processing indicator, or restore it.
    Processing(bool),
    Status(Status),
    StatusHidden,
    Stat { slot: StatSlot, text: String },
}

pub trait View: Send + Sync {
    fn apply(&self, update: ViewUpdate);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: String,
    pub spinner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetails {
    pub name: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub drop_zone_visible: bool,
    pub details: Option<FileDetails>,
    pub submit: SubmitControl,
    pub status: Option<Status>,
    pub views: String,
    pub pdfs: String,
    pub images: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            drop_zone_visible: true,
            details: None,
            submit: SubmitControl {
                enabled: false,
                label: SUBMIT_LABEL.to_string(),
                spinner: false,
            },
            status: None,
            views: STATS_LOADING.to_string(),
            pdfs: STATS_LOADING.to_string(),
            images: STATS_LOADING.to_string(),
        }
    }
}

impl ViewState {
    pub fn apply(&mut self, update: ViewUpdate) {
        match update {
            ViewUpdate::FileShown { name, size } => {
                self.drop_zone_visible = false;
                self.details = Some(FileDetails { name, size });
            }
            ViewUpdate::FileCleared => {
                self.drop_zone_visible = true;
                self.details = None;
            }
            ViewUpdate::SubmitEnabled(enabled) => self.submit.enabled = enabled,
            ViewUpdate::Processing(true) => {
                self.submit.label = PROCESSING_LABEL.to_string();
                self.submit.spinner = true;
            }
            ViewUpdate::Processing(false) => {
                self.submit.label = SUBMIT_LABEL.to_string();
                self.submit.spinner = false;
            }
            ViewUpdate::Status(status) => self.status = Some(status),
            ViewUpdate::StatusHidden => self.status = None,
            ViewUpdate::Stat { slot, text } => match slot {
                StatSlot::Views => self.views = text,
                StatSlot::Pdfs => self.pdfs = text,
                StatSlot::Images => self.images = text,
            },
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.message.as_str())
    }
}

/// Headless view that keeps the current state and every update it saw.
#[derive(Debug, Default)]
pub struct MemoryView {
    state: Mutex<ViewState>,
    history: Mutex<Vec<ViewUpdate>>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        lock(&self.state).clone()
    }

    pub fn history(&self) -> Vec<ViewUpdate> {
        lock(&self.history).clone()
    }
}

impl View for MemoryView {
    fn apply(&self, update: ViewUpdate) {
        lock(&self.history).push(update.clone());
        lock(&self.state).apply(update);
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
