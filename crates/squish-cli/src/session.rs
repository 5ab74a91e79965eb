//! Client state for one compression page.
//!
//! A [`Session`] owns the currently selected file and the target-size field,
//! decides when submission is allowed, runs the compress round trip and keeps
//! the usage counters fresh. It is created when the front end starts
//! ([`Session::activate`]) and torn down with [`Session::shutdown`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use squish_api_client::{ApiClient, ApiError, StatsMode};
use squish_core::validation::{ensure_supported, ensure_target_smaller, ensure_within_upload_limit};
use squish_core::{format_bytes, format_count, ClientConfig, SelectedFile, SizeUnit, SquishError, TargetSize};
use tokio::task::JoinSet;

use crate::download::DownloadSink;
use crate::view::{lock, StatSlot, Status, StatusKind, View, ViewUpdate, STATS_ERROR};

pub const SERVER_FAILURE_MESSAGE: &str = "Failed to compress file.";
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "An error occurred during compression. Make sure backend is running.";

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub max_upload_bytes: u64,
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// How a call to [`Session::submit`] ended.
#[derive(Debug)]
pub enum Submission {
    Downloaded { path: PathBuf, bytes: u64 },
    /// Stopped by a client-side check; no request was sent.
    Rejected(SquishError),
    /// The service answered with an error status.
    ServerError(String),
    /// The request never completed.
    TransportError,
    /// A local step (reading the upload, saving the result) failed.
    Failed(String),
    /// Submit was not enabled, or a submission was already in flight.
    Skipped,
}

impl Submission {
    pub fn is_success(&self) -> bool {
        matches!(self, Submission::Downloaded { .. })
    }
}

#[derive(Debug, Default)]
struct Selection {
    file: Option<SelectedFile>,
    target_input: String,
    unit: SizeUnit,
}

impl Selection {
    fn target(&self) -> Result<TargetSize, SquishError> {
        TargetSize::parse(&self.target_input, self.unit)
    }

    fn is_complete(&self) -> bool {
        self.file.is_some() && self.target().is_ok()
    }
}

pub struct Session {
    api: ApiClient,
    view: Arc<dyn View>,
    sink: Arc<dyn DownloadSink>,
    options: SessionOptions,
    selection: Mutex<Selection>,
    busy: AtomicBool,
    stats_loaded: Arc<AtomicBool>,
    stats_tasks: Mutex<JoinSet<()>>,
}

impl Session {
    pub fn new(
        api: ApiClient,
        view: Arc<dyn View>,
        sink: Arc<dyn DownloadSink>,
        options: SessionOptions,
    ) -> Self {
        Self {
            api,
            view,
            sink,
            options,
            selection: Mutex::new(Selection::default()),
            busy: AtomicBool::new(false),
            stats_loaded: Arc::new(AtomicBool::new(false)),
            stats_tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Render the initial state and register a view with the stats endpoint.
    pub fn activate(&self) {
        self.show_initial_state();
        self.refresh_stats(StatsMode::CountView);
    }

    /// Render the initial state without touching the stats endpoint.
    pub fn show_initial_state(&self) {
        self.view.apply(ViewUpdate::FileCleared);
        self.update_enablement();
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        lock(&self.selection).file.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Replace the current selection with `file` if it is a supported type.
    ///
    /// A rejected file leaves the previous selection in place.
    pub fn select_file(&self, file: SelectedFile) -> Result<(), SquishError> {
        if let Err(e) = ensure_supported(&file) {
            tracing::warn!(file = %file.name, media_type = ?file.media_type, "Rejected unsupported file");
            self.show_status(e.to_string(), StatusKind::Error);
            return Err(e);
        }

        tracing::info!(file = %file.name, size = file.size, "File selected");
        self.view.apply(ViewUpdate::FileShown {
            name: file.name.clone(),
            size: format_bytes(file.size),
        });
        lock(&self.selection).file = Some(file);
        self.update_enablement();
        self.view.apply(ViewUpdate::StatusHidden);
        Ok(())
    }

    pub fn remove_file(&self) {
        lock(&self.selection).file = None;
        self.view.apply(ViewUpdate::FileCleared);
        self.update_enablement();
        self.view.apply(ViewUpdate::StatusHidden);
    }

    /// Replace the raw contents of the target-size field.
    pub fn set_target_input(&self, input: &str) {
        lock(&self.selection).target_input = input.to_string();
        self.update_enablement();
    }

    pub fn set_unit(&self, unit: SizeUnit) {
        lock(&self.selection).unit = unit;
    }

    /// Submit is enabled when a file is stored, the target field holds a
    /// positive finite number and nothing is in flight.
    pub fn is_submit_enabled(&self) -> bool {
        !self.is_busy() && lock(&self.selection).is_complete()
    }

    fn update_enablement(&self) {
        let enabled = self.is_submit_enabled();
        self.view.apply(ViewUpdate::SubmitEnabled(enabled));
    }

    fn show_status(&self, message: String, kind: StatusKind) {
        self.view.apply(ViewUpdate::Status(Status { message, kind }));
    }

    /// Run one compression round trip for the current selection.
    pub async fn submit(&self) -> Submission {
        let (file, target) = {
            let selection = lock(&self.selection);
            match (&selection.file, selection.target()) {
                (Some(file), Ok(target)) => (file.clone(), target),
                _ => {
                    tracing::debug!("Submit ignored, form incomplete");
                    return Submission::Skipped;
                }
            }
        };

        if self.is_busy() {
            tracing::debug!("Submit ignored, compression already in flight");
            return Submission::Skipped;
        }

        if let Err(e) = ensure_target_smaller(&file, &target)
            .and_then(|_| ensure_within_upload_limit(&file, self.options.max_upload_bytes))
        {
            tracing::info!(file = %file.name, error = %e, "Submission rejected client-side");
            self.show_status(e.to_string(), StatusKind::Error);
            return Submission::Rejected(e);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Submission::Skipped;
        }

        self.view.apply(ViewUpdate::SubmitEnabled(false));
        self.view.apply(ViewUpdate::Processing(true));
        self.view.apply(ViewUpdate::StatusHidden);

        tracing::info!(
            file = %file.name,
            target = target.value(),
            unit = %target.unit(),
            "Submitting compression"
        );
        let outcome = self.run_compression(&file, &target).await;

        self.busy.store(false, Ordering::Release);
        self.update_enablement();
        self.view.apply(ViewUpdate::Processing(false));

        outcome
    }

    async fn run_compression(&self, file: &SelectedFile, target: &TargetSize) -> Submission {
        let compressed = match self.api.compress(file, target.to_kb()).await {
            Ok(compressed) => compressed,
            Err(ApiError::Server { status, message }) => {
                tracing::warn!(status, message = ?message, "Compression rejected by service");
                let message = message.unwrap_or_else(|| SERVER_FAILURE_MESSAGE.to_string());
                self.show_status(message.clone(), StatusKind::Error);
                return Submission::ServerError(message);
            }
            Err(ApiError::Transport(e)) => {
                tracing::error!(error = %e, "Compression request failed");
                self.show_status(TRANSPORT_FAILURE_MESSAGE.to_string(), StatusKind::Error);
                return Submission::TransportError;
            }
            Err(e) => {
                tracing::error!(error = %e, "Compression could not be submitted");
                let message = e.to_string();
                self.show_status(message.clone(), StatusKind::Error);
                return Submission::Failed(message);
            }
        };

        let filename = compressed.filename_for(&file.name);
        let size = compressed.len();

        let outcome = match self.sink.save(&filename, &compressed.bytes).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), bytes = size, "Compressed file saved");
                self.show_status(
                    format!(
                        "Success! Compressed file size is exactly {} bytes ({}). Download starting...",
                        size,
                        format_bytes(size)
                    ),
                    StatusKind::Success,
                );
                Submission::Downloaded { path, bytes: size }
            }
            Err(e) => {
                tracing::error!(error = %e, filename = %filename, "Failed to save compressed file");
                let message = format!("Could not save {}: {}", filename, e);
                self.show_status(message.clone(), StatusKind::Error);
                Submission::Failed(message)
            }
        };

        self.refresh_stats(StatsMode::ReadOnly);
        outcome
    }

    /// Fetch the counters in the background. Refreshes are unordered; whichever
    /// response lands last is what stays on screen.
    pub fn refresh_stats(&self, mode: StatsMode) {
        let api = self.api.clone();
        let view = Arc::clone(&self.view);
        let loaded = Arc::clone(&self.stats_loaded);

        let mut tasks = lock(&self.stats_tasks);
        while tasks.try_join_next().is_some() {}

        tasks.spawn(async move {
            match api.stats(mode).await {
                Ok(snapshot) => {
                    loaded.store(true, Ordering::Release);
                    for (slot, value) in [
                        (StatSlot::Views, snapshot.views),
                        (StatSlot::Pdfs, snapshot.pdfs),
                        (StatSlot::Images, snapshot.images),
                    ] {
                        view.apply(ViewUpdate::Stat {
                            slot,
                            text: format_count(value),
                        });
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, ?mode, "Failed to fetch stats");
                    if !loaded.load(Ordering::Acquire) {
                        view.apply(ViewUpdate::Stat {
                            slot: StatSlot::Views,
                            text: STATS_ERROR.to_string(),
                        });
                    }
                }
            }
        });
    }

    /// Wait for outstanding stats refreshes and drop the session.
    pub async fn shutdown(self) {
        let mut tasks = std::mem::take(&mut *lock(&self.stats_tasks));
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Stats task ended abnormally");
            }
        }
        tracing::debug!("Session closed");
    }
}
