use std::io::Write;
use std::sync::Mutex;

use crate::view::{lock, StatusKind, View, ViewState, ViewUpdate, PROCESSING_LABEL};

/// Prints session updates to the terminal as they happen.
///
/// Status messages and selection changes are printed immediately; the stats
/// counters are only collected and printed on demand, since refreshes land in
/// arbitrary order.
#[derive(Debug, Default)]
pub struct TerminalView {
    state: Mutex<ViewState>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        lock(&self.state).clone()
    }

    pub fn print_stats(&self) {
        let state = self.snapshot();
        println!("{}", stats_line(&state));
    }
}

fn stats_line(state: &ViewState) -> String {
    format!(
        "Views: {}  PDFs: {}  Images: {}",
        state.views, state.pdfs, state.images
    )
}

impl View for TerminalView {
    fn apply(&self, update: ViewUpdate) {
        match &update {
            ViewUpdate::FileShown { name, size } => println!("Selected {} ({})", name, size),
            ViewUpdate::Processing(true) => {
                print!("{} ", PROCESSING_LABEL);
                let _ = std::io::stdout().flush();
            }
            ViewUpdate::Processing(false) => println!(),
            ViewUpdate::Status(status) => match status.kind {
                StatusKind::Success => println!("{}", status.message),
                StatusKind::Error => eprintln!("Error: {}", status.message),
            },
            ViewUpdate::SubmitEnabled(enabled) => {
                tracing::trace!(enabled, "Submit control updated");
            }
            ViewUpdate::FileCleared | ViewUpdate::StatusHidden | ViewUpdate::Stat { .. } => {}
        }
        lock(&self.state).apply(update);
    }
}
