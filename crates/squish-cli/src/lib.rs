//! Session logic and terminal front end for the squish client.

pub mod download;
pub mod session;
pub mod terminal;
pub mod view;

pub use download::{DirectorySink, DownloadSink};
pub use session::{Session, SessionOptions, Submission};
pub use terminal::TerminalView;
pub use view::{MemoryView, View, ViewState, ViewUpdate};

/// Initialize tracing for the CLI binary. Logs go to stderr so stdout stays
/// clean for results.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
