//! Domain models

pub mod file;
pub mod stats;
pub mod target;

pub use file::SelectedFile;
pub use stats::StatsSnapshot;
pub use target::{parse_leading_float, SizeUnit, TargetSize};
