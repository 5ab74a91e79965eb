//! Squish Core Library
//!
//! Domain types, formatting helpers, file acceptance rules and configuration
//! shared by the API client and the command-line front end.

pub mod config;
pub mod content_disposition;
pub mod error;
pub mod format;
pub mod models;
pub mod validation;

pub use config::ClientConfig;
pub use content_disposition::{download_filename, filename_param};
pub use error::SquishError;
pub use format::{format_bytes, format_count};
pub use models::{SelectedFile, SizeUnit, StatsSnapshot, TargetSize};
