//! UI Components for the upload widget.
//!
//! # Layout Components
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`UploadSection`] - File picker, drop zone and upload button
//! - [`ProgressBar`] - Transfer progress indicator
//! - [`StatusBanner`] - Success and failure messages

mod hero;
mod upload;
mod progress;
mod status;
mod footer;

pub use hero::*;
pub use upload::*;
pub use progress::*;
pub use status::*;
pub use footer::*;
