//! Upload workflow services.
//!
//! # Services
//!
//! - [`selection`] - the single file chosen by the user
//! - [`upload`] - destination request and transfer orchestration
//! - [`transport`] - network seam and its browser implementation

pub mod selection;
pub mod transport;
pub mod upload;

pub use selection::*;
pub use transport::*;
pub use upload::*;
