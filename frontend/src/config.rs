//! Application configuration.
//!
//! Centralized configuration for the upload widget. Values are compiled in;
//! [`UploadOptions`] gathers the ones the orchestrator needs so tests can
//! override them.

/// Backend API base URL.
///
/// Empty means same origin as the page serving the widget.
pub const API_BASE_URL: &str = "";

/// Path of the endpoint that issues pre-signed upload URLs.
pub const PRESIGNED_URL_PATH: &str = "/api/uploads/presigned-url";

/// Media type sent when the browser reports none for a file.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The only transfer status treated as success by default.
pub const TRANSFER_SUCCESS_STATUS: u16 = 200;

/// Application name, used for the page title.
pub const APP_NAME: &str = "Direct Upload";

/// Options for a [`crate::Uploader`].
#[derive(Clone, Debug, PartialEq)]
pub struct UploadOptions {
    /// Base URL prepended to [`PRESIGNED_URL_PATH`].
    pub api_base: String,
    /// Treat every 2xx transfer status as success instead of only 200.
    pub accept_any_2xx: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            api_base: API_BASE_URL.to_string(),
            accept_any_2xx: false,
        }
    }
}

impl UploadOptions {
    /// Full URL of the destination-issuing endpoint.
    pub fn destination_endpoint(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), PRESIGNED_URL_PATH)
    }

    /// Whether a transfer response status counts as a completed upload.
    pub fn accepts_transfer_status(&self, status: u16) -> bool {
        if self.accept_any_2xx {
            (200..300).contains(&status)
        } else {
            status == TRANSFER_SUCCESS_STATUS
        }
    }
}
