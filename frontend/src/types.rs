//! Common types used across the upload widget.
//!
//! # Categories
//!
//! - **Selection Types** - the file chosen by the user
//! - **API Types** - destination request/response wire structures
//! - **Transfer Types** - progress and completion signals from the transport
//! - **Workflow Types** - orchestrator states and the events it emits

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DEFAULT_CONTENT_TYPE;
use crate::error::UploadError;

// =============================================================================
// Selection Types
// =============================================================================

/// A file chosen through the picker or a drop gesture.
///
/// `B` is the handle to the file content: `web_sys::File` in the browser,
/// any in-memory body in tests.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile<B> {
    /// File name as reported by the browser
    pub name: String,
    /// Media type as reported by the browser, possibly empty
    pub media_type: String,
    /// Size in bytes
    pub size: u64,
    /// Content handle
    pub body: B,
}

impl<B> SelectedFile<B> {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size: u64, body: B) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
            body,
        }
    }

    /// Media type used for both the destination request and the transfer.
    pub fn content_type(&self) -> &str {
        if self.media_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.media_type
        }
    }
}

impl SelectedFile<web_sys::File> {
    /// Wrap a browser file handle.
    pub fn from_web_file(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            media_type: file.type_(),
            size: file.size() as u64,
            body: file,
        }
    }
}

// =============================================================================
// API Types
// =============================================================================

/// Body of `POST /api/uploads/presigned-url`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationRequest {
    pub filename: String,
    pub content_type: String,
}

/// Pre-signed destination returned by the backend.
///
/// Used for a single attempt and then dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDestination {
    /// URL accepting the `PUT` of the file bytes
    pub upload_url: String,
    /// Storage key chosen by the backend, when it reports one
    #[serde(default)]
    pub object_key: Option<String>,
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Transfer Types
// =============================================================================

/// One upload progress notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransferProgress {
    /// Bytes sent so far
    pub loaded: f64,
    /// Total bytes, when the transport can compute it
    pub total: Option<f64>,
}

impl TransferProgress {
    /// Percentage sent, `loaded / total * 100`, when the total is known.
    pub fn percent(&self) -> Option<f64> {
        self.total
            .filter(|total| *total > 0.0)
            .map(|total| self.loaded / total * 100.0)
    }
}

/// Signals produced by a running transfer.
#[derive(Clone, Debug, PartialEq)]
pub enum TransferSignal {
    /// Bytes were sent
    Progress(TransferProgress),
    /// The storage endpoint answered
    Completed(HttpReply),
    /// No response could be obtained
    NetworkError,
}

// =============================================================================
// Workflow Types
// =============================================================================

/// Orchestrator state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    RequestingDestination,
    Transferring,
    Succeeded,
    Failed,
}

impl UploadState {
    /// An attempt is running and holds the orchestrator.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadState::RequestingDestination | UploadState::Transferring)
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadState::Idle => "idle",
            UploadState::RequestingDestination => "requesting destination",
            UploadState::Transferring => "transferring",
            UploadState::Succeeded => "succeeded",
            UploadState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Events emitted by the orchestrator during an attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadEvent {
    /// An attempt began; progress restarts at 0%
    Started,
    /// The orchestrator entered a new state
    StateChanged(UploadState),
    /// Transfer percentage (0-100)
    Progress(f64),
    /// Terminal success
    Succeeded,
    /// Terminal failure
    Failed(UploadError),
}
