//! What the widget shows, derived from selection and upload events.
//!
//! [`PresenterState`] is plain data so it can be driven without a browser;
//! the components read it through a signal.

use crate::error::UploadError;
use crate::types::UploadEvent;

/// Message shown after a successful transfer.
pub const SUCCESS_MESSAGE: &str = "Upload completed successfully ✅";

/// Terminal message with its visual state.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub success: bool,
}

impl StatusMessage {
    pub fn success() -> Self {
        Self {
            text: SUCCESS_MESSAGE.to_string(),
            success: true,
        }
    }

    pub fn from_error(err: &UploadError) -> Self {
        Self {
            text: err.to_string(),
            success: false,
        }
    }

    /// CSS classes for the status region.
    pub fn css_class(&self) -> &'static str {
        if self.success {
            "status success"
        } else {
            "status error"
        }
    }
}

/// Display state of the widget.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresenterState {
    /// Name of the selected file, once one is chosen
    pub file_name: Option<String>,
    /// Transfer percentage; `None` hides the progress bar
    pub progress: Option<f64>,
    /// Terminal message; `None` hides the status region
    pub status: Option<StatusMessage>,
    /// A drag is hovering the drop zone
    pub drag_active: bool,
    /// An attempt is running
    pub busy: bool,
}

impl PresenterState {
    /// A new file was selected.
    pub fn show_selection(&mut self, name: &str) {
        self.file_name = Some(name.to_string());
        self.status = None;
        self.progress = None;
    }

    pub fn set_drag_active(&mut self, active: bool) {
        self.drag_active = active;
    }

    /// Fold one orchestrator event into the display.
    ///
    /// The progress bar stays visible after the attempt ends.
    pub fn apply(&mut self, event: &UploadEvent) {
        match event {
            UploadEvent::Started => {
                self.status = None;
                self.progress = Some(0.0);
            }
            UploadEvent::StateChanged(state) => self.busy = state.is_in_flight(),
            UploadEvent::Progress(percent) => self.progress = Some(*percent),
            UploadEvent::Succeeded => self.status = Some(StatusMessage::success()),
            UploadEvent::Failed(err) => self.status = Some(StatusMessage::from_error(err)),
        }
    }

    /// CSS width of the progress fill.
    pub fn progress_width(&self) -> String {
        format!("{}%", self.progress.unwrap_or(0.0))
    }
}
