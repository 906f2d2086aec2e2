//! Direct Upload - Frontend Rust/Leptos Application
//!
//! A WebAssembly widget that uploads a file straight to object storage:
//! the backend only issues a pre-signed URL, the bytes never transit
//! through it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   upload()   ┌──────────────────┐  events   ┌──────────────────┐
//! │ SelectionManager │────────────▶│     Uploader     │─────────▶│  PresenterState  │
//! │ (picker / drop)  │              │ (state machine)  │           │ (status, progress)│
//! └──────────────────┘              └────────┬─────────┘           └──────────────────┘
//!                                            │ UploadTransport
//!                          POST /api/uploads/presigned-url, PUT <uploadUrl>
//! ```
//!
//! # Modules
//!
//! - [`config`] - Endpoint and policy constants, [`UploadOptions`]
//! - [`types`] - Selection, wire, transfer and workflow types
//! - [`error`] - [`UploadError`] and its user-facing messages
//! - [`services`] - Selection, orchestration and browser transport
//! - [`presenter`] - Display state derived from upload events
//! - [`components`] - UI components

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod types;
pub mod services;
pub mod presenter;
pub mod components;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Selection
    SelectedFile,
    // API
    DestinationRequest, UploadDestination, HttpReply,
    // Transfer
    TransferProgress, TransferSignal,
    // Workflow
    UploadEvent, UploadState,
};

// Errors
pub use error::{TransportError, UploadError, UploadResult};

// Presentation
pub use presenter::{PresenterState, StatusMessage};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text=APP_NAME/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    view! {
        <div class="container">
            <Hero/>
            <UploadSection/>
        </div>

        <Footer/>
    }
}
