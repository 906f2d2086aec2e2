//! Upload widget with drag & drop support.
//!
//! Wires browser events to the [`SelectionManager`] and the [`Uploader`],
//! and renders the [`PresenterState`] they produce.

use std::rc::Rc;

use leptos::*;
use web_sys::{DragEvent, Event, File};

use crate::components::{ProgressBar, StatusBanner};
use crate::error::UploadError;
use crate::presenter::PresenterState;
use crate::services::{BrowserTransport, SelectionManager, Uploader};

#[component]
pub fn UploadSection() -> impl IntoView {
    let presenter = create_rw_signal(PresenterState::default());
    let selection = store_value(SelectionManager::<File>::new());
    let uploader = Rc::new(Uploader::new(BrowserTransport));
    let input_ref = create_node_ref::<html::Input>();

    let on_file_change = move |_: Event| {
        let Some(input) = input_ref.get() else {
            return;
        };
        let mut selected = None;
        selection.update_value(|s| selected = s.select_from_input(&input).map(|f| f.name.clone()));
        if let Some(name) = selected {
            presenter.update(|p| p.show_selection(&name));
        }
    };

    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
        presenter.update(|p| p.set_drag_active(true));
    };

    let on_drag_leave = move |_: DragEvent| {
        presenter.update(|p| p.set_drag_active(false));
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        presenter.update(|p| p.set_drag_active(false));

        let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) else {
            return;
        };
        let input = input_ref.get();
        let input = input.as_deref();
        let mut selected = None;
        selection.update_value(|s| {
            selected = s.select_from_drop(&files, input).map(|f| f.name.clone())
        });
        if let Some(name) = selected {
            presenter.update(|p| p.show_selection(&name));
        }
    };

    let on_upload = move |_| {
        let current = selection.get_value();
        let uploader = Rc::clone(&uploader);

        spawn_local(async move {
            let result = uploader
                .upload(&current, |event| presenter.update(|p| p.apply(&event)))
                .await;

            match result {
                Ok(destination) => log::debug!("Uploaded to {}", destination.upload_url),
                Err(UploadError::NoFileSelected) => alert(&UploadError::NoFileSelected.to_string()),
                Err(UploadError::Busy) => log::warn!("Upload already running"),
                // Already shown through the status banner
                Err(_) => {}
            }
        });
    };

    view! {
        <div class="upload-card">
            <div
                class="drop-zone"
                id="dropZone"
                class:dragging=move || presenter.with(|p| p.drag_active)
                on:dragover=on_drag_over
                on:dragleave=on_drag_leave
                on:drop=on_drop
            >
                <div class="upload-icon">"📤"</div>
                <div class="upload-text">"Drag & drop a file here"</div>
                <div class="upload-hint">"or"</div>
                <label for="fileInput" class="choose-button">
                    "Choose a file"
                </label>
                <input
                    type="file"
                    id="fileInput"
                    style="display:none"
                    node_ref=input_ref
                    on:change=on_file_change
                />
            </div>

            <Show
                when=move || presenter.with(|p| p.file_name.is_some())
                fallback=|| view! { }
            >
                <div class="file-name" id="fileName">
                    {move || presenter.with(|p| p.file_name.clone().unwrap_or_default())}
                </div>
            </Show>

            <button
                class="upload-button"
                on:click=on_upload
                disabled=move || presenter.with(|p| p.busy)
            >
                {move || if presenter.with(|p| p.busy) { "⏳ Uploading..." } else { "Upload" }}
            </button>

            <ProgressBar presenter=presenter/>
            <StatusBanner presenter=presenter/>
        </div>
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}
