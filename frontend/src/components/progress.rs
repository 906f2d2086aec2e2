//! Transfer progress indicator.

use leptos::*;
use crate::presenter::PresenterState;

#[component]
pub fn ProgressBar(presenter: RwSignal<PresenterState>) -> impl IntoView {
    view! {
        <Show
            when=move || presenter.with(|p| p.progress.is_some())
            fallback=|| view! { }
        >
            <div class="progress" id="progress">
                <div
                    class="progress-bar"
                    id="progressBar"
                    style:width=move || presenter.with(|p| p.progress_width())
                ></div>
            </div>
        </Show>
    }
}
