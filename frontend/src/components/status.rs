//! Status region for terminal success and failure messages.

use leptos::*;
use crate::presenter::PresenterState;

#[component]
pub fn StatusBanner(presenter: RwSignal<PresenterState>) -> impl IntoView {
    let status = move || presenter.with(|p| p.status.clone());

    view! {
        <Show
            when=move || status().is_some()
            fallback=|| view! { }
        >
            <div
                class=move || status().map(|s| s.css_class()).unwrap_or("status")
                id="status"
            >
                {move || status().map(|s| s.text).unwrap_or_default()}
            </div>
        </Show>
    }
}
