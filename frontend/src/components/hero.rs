//! Hero section component

use leptos::*;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"Direct Upload"</h1>
            <p class="subtitle">
                "Files go straight from your browser to storage through a pre-signed URL. "
                "Nothing passes through the application server."
            </p>
        </div>
    }
}
