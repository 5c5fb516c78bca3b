//! 进度条

use leptos::prelude::*;

#[component]
pub fn ProgressBar(percent: Signal<u8>, label: Signal<String>) -> impl IntoView {
    view! {
        <div class="progress-container">
            <div class="progress-bar">
                <div
                    class="progress-fill"
                    style=move || format!("width: {}%", percent.get())
                />
            </div>
            <p class="progress-text">{move || label.get()}</p>
        </div>
    }
}
