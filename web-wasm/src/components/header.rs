//! 顶部栏：标题、搜索、设置与上传入口

use leptos::prelude::*;

#[component]
pub fn Header(
    search: RwSignal<String>,
    show_upload: RwSignal<bool>,
    show_settings: RwSignal<bool>,
) -> impl IntoView {
    view! {
        <header class="header">
            <div class="header-brand">
                <span class="header-logo">"📈"</span>
                <h1>"市场报告 AI 分析"</h1>
            </div>

            <input
                type="search"
                class="search-input"
                placeholder="搜索标题或摘要..."
                prop:value=move || search.get()
                on:input=move |ev| search.set(event_target_value(&ev))
            />

            <div class="header-actions">
                <button class="btn btn-secondary" on:click=move |_| show_settings.set(true)>
                    "设置"
                </button>
                <button class="btn btn-primary" on:click=move |_| show_upload.set(true)>
                    "上传报告"
                </button>
            </div>
        </header>
    }
}
