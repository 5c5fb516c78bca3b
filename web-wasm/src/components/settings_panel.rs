//! 设置面板

use crate::api::gemini::BUILD_API_KEY;
use crate::storage::BrowserStorage;
use leptos::prelude::*;
use report_ai_common::Settings;

#[component]
pub fn SettingsPanel(
    show: RwSignal<bool>,
    settings: RwSignal<Settings>,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let initial = settings.get_untracked();
    let api_key = RwSignal::new(initial.api_key.clone().unwrap_or_default());
    let model = RwSignal::new(initial.analysis.model.clone());
    let timeout = RwSignal::new(initial.analysis.timeout_seconds.to_string());
    let status = RwSignal::new(String::new());

    let on_save = move |_| {
        let mut next = settings.get_untracked();
        let key = api_key.get_untracked();
        next.api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());

        let model_name = model.get_untracked();
        if !model_name.trim().is_empty() {
            next.analysis.model = model_name.trim().to_string();
        }
        match timeout.get_untracked().trim().parse::<u64>() {
            Ok(seconds) if seconds > 0 => next.analysis.timeout_seconds = seconds,
            _ => {
                status.set("超时时间必须是正整数（秒）".to_string());
                return;
            }
        }

        if let Err(e) = next.save(&BrowserStorage) {
            tracing::warn!("保存设置失败: {}", e);
            notice.set(Some(e.to_string()));
        }
        settings.set(next);
        show.set(false);
    };

    view! {
        <div class="modal-backdrop">
            <div class="modal settings-panel">
                <div class="modal-header">
                    <h2>"设置"</h2>
                    <button class="btn-close" on:click=move |_| show.set(false)>"✕"</button>
                </div>

                <div class="modal-body">
                    <div class="form-group">
                        <label for="api-key">"Gemini API Key"</label>
                        <input
                            type="password"
                            id="api-key"
                            placeholder="输入 API Key..."
                            prop:value=move || api_key.get()
                            on:input=move |ev| api_key.set(event_target_value(&ev))
                        />
                        <Show when=move || BUILD_API_KEY.is_some()>
                            <p class="text-muted">"已使用构建时提供的 API Key，此处的设置不会生效"</p>
                        </Show>
                        <a
                            href="https://aistudio.google.com/app/apikey"
                            target="_blank"
                            rel="noopener noreferrer"
                            class="api-key-link"
                        >
                            "获取 API Key →"
                        </a>
                    </div>

                    <div class="form-group">
                        <label for="model">"模型"</label>
                        <input
                            type="text"
                            id="model"
                            prop:value=move || model.get()
                            on:input=move |ev| model.set(event_target_value(&ev))
                        />
                    </div>

                    <div class="form-group">
                        <label for="timeout">"超时（秒）"</label>
                        <input
                            type="number"
                            id="timeout"
                            min="1"
                            prop:value=move || timeout.get()
                            on:input=move |ev| timeout.set(event_target_value(&ev))
                        />
                    </div>

                    <p class="form-status">{move || status.get()}</p>
                </div>

                <div class="modal-footer">
                    <button class="btn btn-secondary" on:click=move |_| show.set(false)>"取消"</button>
                    <button class="btn btn-primary" on:click=on_save>"保存"</button>
                </div>
            </div>
        </div>
    }
}
