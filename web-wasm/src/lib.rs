//! Market Report AI Web App (Leptos + WASM)

mod api;
mod app;
mod components;
mod download;
mod files;
mod logging;
mod storage;

use wasm_bindgen::prelude::*;

pub(crate) fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    tracing::info!("市场报告 AI 分析 启动");
    leptos::mount::mount_to_body(app::App);
}
