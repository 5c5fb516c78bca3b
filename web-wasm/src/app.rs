//! 应用根组件

use crate::components::{
    category_bar::CategoryBar, header::Header, report_detail::ReportDetail,
    report_list::ReportList, settings_panel::SettingsPanel, upload_modal::UploadModal,
};
use crate::storage::BrowserStorage;
use leptos::prelude::*;
use report_ai_common::views::{categories, filter_and_sort};
use report_ai_common::{ReportQuery, ReportRecord, ReportStore, Settings, ALL_CATEGORY};
use std::collections::HashSet;

/// 当前页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    List,
    /// 报告 id
    Detail(String),
}

#[component]
pub fn App() -> impl IntoView {
    // 启动时从本地存储恢复一次
    let store = RwSignal::new(ReportStore::restore(BrowserStorage));
    let settings = RwSignal::new(Settings::load(&BrowserStorage));

    let search = RwSignal::new(String::new());
    let category = RwSignal::new(ALL_CATEGORY.to_string());
    let selected = RwSignal::new(HashSet::<String>::new());
    let page = RwSignal::new(Page::List);
    let show_upload = RwSignal::new(false);
    let show_settings = RwSignal::new(false);
    let notice = RwSignal::new(None::<String>);

    let records = Memo::new(move |_| store.with(|s| s.records().to_vec()));
    let total = Signal::derive(move || records.with(|r| r.len()));
    let category_list = Memo::new(move |_| records.with(|r| categories(r)));

    let filtered = Memo::new(move |_| {
        let query = ReportQuery {
            search: search.get(),
            category: category.get(),
        };
        records.with(|r| {
            filter_and_sort(r, &query)
                .into_iter()
                .cloned()
                .collect::<Vec<ReportRecord>>()
        })
    });

    let current_report = move || match page.get() {
        Page::Detail(id) => store.with(|s| s.get(&id).cloned()),
        Page::List => None,
    };

    view! {
        <div class="container">
            <Header search=search show_upload=show_upload show_settings=show_settings />

            <Show when=move || notice.with(|n| n.is_some())>
                <div class="alert alert-warning">
                    <span>{move || notice.get().unwrap_or_default()}</span>
                    <button class="btn-icon" on:click=move |_| notice.set(None)>"✕"</button>
                </div>
            </Show>

            <Show
                when=move || current_report().is_some()
                fallback=move || view! {
                    <CategoryBar categories=category_list active=category />
                    <ReportList
                        reports=filtered
                        total=total
                        selected=selected
                        page=page
                        show_upload=show_upload
                        notice=notice
                    />
                }
            >
                {move || current_report().map(|report| view! {
                    <ReportDetail report=report page=page notice=notice />
                })}
            </Show>

            <Show when=move || show_upload.get()>
                <UploadModal show=show_upload store=store settings=settings notice=notice />
            </Show>

            <Show when=move || show_settings.get()>
                <SettingsPanel show=show_settings settings=settings notice=notice />
            </Show>
        </div>
    }
}
