//! 报告列表（按月分组）

use crate::app::Page;
use crate::components::report_card::ReportCard;
use crate::download::download_markdown;
use chrono::Local;
use leptos::prelude::*;
use report_ai_common::export::reports_to_markdown;
use report_ai_common::views::group_by_month;
use report_ai_common::ReportRecord;
use std::collections::HashSet;

#[component]
pub fn ReportList(
    reports: Memo<Vec<ReportRecord>>,
    total: Signal<usize>,
    selected: RwSignal<HashSet<String>>,
    page: RwSignal<Page>,
    show_upload: RwSignal<bool>,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let groups = move || {
        reports.with(|list| {
            group_by_month(list.iter())
                .into_iter()
                .map(|group| {
                    let label = group.label();
                    let records: Vec<ReportRecord> = group.records.into_iter().cloned().collect();
                    (label, records)
                })
                .collect::<Vec<_>>()
        })
    };

    let selected_count = move || selected.with(|s| s.len());

    let export_selected = move |_| {
        let chosen: Vec<ReportRecord> = reports.with(|list| {
            selected.with(|s| list.iter().filter(|r| s.contains(&r.id)).cloned().collect())
        });
        if chosen.is_empty() {
            return;
        }
        let file_name = format!("市场报告_{}.md", Local::now().format("%Y%m%d"));
        if let Err(e) = download_markdown(&file_name, &reports_to_markdown(&chosen)) {
            tracing::error!("导出失败: {}", e);
            notice.set(Some(format!("导出失败: {}", e)));
        }
    };

    view! {
        <Show
            when=move || { total.get() > 0 }
            fallback=move || view! {
                <div class="empty-state">
                    <div class="empty-icon">"📄"</div>
                    <p>"还没有报告"</p>
                    <p class="text-muted">"上传 .txt / .md 格式的市场报告，AI 将自动提取摘要、情绪与关键洞察"</p>
                    <button class="btn btn-primary" on:click=move |_| show_upload.set(true)>
                        "上传第一份报告"
                    </button>
                </div>
            }
        >
            <Show when=move || { selected_count() > 0 }>
                <div class="selection-bar">
                    <span>{move || format!("已选择 {} 份报告", selected_count())}</span>
                    <button class="btn btn-secondary btn-small" on:click=export_selected>
                        "导出所选"
                    </button>
                    <button
                        class="btn btn-tertiary btn-small"
                        on:click=move |_| selected.update(|s| s.clear())
                    >
                        "取消选择"
                    </button>
                </div>
            </Show>

            <Show
                when=move || reports.with(|list| !list.is_empty())
                fallback=|| view! {
                    <div class="empty-state">
                        <p>"没有符合条件的报告"</p>
                        <p class="text-muted">"试试其他关键词或分类"</p>
                    </div>
                }
            >
                {move || {
                    groups()
                        .into_iter()
                        .map(|(label, records)| {
                            view! {
                                <section class="month-group">
                                    <h2 class="month-label">
                                        {label}
                                        <span class="month-count">{format!("{} 份", records.len())}</span>
                                    </h2>
                                    <div class="report-grid">
                                        {records
                                            .into_iter()
                                            .map(|report| view! {
                                                <ReportCard report=report selected=selected page=page />
                                            })
                                            .collect_view()}
                                    </div>
                                </section>
                            }
                        })
                        .collect_view()
                }}
            </Show>
        </Show>
    }
}
