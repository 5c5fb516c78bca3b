//! 报告详情

use crate::app::Page;
use crate::components::report_card::sentiment_class;
use crate::download::download_markdown;
use leptos::prelude::*;
use report_ai_common::export::{download_file_name, format_timestamp, report_to_markdown};
use report_ai_common::ReportRecord;

#[component]
pub fn ReportDetail(
    report: ReportRecord,
    page: RwSignal<Page>,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let on_download = {
        let report = report.clone();
        move |_| {
            let file_name = download_file_name(&report.title);
            if let Err(e) = download_markdown(&file_name, &report_to_markdown(&report)) {
                tracing::error!("下载失败: {}", e);
                notice.set(Some(format!("下载失败: {}", e)));
            }
        }
    };

    let insights = report
        .key_insights
        .iter()
        .enumerate()
        .map(|(i, insight)| {
            view! {
                <li>
                    <span class="insight-index">{i + 1}</span>
                    <span class="insight-text">{insight.clone()}</span>
                </li>
            }
        })
        .collect_view();

    view! {
        <div class="report-detail">
            <div class="detail-toolbar">
                <button class="btn btn-link" on:click=move |_| page.set(Page::List)>
                    "← 返回列表"
                </button>
                <div class="detail-actions">
                    <button class="btn btn-secondary btn-small" on:click=on_download>
                        "下载报告"
                    </button>
                    <button
                        class="btn btn-tertiary btn-small"
                        disabled=true
                        title="暂不支持删除报告"
                    >
                        "删除"
                    </button>
                </div>
            </div>

            <div class="detail-grid">
                <main class="detail-main">
                    <div class="detail-meta">
                        <span class="card-category">{report.category.clone()}</span>
                        <span class="text-muted">{report.report_date.clone()}</span>
                    </div>
                    <h1 class="detail-title">{report.title.clone()}</h1>

                    <h3 class="section-title">"AI 核心摘要"</h3>
                    <blockquote class="detail-summary">{report.summary.clone()}</blockquote>

                    <h3 class="section-title">"原始报告内容"</h3>
                    <pre class="detail-content">{report.raw_content.clone()}</pre>
                </main>

                <aside class="detail-side">
                    <section class="side-card">
                        <h3 class="side-title">"AI 关键洞察"</h3>
                        <ol class="insight-list">{insights}</ol>
                    </section>

                    <section class="side-card">
                        <h3 class="side-title">"分析维度"</h3>
                        <p class="side-label">"市场情绪"</p>
                        <div class=sentiment_class(report.sentiment)>{report.sentiment.long_label()}</div>
                        <p class="side-label">"文件名"</p>
                        <p class="side-value">{report.file_name.clone()}</p>
                        <p class="side-label">"处理时间"</p>
                        <p class="side-value">{format_timestamp(&report.uploaded_at)}</p>
                    </section>
                </aside>
            </div>
        </div>
    }
}
