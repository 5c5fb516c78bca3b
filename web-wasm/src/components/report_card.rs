//! 报告卡片

use crate::app::Page;
use leptos::prelude::*;
use report_ai_common::views::excerpt;
use report_ai_common::{ReportRecord, Sentiment};
use std::collections::HashSet;

/// 情绪徽章的 CSS 类
pub fn sentiment_class(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "sentiment positive",
        Sentiment::Neutral => "sentiment neutral",
        Sentiment::Negative => "sentiment negative",
    }
}

const SUMMARY_EXCERPT_CHARS: usize = 90;
const INSIGHT_PREVIEW_COUNT: usize = 2;

#[component]
pub fn ReportCard(
    report: ReportRecord,
    selected: RwSignal<HashSet<String>>,
    page: RwSignal<Page>,
) -> impl IntoView {
    let is_selected = {
        let id = report.id.clone();
        move || selected.with(|s| s.contains(&id))
    };
    let is_selected_class = is_selected.clone();
    let is_selected_mark = is_selected.clone();

    let on_toggle = {
        let id = report.id.clone();
        move |ev: leptos::ev::MouseEvent| {
            ev.stop_propagation();
            selected.update(|s| {
                if !s.remove(&id) {
                    s.insert(id.clone());
                }
            });
        }
    };

    let on_open = {
        let id = report.id.clone();
        move |_| page.set(Page::Detail(id.clone()))
    };

    let insights: Vec<String> = report
        .key_insights
        .iter()
        .take(INSIGHT_PREVIEW_COUNT)
        .map(|insight| excerpt(insight, 30))
        .collect();

    view! {
        <article
            class=move || if is_selected_class() { "report-card selected" } else { "report-card" }
            on:click=on_open
        >
            <div
                class=move || if is_selected() { "card-checkbox checked" } else { "card-checkbox" }
                title="选择"
                on:click=on_toggle
            >
                {move || if is_selected_mark() { "✓" } else { "" }}
            </div>

            <span class="card-category">{report.category.clone()}</span>
            <span class=sentiment_class(report.sentiment)>
                {format!("市场情绪: {}", report.sentiment.label())}
            </span>
            <h3 class="card-title">{report.title.clone()}</h3>
            <p class="card-summary">{excerpt(&report.summary, SUMMARY_EXCERPT_CHARS)}</p>

            <ul class="card-insights">
                {insights.into_iter().map(|insight| view! { <li>{insight}</li> }).collect_view()}
            </ul>

            <footer class="card-footer">
                <span class="card-date">"📅 " {report.report_date.clone()}</span>
                <span class="card-file">{report.file_name.clone()}</span>
            </footer>
        </article>
    }
}
