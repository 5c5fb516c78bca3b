//! 上传弹窗

use crate::api::gemini::{GeminiClient, BUILD_API_KEY};
use crate::components::progress_bar::ProgressBar;
use crate::components::report_card::sentiment_class;
use crate::files::{collect_files, BrowserFile};
use crate::storage::BrowserStorage;
use futures::future::{AbortHandle, Abortable};
use leptos::ev::DragEvent;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use report_ai_common::pipeline::{process_file, RunBatch};
use report_ai_common::{
    BatchPipeline, Error, FailurePolicy, Flow, PipelineState, ReportStore, Settings, UploadLimits,
};
use web_sys::HtmlInputElement;

type Pipeline = RwSignal<BatchPipeline<BrowserFile>, LocalStorage>;

/// 1.2 MB / 35.0 KB / 120 B
fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let value = bytes as f64;
    if value >= KB * KB {
        format!("{:.1} MB", value / (KB * KB))
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}

// 弹窗关闭后信号被释放，try_update 返回 None
async fn drive_run(pipeline: Pipeline, batch: RunBatch<BrowserFile>, client: GeminiClient) {
    let run_id = batch.run_id;
    let mut files = batch.files.into_iter();

    for file in files.by_ref() {
        if pipeline.try_update(|p| p.mark_current(run_id, &file)).is_none() {
            return;
        }
        let outcome = process_file(&file.file, &client).await;
        let flow = pipeline
            .try_update(|p| p.record(run_id, file, outcome))
            .unwrap_or(Flow::Halt);
        if flow == Flow::Halt {
            break;
        }
    }

    let unprocessed: Vec<_> = files.collect();
    pipeline.try_update(|p| p.finish_run(run_id, unprocessed));
}

#[component]
pub fn UploadModal(
    show: RwSignal<bool>,
    store: RwSignal<ReportStore<BrowserStorage>>,
    settings: RwSignal<Settings>,
    notice: RwSignal<Option<String>>,
) -> impl IntoView {
    let limits = UploadLimits::default();
    let accept = limits.accept_attribute();
    let max_mb = limits.max_file_bytes / (1024 * 1024);

    let pipeline: Pipeline =
        RwSignal::new_local(BatchPipeline::new(limits, FailurePolicy::default()));
    let rejections = RwSignal::new(Vec::<String>::new());
    let is_dragover = RwSignal::new(false);
    let abort = StoredValue::new(None::<AbortHandle>);
    let input_ref: NodeRef<Input> = NodeRef::new();

    on_cleanup(move || {
        if let Some(Some(handle)) = abort.try_with_value(|h| h.clone()) {
            handle.abort();
        }
    });

    let state = move || pipeline.with(|p| p.state());
    let is_running = move || state().is_running();

    let add_files = move |files: Vec<BrowserFile>| {
        let errors = pipeline
            .try_update(|p| p.enqueue_all(files))
            .unwrap_or_default();
        for e in &errors {
            tracing::debug!("拒绝文件: {}", e);
        }
        rejections.set(errors.iter().map(|e| e.to_string()).collect());
    };

    let on_input_change = move |ev: leptos::ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(list) = input.files() {
            add_files(collect_files(&list));
        }
        input.set_value("");
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        is_dragover.set(false);
        if let Some(list) = ev.data_transfer().and_then(|dt| dt.files()) {
            add_files(collect_files(&list));
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        is_dragover.set(true);
    };

    let open_picker = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let start = move |_| {
        let batch = match pipeline.try_update(|p| p.begin_run()) {
            Some(Ok(batch)) => batch,
            Some(Err(e)) => {
                rejections.set(vec![e.to_string()]);
                return;
            }
            None => return,
        };
        rejections.set(Vec::new());

        let current = settings.get_untracked();
        let client = GeminiClient::new(
            current.analysis.clone(),
            current.resolve_api_key(BUILD_API_KEY),
        );

        let (handle, registration) = AbortHandle::new_pair();
        abort.set_value(Some(handle));
        spawn_local(async move {
            if Abortable::new(drive_run(pipeline, batch, client), registration)
                .await
                .is_err()
            {
                tracing::debug!("分析已中止");
            }
        });
    };

    let close = move |_| {
        pipeline.try_update(|p| p.cancel());
        show.set(false);
    };

    let commit = move |_| {
        let result = pipeline
            .try_update(|p| store.try_update(|s| p.commit(s)))
            .flatten();
        match result {
            Some(Ok(count)) => {
                tracing::info!("已保存 {} 份报告", count);
                show.set(false);
            }
            Some(Err(Error::Storage(e))) => {
                notice.set(Some(format!("报告已添加，但保存到本地失败: {}", e)));
                show.set(false);
            }
            Some(Err(e)) => rejections.set(vec![e.to_string()]),
            None => {}
        }
    };

    let percent = Signal::derive(move || pipeline.with(|p| p.state().percent()));
    let progress_label = Signal::derive(move || {
        pipeline.with(|p| match p.state() {
            PipelineState::Running { completed, total } => match p.current_file() {
                Some(name) => format!("正在分析 {}（{}/{}）", name, completed + 1, total),
                None => format!("正在分析（{}/{}）", completed, total),
            },
            _ => String::new(),
        })
    });

    let pending_rows = move || {
        pipeline.with(|p| {
            p.pending()
                .iter()
                .map(|f| (f.id, f.name.clone(), f.size))
                .collect::<Vec<_>>()
        })
    };

    let failure_rows = move || {
        pipeline.with(|p| {
            p.failures()
                .iter()
                .map(|f| (f.id, f.name.clone(), f.error.to_string()))
                .collect::<Vec<_>>()
        })
    };

    let preview_rows = move || pipeline.with(|p| p.previews().to_vec());
    let preview_count = move || pipeline.with(|p| p.previews().len());
    let can_start = move || !is_running() && pipeline.with(|p| !p.pending().is_empty());
    let can_commit = move || !is_running() && preview_count() > 0;

    view! {
        <div class="modal-backdrop">
            <div class="modal upload-modal">
                <div class="modal-header">
                    <h2>"上传报告"</h2>
                    <button class="btn-close" on:click=close>"✕"</button>
                </div>

                <div class="modal-body">
                    <input
                        type="file"
                        class="hidden"
                        multiple=true
                        accept=accept
                        node_ref=input_ref
                        on:change=on_input_change
                    />
                    <div
                        class=move || if is_dragover.get() { "upload-area dragover" } else { "upload-area" }
                        on:click=open_picker
                        on:drop=on_drop
                        on:dragover=on_dragover
                        on:dragleave=move |_: DragEvent| is_dragover.set(false)
                    >
                        <div class="upload-icon">"☁️"</div>
                        <p>"点击或拖拽文件到此处上传"</p>
                        <p class="text-muted">{format!("支持 .txt, .md 格式 (最大 {}MB)", max_mb)}</p>
                    </div>

                    <Show when=move || rejections.with(|r| !r.is_empty())>
                        <ul class="alert alert-error">
                            {move || rejections.get().into_iter().map(|msg| view! { <li>{msg}</li> }).collect_view()}
                        </ul>
                    </Show>

                    <Show when=move || pipeline.with(|p| !p.pending().is_empty())>
                        <h3 class="section-title">"待分析"</h3>
                        <ul class="file-list">
                            {move || pending_rows().into_iter().map(|(id, name, size)| view! {
                                <li class="file-row">
                                    <span class="file-name">{name}</span>
                                    <span class="text-muted">{format_size(size)}</span>
                                    <button
                                        class="btn-icon"
                                        title="移除"
                                        on:click=move |_| { pipeline.update(|p| { p.remove_pending(id); }); }
                                    >
                                        "✕"
                                    </button>
                                </li>
                            }).collect_view()}
                        </ul>
                    </Show>

                    <Show when=is_running>
                        <ProgressBar percent=percent label=progress_label />
                        <p class="text-muted">"我们将提取报告关键摘要、情绪分析和关键洞察。"</p>
                    </Show>

                    <Show when=move || pipeline.with(|p| !p.failures().is_empty())>
                        <div class="section-header">
                            <h3 class="section-title">"分析失败"</h3>
                            <button
                                class="btn btn-tertiary btn-small"
                                disabled=is_running
                                on:click=move |_| {
                                    match pipeline.try_update(|p| p.requeue_failed()) {
                                        Some(Ok(count)) => {
                                            tracing::debug!("{} 个文件重新排队", count);
                                            rejections.set(Vec::new());
                                        }
                                        Some(Err(e)) => rejections.set(vec![e.to_string()]),
                                        None => {}
                                    }
                                }
                            >
                                "重新排队"
                            </button>
                        </div>
                        <ul class="file-list">
                            {move || failure_rows().into_iter().map(|(id, name, error)| view! {
                                <li class="file-row failed">
                                    <span class="file-name">{name}</span>
                                    <span class="file-error">{error}</span>
                                    <button
                                        class="btn-icon"
                                        title="忽略"
                                        on:click=move |_| { pipeline.update(|p| { p.dismiss_failure(id); }); }
                                    >
                                        "✕"
                                    </button>
                                </li>
                            }).collect_view()}
                        </ul>
                    </Show>

                    <Show when=move || { preview_count() > 0 }>
                        <h3 class="section-title">{move || format!("分析结果预览（{}）", preview_count())}</h3>
                        <ul class="preview-list">
                            {move || preview_rows().into_iter().map(|record| {
                                let id = record.id.clone();
                                view! {
                                    <li class="preview-row">
                                        <div class="preview-main">
                                            <span class="card-category">{record.category.clone()}</span>
                                            <span class=sentiment_class(record.sentiment)>{record.sentiment.label()}</span>
                                            <strong>{record.title.clone()}</strong>
                                            <span class="text-muted">{record.report_date.clone()}</span>
                                        </div>
                                        <span class="text-muted">{record.file_name.clone()}</span>
                                        <button
                                            class="btn-icon"
                                            title="移除"
                                            on:click=move |_| { pipeline.update(|p| { p.remove_preview(&id); }); }
                                        >
                                            "✕"
                                        </button>
                                    </li>
                                }
                            }).collect_view()}
                        </ul>
                    </Show>

                    <label class="checkbox">
                        <input
                            type="checkbox"
                            prop:checked=move || pipeline.with(|p| p.policy() == FailurePolicy::AbortRemaining)
                            on:change=move |ev| {
                                let policy = if event_target_checked(&ev) {
                                    FailurePolicy::AbortRemaining
                                } else {
                                    FailurePolicy::SkipAndContinue
                                };
                                pipeline.update(|p| p.set_policy(policy));
                            }
                        />
                        "遇到失败时停止分析剩余文件"
                    </label>
                </div>

                <div class="modal-footer">
                    <button class="btn btn-secondary" on:click=close>"取消"</button>
                    <button class="btn btn-secondary" disabled=move || !can_start() on:click=start>
                        {move || if is_running() { "分析中..." } else { "开始分析" }}
                    </button>
                    <button class="btn btn-primary" disabled=move || !can_commit() on:click=commit>
                        {move || format!("确认保存 {} 份", preview_count())}
                    </button>
                </div>
            </div>
        </div>
    }
}
