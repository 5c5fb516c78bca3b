//! 批量上传流水线
//!
//! UI 不能跨 await 持有 `&mut BatchPipeline`，所以一次运行拆成
//! `begin_run` / `mark_current` / `record` / `finish_run`。run_id 过期的结果一律忽略。

use crate::analyzer::Analyzer;
use crate::config::UploadLimits;
use crate::error::{Error, ItemError, ValidationError};
use crate::store::{ReportStore, Storage};
use crate::types::ReportRecord;
use async_trait::async_trait;
use chrono::Utc;

/// 可读取文本的上传文件（浏览器 File / 测试用内存文件）
#[async_trait(?Send)]
pub trait SourceFile {
    fn name(&self) -> String;

    fn size(&self) -> u64;

    async fn read_text(&self) -> Result<String, String>;
}

/// 单个文件失败后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    SkipAndContinue,
    /// 记录失败并停止，剩余文件放回队列
    AbortRemaining,
}

/// 流水线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Running { completed: usize, total: usize },
    /// 最近一次运行已结束，存在预览或失败记录
    Ready,
    Committed,
    Cancelled,
}

impl PipelineState {
    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Committed | PipelineState::Cancelled)
    }

    /// 0 - 100
    pub fn percent(&self) -> u8 {
        match *self {
            PipelineState::Running { total: 0, .. } => 0,
            PipelineState::Running { completed, total } => {
                ((completed.min(total) * 100) / total) as u8
            }
            _ => 0,
        }
    }
}

/// `record` 之后是否继续处理下一个文件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

#[derive(Debug, Clone)]
pub struct QueuedFile<F> {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub file: F,
}

/// 分析失败的文件（保留文件句柄以便重新排队）
#[derive(Debug, Clone)]
pub struct FailedFile<F> {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub error: ItemError,
    pub file: F,
}

/// 一次运行取走的文件
#[derive(Debug)]
pub struct RunBatch<F> {
    pub run_id: u64,
    pub files: Vec<QueuedFile<F>>,
}

/// `run` 的结果统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// 因 AbortRemaining 放回队列的文件数
    pub requeued: usize,
}

/// 批量上传流水线
#[derive(Debug)]
pub struct BatchPipeline<F> {
    limits: UploadLimits,
    policy: FailurePolicy,
    state: PipelineState,
    pending: Vec<QueuedFile<F>>,
    previews: Vec<ReportRecord>,
    failures: Vec<FailedFile<F>>,
    current: Option<String>,
    next_file_id: u64,
    run_id: u64,
}

impl<F> Default for BatchPipeline<F> {
    fn default() -> Self {
        Self::new(UploadLimits::default(), FailurePolicy::default())
    }
}

impl<F> BatchPipeline<F> {
    pub fn new(limits: UploadLimits, policy: FailurePolicy) -> Self {
        Self {
            limits,
            policy,
            state: PipelineState::Idle,
            pending: Vec::new(),
            previews: Vec::new(),
            failures: Vec::new(),
            current: None,
            next_file_id: 1,
            run_id: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn pending(&self) -> &[QueuedFile<F>] {
        &self.pending
    }

    pub fn previews(&self) -> &[ReportRecord] {
        &self.previews
    }

    pub fn failures(&self) -> &[FailedFile<F>] {
        &self.failures
    }

    /// 正在分析的文件名
    pub fn current_file(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn ensure_open(&self) -> Result<(), ValidationError> {
        if self.state.is_terminal() {
            Err(ValidationError::Closed)
        } else {
            Ok(())
        }
    }

    /// 非运行、非终止状态下，根据预览/失败是否存在切换 Idle / Ready
    fn settle(&mut self) {
        if self.state.is_running() || self.state.is_terminal() {
            return;
        }
        self.state = if self.previews.is_empty() && self.failures.is_empty() {
            PipelineState::Idle
        } else {
            PipelineState::Ready
        };
    }

    pub fn remove_pending(&mut self, id: u64) -> bool {
        let before = self.pending.len();
        self.pending.retain(|f| f.id != id);
        before != self.pending.len()
    }

    pub fn remove_preview(&mut self, record_id: &str) -> bool {
        let before = self.previews.len();
        self.previews.retain(|r| r.id != record_id);
        let removed = before != self.previews.len();
        self.settle();
        removed
    }

    pub fn dismiss_failure(&mut self, id: u64) -> bool {
        let before = self.failures.len();
        self.failures.retain(|f| f.id != id);
        let removed = before != self.failures.len();
        self.settle();
        removed
    }

    /// 失败的文件按原顺序追加到待分析队列末尾
    pub fn requeue_failed(&mut self) -> Result<usize, ValidationError> {
        self.ensure_open()?;
        let count = self.failures.len();
        for failed in self.failures.drain(..) {
            self.pending.push(QueuedFile {
                id: failed.id,
                name: failed.name,
                size: failed.size,
                file: failed.file,
            });
        }
        self.settle();
        Ok(count)
    }

    /// 取走整个待分析队列，开始一次运行
    pub fn begin_run(&mut self) -> Result<RunBatch<F>, ValidationError> {
        self.ensure_open()?;
        if self.state.is_running() {
            return Err(ValidationError::Busy);
        }
        if self.pending.is_empty() {
            return Err(ValidationError::EmptyQueue);
        }

        self.run_id += 1;
        let files: Vec<_> = self.pending.drain(..).collect();
        self.state = PipelineState::Running {
            completed: 0,
            total: files.len(),
        };
        tracing::debug!("开始第 {} 次分析，共 {} 个文件", self.run_id, files.len());

        Ok(RunBatch {
            run_id: self.run_id,
            files,
        })
    }

    fn is_current_run(&self, run_id: u64) -> bool {
        self.state.is_running() && run_id == self.run_id
    }

    pub fn mark_current(&mut self, run_id: u64, file: &QueuedFile<F>) {
        if self.is_current_run(run_id) {
            self.current = Some(file.name.clone());
        }
    }

    /// 记录单个文件的结果
    ///
    /// 过期的 run_id 返回 `Flow::Halt` 且不修改任何状态。
    pub fn record(
        &mut self,
        run_id: u64,
        file: QueuedFile<F>,
        outcome: Result<ReportRecord, ItemError>,
    ) -> Flow {
        if !self.is_current_run(run_id) {
            tracing::debug!("忽略过期的分析结果: {}", file.name);
            return Flow::Halt;
        }

        let flow = match outcome {
            Ok(record) => {
                self.previews.push(record);
                Flow::Continue
            }
            Err(error) => {
                tracing::warn!("分析失败 {}: {}", file.name, error);
                self.failures.push(FailedFile {
                    id: file.id,
                    name: file.name,
                    size: file.size,
                    error,
                    file: file.file,
                });
                match self.policy {
                    FailurePolicy::SkipAndContinue => Flow::Continue,
                    FailurePolicy::AbortRemaining => Flow::Halt,
                }
            }
        };

        if let PipelineState::Running { completed, total } = self.state {
            self.state = PipelineState::Running {
                completed: completed + 1,
                total,
            };
        }
        flow
    }

    /// 结束运行；未处理的文件按原顺序放回队列前端
    pub fn finish_run(&mut self, run_id: u64, unprocessed: Vec<QueuedFile<F>>) {
        if !self.is_current_run(run_id) {
            return;
        }

        if !unprocessed.is_empty() {
            tracing::debug!("{} 个文件放回待分析队列", unprocessed.len());
            self.pending.splice(0..0, unprocessed);
        }
        self.current = None;
        self.state = PipelineState::Idle;
        self.settle();
    }

    /// 所有预览整体写入存储，流水线结束（写入失败时同样结束）
    pub fn commit<S: Storage>(&mut self, store: &mut ReportStore<S>) -> Result<usize, Error> {
        self.ensure_open()?;
        if self.state.is_running() {
            return Err(ValidationError::Busy.into());
        }
        if self.previews.is_empty() {
            return Err(ValidationError::NothingToCommit.into());
        }

        let records: Vec<_> = self.previews.drain(..).collect();
        self.pending.clear();
        self.failures.clear();
        self.state = PipelineState::Committed;

        Ok(store.commit(records)?)
    }

    /// 放弃本次上传，不触碰报告存储
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.run_id += 1;
        self.pending.clear();
        self.previews.clear();
        self.failures.clear();
        self.current = None;
        self.state = PipelineState::Cancelled;
        tracing::debug!("上传已取消");
    }
}

impl<F: SourceFile> BatchPipeline<F> {
    /// 校验后加入待分析队列，返回队列中的 id
    pub fn enqueue(&mut self, file: F) -> Result<u64, ValidationError> {
        self.ensure_open()?;

        let name = file.name();
        let size = file.size();
        if !self.limits.is_allowed(&name) {
            return Err(ValidationError::UnsupportedFileType { file_name: name });
        }
        if size == 0 {
            return Err(ValidationError::EmptyFile { file_name: name });
        }
        if size > self.limits.max_file_bytes {
            return Err(ValidationError::FileTooLarge {
                file_name: name,
                size,
                limit: self.limits.max_file_bytes,
            });
        }

        let id = self.next_file_id;
        self.next_file_id += 1;
        self.pending.push(QueuedFile {
            id,
            name,
            size,
            file,
        });
        Ok(id)
    }

    /// 逐个加入，返回被拒绝的文件的错误
    pub fn enqueue_all(&mut self, files: impl IntoIterator<Item = F>) -> Vec<ValidationError> {
        if self.state.is_terminal() {
            return vec![ValidationError::Closed];
        }

        let mut rejected = Vec::new();
        let mut seen_any = false;
        for file in files {
            seen_any = true;
            if let Err(e) = self.enqueue(file) {
                rejected.push(e);
            }
        }
        if !seen_any {
            rejected.push(ValidationError::NoFilesSelected);
        }
        rejected
    }

    /// 处理整个待分析队列
    pub async fn run<A, P>(&mut self, analyzer: &A, mut on_progress: P) -> Result<RunSummary, ValidationError>
    where
        A: Analyzer + ?Sized,
        P: FnMut(PipelineState),
    {
        let batch = self.begin_run()?;
        let run_id = batch.run_id;
        let mut summary = RunSummary::default();
        let mut files = batch.files.into_iter();

        for file in files.by_ref() {
            self.mark_current(run_id, &file);
            let outcome = process_file(&file.file, analyzer).await;
            match outcome {
                Ok(_) => summary.succeeded += 1,
                Err(_) => summary.failed += 1,
            }
            let flow = self.record(run_id, file, outcome);
            on_progress(self.state);
            if flow == Flow::Halt {
                break;
            }
        }

        let unprocessed: Vec<_> = files.collect();
        summary.requeued = unprocessed.len();
        self.finish_run(run_id, unprocessed);
        Ok(summary)
    }
}

/// 单个文件：读取 → 空内容检查 → 分析 → 生成报告
pub async fn process_file<F, A>(file: &F, analyzer: &A) -> Result<ReportRecord, ItemError>
where
    F: SourceFile + ?Sized,
    A: Analyzer + ?Sized,
{
    let name = file.name();
    let text = file.read_text().await.map_err(ItemError::Read)?;
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyContent { file_name: name }.into());
    }

    tracing::debug!("分析文件: {} ({} 字符)", name, text.chars().count());
    let analysis = analyzer.analyze(&text).await?;

    Ok(ReportRecord::from_analysis(analysis, name, text, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::store::MemoryStorage;
    use crate::types::{AnalysisResult, Sentiment};
    use futures::executor::block_on;
    use std::cell::Cell;

    #[derive(Debug, Clone)]
    struct MemoryFile {
        name: String,
        content: Result<String, String>,
    }

    impl MemoryFile {
        fn new(name: &str, content: &str) -> Self {
            Self {
                name: name.to_string(),
                content: Ok(content.to_string()),
            }
        }

        fn unreadable(name: &str) -> Self {
            Self {
                name: name.to_string(),
                content: Err("NotReadableError".to_string()),
            }
        }
    }

    #[async_trait(?Send)]
    impl SourceFile for MemoryFile {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn size(&self) -> u64 {
            match &self.content {
                Ok(text) => text.len() as u64,
                Err(_) => 1,
            }
        }

        async fn read_text(&self) -> Result<String, String> {
            self.content.clone()
        }
    }

    /// 内容包含 FAIL 时返回错误
    #[derive(Default)]
    struct ScriptedAnalyzer {
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl Analyzer for ScriptedAnalyzer {
        async fn analyze(&self, document_text: &str) -> Result<AnalysisResult, AnalysisError> {
            self.calls.set(self.calls.get() + 1);
            if document_text.contains("FAIL") {
                return Err(AnalysisError::MissingField("keyInsights"));
            }
            Ok(AnalysisResult {
                title: document_text.to_string(),
                report_date: "2024-03-15".to_string(),
                summary: "摘要".to_string(),
                key_insights: vec!["洞察".to_string()],
                sentiment: Sentiment::Neutral,
                category: "股市".to_string(),
            })
        }
    }

    fn three_files() -> Vec<MemoryFile> {
        vec![
            MemoryFile::new("1.txt", "one"),
            MemoryFile::new("2.txt", "FAIL two"),
            MemoryFile::new("3.md", "three"),
        ]
    }

    fn preview_titles(pipeline: &BatchPipeline<MemoryFile>) -> Vec<&str> {
        pipeline.previews().iter().map(|r| r.title.as_str()).collect()
    }

    // =============================================
    // 顺序处理与失败策略
    // =============================================

    #[test]
    fn test_skip_and_continue() {
        let mut pipeline = BatchPipeline::default();
        assert!(pipeline.enqueue_all(three_files()).is_empty());

        let analyzer = ScriptedAnalyzer::default();
        let mut progress = Vec::new();
        let summary = block_on(pipeline.run(&analyzer, |s| progress.push(s))).unwrap();

        assert_eq!(summary, RunSummary { succeeded: 2, failed: 1, requeued: 0 });
        assert_eq!(preview_titles(&pipeline), vec!["one", "three"]);
        assert_eq!(pipeline.failures().len(), 1);
        assert_eq!(pipeline.failures()[0].name, "2.txt");
        assert!(matches!(
            pipeline.failures()[0].error,
            ItemError::Analysis(AnalysisError::MissingField("keyInsights"))
        ));
        assert_eq!(analyzer.calls.get(), 3);
        assert_eq!(
            progress,
            vec![
                PipelineState::Running { completed: 1, total: 3 },
                PipelineState::Running { completed: 2, total: 3 },
                PipelineState::Running { completed: 3, total: 3 },
            ]
        );
        assert_eq!(pipeline.state(), PipelineState::Ready);
        assert!(pipeline.pending().is_empty());
    }

    #[test]
    fn test_abort_remaining() {
        let mut pipeline = BatchPipeline::new(UploadLimits::default(), FailurePolicy::AbortRemaining);
        pipeline.enqueue_all(three_files());

        let analyzer = ScriptedAnalyzer::default();
        let summary = block_on(pipeline.run(&analyzer, |_| {})).unwrap();

        assert_eq!(summary, RunSummary { succeeded: 1, failed: 1, requeued: 1 });
        assert_eq!(preview_titles(&pipeline), vec!["one"]);
        assert_eq!(pipeline.failures().len(), 1);
        assert_eq!(pipeline.pending().len(), 1);
        assert_eq!(pipeline.pending()[0].name, "3.md");
        assert_eq!(analyzer.calls.get(), 2);
    }

    #[test]
    fn test_unprocessed_files_return_to_front() {
        let mut pipeline = BatchPipeline::new(UploadLimits::default(), FailurePolicy::AbortRemaining);
        pipeline.enqueue_all(three_files());

        let batch = pipeline.begin_run().unwrap();
        // 运行期间追加的文件排在未处理文件之后
        pipeline.enqueue(MemoryFile::new("4.txt", "four")).unwrap();

        let mut files = batch.files.into_iter();
        let first = files.next().unwrap();
        pipeline.record(batch.run_id, first, Err(ItemError::Read("x".into())));
        pipeline.finish_run(batch.run_id, files.collect());

        let names: Vec<_> = pipeline.pending().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["2.txt", "3.md", "4.txt"]);
    }

    #[test]
    fn test_read_failure_and_blank_content() {
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue(MemoryFile::unreadable("a.txt")).unwrap();
        pipeline.enqueue(MemoryFile::new("b.txt", "   \n  ")).unwrap();

        let analyzer = ScriptedAnalyzer::default();
        block_on(pipeline.run(&analyzer, |_| {})).unwrap();

        assert!(matches!(pipeline.failures()[0].error, ItemError::Read(_)));
        assert!(matches!(
            pipeline.failures()[1].error,
            ItemError::Validation(ValidationError::EmptyContent { .. })
        ));
        assert_eq!(analyzer.calls.get(), 0);
    }

    #[test]
    fn test_preview_record_fields() {
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue(MemoryFile::new("weekly.md", "全文内容")).unwrap();
        block_on(pipeline.run(&ScriptedAnalyzer::default(), |_| {})).unwrap();

        let record = &pipeline.previews()[0];
        assert_eq!(record.file_name, "weekly.md");
        assert_eq!(record.raw_content, "全文内容");
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_runs_accumulate_previews() {
        let mut pipeline = BatchPipeline::default();
        let analyzer = ScriptedAnalyzer::default();

        pipeline.enqueue(MemoryFile::new("a.txt", "A")).unwrap();
        block_on(pipeline.run(&analyzer, |_| {})).unwrap();
        pipeline.enqueue(MemoryFile::new("b.txt", "B")).unwrap();
        block_on(pipeline.run(&analyzer, |_| {})).unwrap();

        assert_eq!(preview_titles(&pipeline), vec!["A", "B"]);
        assert_eq!(analyzer.calls.get(), 2);
    }

    // =============================================
    // 运行控制
    // =============================================

    #[test]
    fn test_begin_run_guards() {
        let mut pipeline: BatchPipeline<MemoryFile> = BatchPipeline::default();
        assert_eq!(pipeline.begin_run().unwrap_err(), ValidationError::EmptyQueue);

        pipeline.enqueue(MemoryFile::new("a.txt", "A")).unwrap();
        let _batch = pipeline.begin_run().unwrap();
        pipeline.enqueue(MemoryFile::new("b.txt", "B")).unwrap();
        assert_eq!(pipeline.begin_run().unwrap_err(), ValidationError::Busy);
    }

    #[test]
    fn test_stale_run_is_ignored() {
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue(MemoryFile::new("a.txt", "A")).unwrap();
        let mut batch = pipeline.begin_run().unwrap();
        let file = batch.files.remove(0);

        pipeline.cancel();
        let record = block_on(process_file(&file.file, &ScriptedAnalyzer::default())).unwrap();
        assert_eq!(pipeline.record(batch.run_id, file, Ok(record)), Flow::Halt);
        pipeline.finish_run(batch.run_id, Vec::new());

        assert!(pipeline.previews().is_empty());
        assert_eq!(pipeline.state(), PipelineState::Cancelled);
    }

    #[test]
    fn test_mark_current() {
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue(MemoryFile::new("a.txt", "A")).unwrap();
        let batch = pipeline.begin_run().unwrap();

        pipeline.mark_current(batch.run_id, &batch.files[0]);
        assert_eq!(pipeline.current_file(), Some("a.txt"));

        pipeline.mark_current(batch.run_id + 1, &batch.files[0]);
        pipeline.finish_run(batch.run_id, batch.files);
        assert_eq!(pipeline.current_file(), None);
    }

    #[test]
    fn test_percent() {
        assert_eq!(PipelineState::Running { completed: 1, total: 4 }.percent(), 25);
        assert_eq!(PipelineState::Running { completed: 0, total: 0 }.percent(), 0);
        assert_eq!(PipelineState::Ready.percent(), 0);
    }

    // =============================================
    // 入队校验
    // =============================================

    #[test]
    fn test_enqueue_validation() {
        let limits = UploadLimits {
            max_file_bytes: 8,
            ..Default::default()
        };
        let mut pipeline = BatchPipeline::new(limits, FailurePolicy::default());

        let rejected = pipeline.enqueue_all(vec![
            MemoryFile::new("report.pdf", "x"),
            MemoryFile::new("empty.txt", ""),
            MemoryFile::new("big.md", "123456789"),
            MemoryFile::new("ok.MARKDOWN", "1234"),
        ]);

        assert_eq!(rejected.len(), 3);
        assert!(matches!(rejected[0], ValidationError::UnsupportedFileType { .. }));
        assert!(matches!(rejected[1], ValidationError::EmptyFile { .. }));
        assert!(matches!(
            rejected[2],
            ValidationError::FileTooLarge { size: 9, limit: 8, .. }
        ));
        assert_eq!(pipeline.pending().len(), 1);
        assert_eq!(pipeline.pending()[0].name, "ok.MARKDOWN");
    }

    #[test]
    fn test_enqueue_all_empty_selection() {
        let mut pipeline: BatchPipeline<MemoryFile> = BatchPipeline::default();
        assert_eq!(
            pipeline.enqueue_all(Vec::new()),
            vec![ValidationError::NoFilesSelected]
        );
    }

    #[test]
    fn test_remove_pending() {
        let mut pipeline = BatchPipeline::default();
        let a = pipeline.enqueue(MemoryFile::new("a.txt", "A")).unwrap();
        pipeline.enqueue(MemoryFile::new("b.txt", "B")).unwrap();

        assert!(pipeline.remove_pending(a));
        assert!(!pipeline.remove_pending(a));
        assert_eq!(pipeline.pending()[0].name, "b.txt");
    }

    // =============================================
    // 预览 / 失败
    // =============================================

    #[test]
    fn test_remove_preview_and_dismiss_failure() {
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue_all(vec![
            MemoryFile::new("a.txt", "A"),
            MemoryFile::new("b.txt", "FAIL"),
        ]);
        block_on(pipeline.run(&ScriptedAnalyzer::default(), |_| {})).unwrap();

        let preview_id = pipeline.previews()[0].id.clone();
        assert!(pipeline.remove_preview(&preview_id));
        assert_eq!(pipeline.state(), PipelineState::Ready);

        let failure_id = pipeline.failures()[0].id;
        assert!(pipeline.dismiss_failure(failure_id));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn test_requeue_failed() {
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue_all(three_files());
        block_on(pipeline.run(&ScriptedAnalyzer::default(), |_| {})).unwrap();

        assert_eq!(pipeline.requeue_failed(), Ok(1));
        assert!(pipeline.failures().is_empty());
        assert_eq!(pipeline.pending()[0].name, "2.txt");
    }

    #[test]
    fn test_requeue_after_cancel_is_closed() {
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue_all(three_files());
        block_on(pipeline.run(&ScriptedAnalyzer::default(), |_| {})).unwrap();
        pipeline.cancel();

        assert_eq!(pipeline.requeue_failed(), Err(ValidationError::Closed));
    }

    // =============================================
    // 确认 / 取消
    // =============================================

    #[test]
    fn test_commit_prepends_previews() {
        let storage = MemoryStorage::new();
        let mut store = ReportStore::restore(storage);
        let mut first = BatchPipeline::default();
        first.enqueue_all(vec![MemoryFile::new("x.txt", "X"), MemoryFile::new("y.txt", "Y")]);
        block_on(first.run(&ScriptedAnalyzer::default(), |_| {})).unwrap();
        assert_eq!(first.commit(&mut store).unwrap(), 2);

        let mut second = BatchPipeline::default();
        second.enqueue_all(vec![
            MemoryFile::new("a.txt", "A"),
            MemoryFile::new("b.txt", "B"),
            MemoryFile::new("c.txt", "C"),
        ]);
        block_on(second.run(&ScriptedAnalyzer::default(), |_| {})).unwrap();
        second.commit(&mut store).unwrap();

        let titles: Vec<_> = store.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "X", "Y"]);
        assert_eq!(second.state(), PipelineState::Committed);
        assert!(second.previews().is_empty());
    }

    #[test]
    fn test_commit_guards() {
        let mut store = ReportStore::restore(MemoryStorage::new());
        let mut pipeline = BatchPipeline::default();
        assert!(matches!(
            pipeline.commit(&mut store),
            Err(Error::Validation(ValidationError::NothingToCommit))
        ));

        pipeline.enqueue(MemoryFile::new("a.txt", "A")).unwrap();
        let _batch = pipeline.begin_run().unwrap();
        assert!(matches!(
            pipeline.commit(&mut store),
            Err(Error::Validation(ValidationError::Busy))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_cancel_never_touches_store() {
        let storage = MemoryStorage::new();
        let mut store = ReportStore::restore(storage.clone());
        let mut pipeline = BatchPipeline::default();
        pipeline.enqueue_all(three_files());
        block_on(pipeline.run(&ScriptedAnalyzer::default(), |_| {})).unwrap();

        pipeline.cancel();

        assert_eq!(pipeline.state(), PipelineState::Cancelled);
        assert!(pipeline.previews().is_empty());
        assert!(pipeline.failures().is_empty());
        assert!(store.is_empty());
        assert_eq!(storage.get(crate::store::REPORTS_STORAGE_KEY).unwrap(), None);
        assert!(matches!(
            pipeline.commit(&mut store),
            Err(Error::Validation(ValidationError::Closed))
        ));
    }

    #[test]
    fn test_operations_after_terminal_state() {
        let mut pipeline = BatchPipeline::default();
        pipeline.cancel();

        assert_eq!(
            pipeline.enqueue(MemoryFile::new("a.txt", "A")),
            Err(ValidationError::Closed)
        );
        assert_eq!(pipeline.begin_run().unwrap_err(), ValidationError::Closed);
        assert_eq!(pipeline.requeue_failed(), Err(ValidationError::Closed));
        assert!(!pipeline.remove_pending(1));
    }
}
