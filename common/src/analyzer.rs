//! 分析客户端契约
//!
//! 浏览器端的 Gemini 客户端与测试用的脚本化实现都通过 `Analyzer` 接入流水线。
//! 浏览器中的 future 不是 Send，所以 trait 使用 `?Send`。

use crate::error::AnalysisError;
use crate::types::AnalysisResult;
use async_trait::async_trait;
use futures::future::{select, Either};
use futures::pin_mut;
use std::future::Future;
use std::rc::Rc;

/// 单次分析调用：报告原文 → 结构化结果
#[async_trait(?Send)]
pub trait Analyzer {
    async fn analyze(&self, document_text: &str) -> Result<AnalysisResult, AnalysisError>;
}

#[async_trait(?Send)]
impl<A: Analyzer + ?Sized> Analyzer for &A {
    async fn analyze(&self, document_text: &str) -> Result<AnalysisResult, AnalysisError> {
        (**self).analyze(document_text).await
    }
}

#[async_trait(?Send)]
impl<A: Analyzer + ?Sized> Analyzer for Rc<A> {
    async fn analyze(&self, document_text: &str) -> Result<AnalysisResult, AnalysisError> {
        (**self).analyze(document_text).await
    }
}

/// 等待 `request`，`timer` 先完成时返回 `AnalysisError::Timeout`
///
/// 计时器由调用方提供（浏览器中为 gloo 的 `TimeoutFuture`），超时后 `request` 被丢弃。
pub async fn with_timeout<R, T>(
    request: R,
    timer: T,
    seconds: u64,
) -> Result<R::Output, AnalysisError>
where
    R: Future,
    T: Future<Output = ()>,
{
    pin_mut!(request);
    pin_mut!(timer);

    match select(request, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(_) => Err(AnalysisError::Timeout { seconds }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sentiment;
    use futures::executor::block_on;
    use futures::future::{pending, ready};

    struct EchoAnalyzer;

    #[async_trait(?Send)]
    impl Analyzer for EchoAnalyzer {
        async fn analyze(&self, document_text: &str) -> Result<AnalysisResult, AnalysisError> {
            if document_text.is_empty() {
                return Err(AnalysisError::EmptyResponse);
            }
            Ok(AnalysisResult {
                title: document_text.to_string(),
                report_date: "2024-01-02".to_string(),
                summary: String::new(),
                key_insights: vec![],
                sentiment: Sentiment::Neutral,
                category: "其他".to_string(),
            })
        }
    }

    #[test]
    fn test_analyzer_through_reference_and_rc() {
        let analyzer = EchoAnalyzer;
        let by_ref = block_on((&analyzer).analyze("周报")).unwrap();
        assert_eq!(by_ref.title, "周报");

        let shared: Rc<dyn Analyzer> = Rc::new(EchoAnalyzer);
        assert_eq!(
            block_on(shared.analyze("")),
            Err(AnalysisError::EmptyResponse)
        );
    }

    #[test]
    fn test_with_timeout_timer_first() {
        let result = block_on(with_timeout(pending::<u16>(), ready(()), 60));
        assert_eq!(result, Err(AnalysisError::Timeout { seconds: 60 }));
    }

    #[test]
    fn test_with_timeout_request_first() {
        let result = block_on(with_timeout(ready(200u16), pending::<()>(), 60));
        assert_eq!(result, Ok(200));
    }

    struct StalledAnalyzer;

    #[async_trait(?Send)]
    impl Analyzer for StalledAnalyzer {
        async fn analyze(&self, _document_text: &str) -> Result<AnalysisResult, AnalysisError> {
            with_timeout(pending::<Result<AnalysisResult, AnalysisError>>(), ready(()), 1).await?
        }
    }

    #[test]
    fn test_stalled_analyzer_reports_timeout() {
        assert_eq!(
            block_on(StalledAnalyzer.analyze("正文")),
            Err(AnalysisError::Timeout { seconds: 1 })
        );
    }
}
