//! Gemini API 客户端（fetch）
//!
//! 报文的构造与解读在 report_ai_common::gemini，这里只负责发送请求和超时。

use crate::js_error;
use async_trait::async_trait;
use gloo::timers::future::TimeoutFuture;
use report_ai_common::gemini::{build_request, interpret_response, request_url};
use report_ai_common::{with_timeout, AnalysisConfig, AnalysisError, AnalysisResult, Analyzer};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response};

/// 构建时提供的 API Key（优先于设置面板中的值）
pub const BUILD_API_KEY: Option<&str> = option_env!("GEMINI_API_KEY");

/// Gemini 分析客户端
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: AnalysisConfig,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: AnalysisConfig, api_key: Option<String>) -> Self {
        Self { config, api_key }
    }

    /// 发送请求，返回 (HTTP 状态码, 响应体)
    async fn post(
        &self,
        url: &str,
        body: &str,
        controller: &AbortController,
    ) -> Result<(u16, String), JsValue> {
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(body));
        opts.set_signal(Some(&controller.signal()));

        let request = Request::new_with_str_and_init(url, &opts)?;
        request.headers().set("Content-Type", "application/json")?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("无法获取 window"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;

        let text = JsFuture::from(resp.text()?).await?;
        Ok((resp.status(), text.as_string().unwrap_or_default()))
    }
}

#[async_trait(?Send)]
impl Analyzer for GeminiClient {
    async fn analyze(&self, document_text: &str) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;

        let request = build_request(document_text, &self.config);
        let body =
            serde_json::to_string(&request).map_err(|e| AnalysisError::Request(e.to_string()))?;
        let url = request_url(&self.config, api_key);

        let controller = AbortController::new().map_err(|e| AnalysisError::Request(js_error(e)))?;
        let seconds = self.config.timeout_seconds;
        let millis = u32::try_from(seconds.saturating_mul(1000)).unwrap_or(u32::MAX);

        let fetch = self.post(&url, &body, &controller);
        let (status, text) = match with_timeout(fetch, TimeoutFuture::new(millis), seconds).await {
            Ok(result) => result.map_err(|e| AnalysisError::Request(js_error(e)))?,
            Err(e) => {
                controller.abort();
                tracing::warn!("分析请求超时（{} 秒）", seconds);
                return Err(e);
            }
        };

        tracing::debug!("Gemini 响应 HTTP {}（{} 字节）", status, text.len());
        interpret_response(status, &text)
    }
}
