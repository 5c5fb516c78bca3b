//! Gemini generateContent 的请求/响应类型
//!
//! 传输层（浏览器 fetch）在 web-wasm 中实现，这里只负责报文的构造与解读，
//! 以便在本地测试。

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::parser::parse_analysis_response;
use crate::prompts::{analysis_response_schema, build_analysis_prompt};
use crate::types::AnalysisResult;
use serde::{Deserialize, Serialize};

/// Gemini API 请求
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema")]
    pub response_schema: serde_json::Value,
}

/// Gemini API 响应
#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback", default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason", default)]
    pub block_reason: Option<String>,
}

/// 错误响应体 `{"error": {"code": 400, "message": "...", "status": "..."}}`
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// 报告分析请求（原文按 `max_input_chars` 截断）
pub fn build_request(document_text: &str, config: &AnalysisConfig) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: build_analysis_prompt(document_text, config.max_input_chars),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: config.temperature,
            response_mime_type: "application/json".to_string(),
            response_schema: analysis_response_schema(),
        },
    }
}

/// 请求地址
pub fn request_url(config: &AnalysisConfig, api_key: &str) -> String {
    format!("{}?key={}", config.endpoint(), api_key)
}

/// 取出第一个候选的文本（多个 part 依次拼接）
pub fn extract_response_text(response: &GeminiResponse) -> Result<String, AnalysisError> {
    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!("请求被拦截: {}", reason);
        }
        return Err(AnalysisError::EmptyResponse);
    }

    Ok(text)
}

/// 非 2xx 响应 → AnalysisError::Http
pub fn api_error(status: u16, body: &str) -> AnalysisError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(code) if !parsed.error.message.is_empty() => {
                format!("{} ({})", parsed.error.message, code)
            }
            Some(code) => code,
            None => parsed.error.message,
        },
        Err(_) => body.chars().take(200).collect(),
    };

    AnalysisError::Http { status, message }
}

/// HTTP 状态码 + 响应体 → 分析结果
///
/// 传输层拿到完整响应后调用，非 2xx / 空响应 / 解析失败都映射为 AnalysisError。
pub fn interpret_response(status: u16, body: &str) -> Result<AnalysisResult, AnalysisError> {
    if !(200..300).contains(&status) {
        return Err(api_error(status, body));
    }

    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|e| AnalysisError::Parse(e.to_string()))?;
    let text = extract_response_text(&response)?;
    parse_analysis_response(&text)
}
