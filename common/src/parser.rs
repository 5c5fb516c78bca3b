//! AI 响应解析
//!
//! 模型输出先按宽松的结构（全部字段可缺省）反序列化，
//! 再逐项校验转换为 AnalysisResult。字段缺失、为空白或取值非法时
//! 返回 AnalysisError，不做默认值填充。

use crate::error::AnalysisError;
use crate::types::{parse_report_date, AnalysisResult, Sentiment};
use serde::Deserialize;

/// 响应文本中的 JSON 部分
///
/// 抽取优先级:
/// 1. ```json ... ``` 代码块
/// 2. 第一个 `{` 到最后一个 `}`
///
/// # Examples
/// ```
/// use report_ai_common::extract_json;
///
/// let response = "结果如下：{\"title\": \"周报\"}";
/// assert_eq!(extract_json(response), Some("{\"title\": \"周报\"}"));
/// ```
pub fn extract_json(response: &str) -> Option<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = response[start..].find("```") {
            return Some(response[start..start + end_offset].trim());
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    title: Option<String>,
    report_date: Option<String>,
    summary: Option<String>,
    key_insights: Option<Vec<String>>,
    sentiment: Option<String>,
    category: Option<String>,
}

impl TryFrom<RawAnalysis> for AnalysisResult {
    type Error = AnalysisError;

    fn try_from(raw: RawAnalysis) -> Result<Self, Self::Error> {
        let title = required_text(raw.title, "title")?;
        let report_date = required_text(raw.report_date, "reportDate")?;
        let summary = required_text(raw.summary, "summary")?;
        let category = required_text(raw.category, "category")?;
        let sentiment = raw
            .sentiment
            .ok_or(AnalysisError::MissingField("sentiment"))?;
        let key_insights = raw
            .key_insights
            .ok_or(AnalysisError::MissingField("keyInsights"))?;

        if parse_report_date(&report_date).is_none() {
            return Err(AnalysisError::InvalidReportDate(report_date));
        }

        let sentiment: Sentiment = sentiment
            .parse()
            .map_err(AnalysisError::InvalidSentiment)?;

        let key_insights = key_insights
            .into_iter()
            .map(|insight| insight.trim().to_string())
            .filter(|insight| !insight.is_empty())
            .collect();

        Ok(AnalysisResult {
            title,
            report_date,
            summary,
            key_insights,
            sentiment,
            category,
        })
    }
}

/// 去掉首尾空白后为空的文本视同缺失
fn required_text(value: Option<String>, field: &'static str) -> Result<String, AnalysisError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AnalysisError::MissingField(field))
}

/// 解析分析响应
///
/// # Arguments
/// * `response` - 模型返回的文本
///
/// # Returns
/// * `Ok(AnalysisResult)` - 解析并校验成功
/// * `Err(AnalysisError)` - 空响应 / JSON 不合法 / 字段缺失或取值非法
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult, AnalysisError> {
    if response.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let json_str = extract_json(response)
        .ok_or_else(|| AnalysisError::Parse("响应中没有 JSON 对象".into()))?;

    let raw: RawAnalysis = serde_json::from_str(json_str.trim())
        .map_err(|e| AnalysisError::Parse(e.to_string()))?;

    AnalysisResult::try_from(raw)
}
