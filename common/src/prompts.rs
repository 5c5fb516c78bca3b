//! 提示词与结构化输出 schema
//!
//! - truncate_chars: 按字符数截断（不会切断 UTF-8 字符）
//! - build_analysis_prompt: 报告分析提示词
//! - analysis_response_schema: Gemini responseSchema

use crate::types::Sentiment;
use serde_json::{json, Value};

/// 分析结果必须包含的字段
pub const REQUIRED_FIELDS: &[&str] = &[
    "title",
    "reportDate",
    "summary",
    "keyInsights",
    "sentiment",
    "category",
];

/// 截断到最多 `max_chars` 个字符，返回 (截断后的文本, 是否发生截断)
///
/// 超长文档只提交开头部分，不做分段或二次摘要。
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}

/// 分析提示词生成
///
/// # Arguments
/// * `text` - 报告原文
/// * `max_chars` - 提交给模型的最大字符数
pub fn build_analysis_prompt(text: &str, max_chars: usize) -> String {
    let (content, truncated) = truncate_chars(text, max_chars);
    if truncated {
        tracing::debug!(
            "报告内容超过 {} 字符，已截断（原文 {} 字符）",
            max_chars,
            text.chars().count()
        );
    }

    format!(
        r#"请分析以下市场报告内容，并以JSON格式返回分析结果。语言必须使用中文。

## 输出字段
- title: 报告的简短标题
- reportDate: 报告所属日期（格式: YYYY-MM-DD，必须是真实存在的日期）
- summary: 报告的核心摘要（100字以内）
- keyInsights: 3-5条关键洞察
- sentiment: 市场情绪，只能是 positive、neutral、negative 之一
- category: 报告所属的市场分类（如: 股市, 宏观经济, 大宗商品等）

内容如下：
{content}"#
    )
}

/// Gemini 结构化输出 schema
pub fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "报告的简短标题" },
            "reportDate": { "type": "STRING", "description": "报告所属日期 (格式: YYYY-MM-DD)" },
            "summary": { "type": "STRING", "description": "报告的核心摘要 (100字以内)" },
            "keyInsights": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3-5条关键洞察"
            },
            "sentiment": {
                "type": "STRING",
                "enum": Sentiment::ALL.map(|s| s.as_str()),
                "description": "市场情绪"
            },
            "category": { "type": "STRING", "description": "报告所属的市场分类 (如: 股市, 宏观经济, 大宗商品等)" }
        },
        "required": REQUIRED_FIELDS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        let (content, truncated) = truncate_chars("短文本", 10);
        assert_eq!(content, "短文本");
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_exact_length_unchanged() {
        let text = "a".repeat(10_000);
        let (content, truncated) = truncate_chars(&text, 10_000);
        assert_eq!(content.len(), 10_000);
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // 每个汉字 3 字节
        let text = "市场".repeat(6_000);
        let (content, truncated) = truncate_chars(&text, 10_000);
        assert!(truncated);
        assert_eq!(content.chars().count(), 10_000);
        assert!(text.starts_with(content));
    }

    #[test]
    fn test_prompt_contains_truncated_content() {
        let text = format!("{}{}", "x".repeat(10_000), "TAIL_MARKER");
        let prompt = build_analysis_prompt(&text, 10_000);
        assert!(!prompt.contains("TAIL_MARKER"));
        assert!(prompt.contains("语言必须使用中文"));
        assert!(prompt.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = analysis_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .expect("required 缺失")
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
    }

    #[test]
    fn test_schema_constrains_sentiment() {
        let schema = analysis_response_schema();
        let values = schema["properties"]["sentiment"]["enum"]
            .as_array()
            .expect("enum 缺失");
        assert_eq!(values.len(), 3);
        assert_eq!(schema["properties"]["keyInsights"]["type"], "ARRAY");
    }
}
