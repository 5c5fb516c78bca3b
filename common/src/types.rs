//! 报告数据类型
//!
//! - Sentiment: 市场情绪（positive / neutral / negative）
//! - AnalysisResult: 一次分析调用的结构化结果（未持久化）
//! - ReportRecord: 已确认并持久化的报告
//!
//! ReportRecord 的 JSON 键名沿用浏览器中已保存数据的格式
//! （uploadDate / reportDate / content），以便读取旧数据。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 市场情绪
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// 卡片上显示的短标签
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "乐观",
            Sentiment::Neutral => "中性",
            Sentiment::Negative => "悲观",
        }
    }

    /// 详情页显示的完整标签
    pub fn long_label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "乐观 (Positive)",
            Sentiment::Neutral => "中性 (Neutral)",
            Sentiment::Negative => "悲观 (Negative)",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    /// 前后空白与大小写不敏感，其余取值一律拒绝
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(s.to_string()),
        }
    }
}

/// 分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub title: String,
    /// YYYY-MM-DD
    pub report_date: String,
    pub summary: String,
    pub key_insights: Vec<String>,
    pub sentiment: Sentiment,
    pub category: String,
}

/// 解析 YYYY-MM-DD（严格：4-2-2 位且必须是真实日期）
pub fn parse_report_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// 已确认的报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "uploadDate")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "reportDate")]
    pub report_date: String,
    pub file_name: String,
    pub summary: String,
    pub key_insights: Vec<String>,
    pub sentiment: Sentiment,
    pub category: String,
    #[serde(rename = "content")]
    pub raw_content: String,
}

impl ReportRecord {
    /// 分析结果 + 文件信息 → 新报告（生成新的 id）
    pub fn from_analysis(
        analysis: AnalysisResult,
        file_name: impl Into<String>,
        raw_content: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: analysis.title,
            uploaded_at,
            report_date: analysis.report_date,
            file_name: file_name.into(),
            summary: analysis.summary,
            key_insights: analysis.key_insights,
            sentiment: analysis.sentiment,
            category: analysis.category,
            raw_content: raw_content.into(),
        }
    }

    pub fn report_date_value(&self) -> Option<NaiveDate> {
        parse_report_date(&self.report_date)
    }
}
