//! Markdown 导出
//!
//! 单篇报告 / 多篇报告合并为一个 Markdown 文档，文件由浏览器端下载。

use crate::types::ReportRecord;
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

/// 单篇报告 → Markdown
pub fn report_to_markdown(record: &ReportRecord) -> String {
    let mut out = String::new();
    write_report(&mut out, record);
    out
}

/// 多篇报告 → 一个 Markdown 文档（按传入顺序，以分隔线隔开）
pub fn reports_to_markdown<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ReportRecord>,
{
    let mut out = String::new();
    for (i, record) in records.into_iter().enumerate() {
        if i > 0 {
            out.push_str("\n---\n\n");
        }
        write_report(&mut out, record);
    }
    out
}

fn write_report(out: &mut String, record: &ReportRecord) {
    // 写入 String 不会失败
    let _ = writeln!(out, "# {}\n", record.title);
    let _ = writeln!(out, "- 分类: {}", record.category);
    let _ = writeln!(out, "- 报告日期: {}", record.report_date);
    let _ = writeln!(out, "- 市场情绪: {}", record.sentiment.long_label());
    let _ = writeln!(out, "- 文件名: {}", record.file_name);
    let _ = writeln!(out, "- 处理时间: {}\n", format_timestamp(&record.uploaded_at));

    let _ = writeln!(out, "## AI 核心摘要\n\n{}\n", record.summary);

    out.push_str("## AI 关键洞察\n\n");
    if record.key_insights.is_empty() {
        out.push_str("（无）\n");
    }
    for (i, insight) in record.key_insights.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, insight);
    }

    let _ = writeln!(out, "\n## 原始报告内容\n\n{}", record.raw_content.trim_end());
}

/// 本地时间 YYYY-MM-DD HH:MM
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// 下载文件名：去掉路径分隔符等不能出现在文件名里的字符
pub fn download_file_name(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        "report.md".to_string()
    } else {
        format!("{}.md", cleaned)
    }
}
