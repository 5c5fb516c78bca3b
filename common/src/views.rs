//! 列表视图的派生数据
//!
//! 分类集合、搜索 + 分类筛选、按报告日期倒序排序、按月分组。
//! 日期无法解析的报告不会报错：排序时放在最后，分组时归入「日期未知」。

use crate::types::ReportRecord;
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::HashSet;

/// 不筛选分类
pub const ALL_CATEGORY: &str = "全部";

pub const UNKNOWN_MONTH_LABEL: &str = "日期未知";

/// ["全部", 各分类按首次出现顺序]
pub fn categories(records: &[ReportRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = vec![ALL_CATEGORY.to_string()];
    for record in records {
        if record.category != ALL_CATEGORY && seen.insert(record.category.as_str()) {
            result.push(record.category.clone());
        }
    }
    result
}

/// 列表筛选条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub search: String,
    pub category: String,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORY.to_string(),
        }
    }
}

impl ReportQuery {
    /// 标题或摘要包含搜索词（去除首尾空白，不区分大小写）；空白搜索词不筛选
    pub fn matches_search(&self, record: &ReportRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record.title.to_lowercase().contains(&needle)
            || record.summary.to_lowercase().contains(&needle)
    }

    pub fn matches_category(&self, record: &ReportRecord) -> bool {
        self.category == ALL_CATEGORY || record.category == self.category
    }

    pub fn matches(&self, record: &ReportRecord) -> bool {
        self.matches_search(record) && self.matches_category(record)
    }
}

/// 按报告日期倒序；无效日期排在最后（稳定排序）
pub fn compare_report_dates(a: &ReportRecord, b: &ReportRecord) -> Ordering {
    match (a.report_date_value(), b.report_date_value()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 排序后筛选
pub fn filter_and_sort<'a>(records: &'a [ReportRecord], query: &ReportQuery) -> Vec<&'a ReportRecord> {
    let mut sorted: Vec<&ReportRecord> = records.iter().collect();
    sorted.sort_by(|a, b| compare_report_dates(a, b));
    sorted.retain(|record| query.matches(record));
    sorted
}

/// 同一年月的报告
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup<'a> {
    /// (年, 月)；None 表示日期未知
    pub key: Option<(i32, u32)>,
    pub records: Vec<&'a ReportRecord>,
}

impl MonthGroup<'_> {
    /// 「2024年 3月」/「日期未知」
    pub fn label(&self) -> String {
        match self.key {
            Some((year, month)) => format!("{}年 {}月", year, month),
            None => UNKNOWN_MONTH_LABEL.to_string(),
        }
    }
}

/// 按报告日期的年月分组，保持输入顺序；日期未知的分组总在最后
pub fn group_by_month<'a, I>(records: I) -> Vec<MonthGroup<'a>>
where
    I: IntoIterator<Item = &'a ReportRecord>,
{
    let mut groups: Vec<MonthGroup<'a>> = Vec::new();
    let mut unknown: Vec<&'a ReportRecord> = Vec::new();

    for record in records {
        let Some(date) = record.report_date_value() else {
            unknown.push(record);
            continue;
        };
        let key = Some((date.year(), date.month()));
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.records.push(record),
            None => groups.push(MonthGroup {
                key,
                records: vec![record],
            }),
        }
    }

    if !unknown.is_empty() {
        groups.push(MonthGroup {
            key: None,
            records: unknown,
        });
    }
    groups
}

/// 卡片摘要：超过 `max_chars` 个字符时截断并加省略号
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}…", text[..byte_index].trim_end()),
        None => text.to_string(),
    }
}
