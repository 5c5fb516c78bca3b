//! 报告存储
//!
//! 内存中的报告列表 + 本地键值存储镜像。启动时 `restore` 一次，
//! 之后每次 `commit` 都整体覆盖写入。

use crate::error::{PersistenceReadError, StorageError};
use crate::types::ReportRecord;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const REPORTS_STORAGE_KEY: &str = "market_reports";

/// 键值存储（浏览器 localStorage / 测试用内存实现）
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// 内存存储，克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 报告存储
#[derive(Debug, Clone)]
pub struct ReportStore<S> {
    storage: S,
    key: String,
    records: Vec<ReportRecord>,
}

impl<S: Storage> ReportStore<S> {
    /// 从默认存储槽恢复
    pub fn restore(storage: S) -> Self {
        Self::restore_from(storage, REPORTS_STORAGE_KEY)
    }

    /// 恢复报告列表。数据损坏时记录日志并返回空列表，不向调用方报错
    pub fn restore_from(storage: S, key: &str) -> Self {
        let records = match read_persisted(&storage, key) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("丢弃无法读取的报告数据: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("恢复报告 {} 条", records.len());

        Self {
            storage,
            key: key.to_string(),
            records,
        }
    }

    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ReportRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 新报告整体插入到最前面（[A, B, C] + [X, Y] → [A, B, C, X, Y]），然后整体写入
    ///
    /// id 重复的报告会被跳过。写入失败时内存中的数据保留，错误返回给调用方。
    pub fn commit(&mut self, new_records: Vec<ReportRecord>) -> Result<usize, StorageError> {
        let mut seen: HashSet<String> = self.records.iter().map(|r| r.id.clone()).collect();
        let mut accepted = Vec::with_capacity(new_records.len());

        for record in new_records {
            if seen.insert(record.id.clone()) {
                accepted.push(record);
            } else {
                tracing::warn!("跳过重复的报告 id: {}", record.id);
            }
        }

        let count = accepted.len();
        accepted.append(&mut self.records);
        self.records = accepted;

        tracing::info!("保存报告 {} 条，共 {} 条", count, self.records.len());
        self.persist()?;
        Ok(count)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string(&self.records)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.set(&self.key, &content)
    }
}

/// 读取持久化的报告列表；存储槽不存在时返回空列表
///
/// 数组中无法解析的单条记录会被跳过（记录日志），其余记录照常返回。
pub fn read_persisted<S: Storage>(
    storage: &S,
    key: &str,
) -> Result<Vec<ReportRecord>, PersistenceReadError> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(Vec::new()),
        Err(e) => return Err(PersistenceReadError::Unavailable(e.to_string())),
    };

    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| PersistenceReadError::Malformed(e.to_string()))?;

    let serde_json::Value::Array(items) = value else {
        return Err(PersistenceReadError::NotAnArray);
    };

    let total = items.len();
    let records: Vec<ReportRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "跳过第 {} 条报告: {}",
                    index,
                    PersistenceReadError::WrongShape(e.to_string())
                );
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!("已跳过 {} 条无法读取的报告", total - records.len());
    }
    Ok(records)
}
