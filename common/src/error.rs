//! 错误类型定义
//!
//! - AnalysisError: 外部 AI 服务调用或结果解析失败
//! - ValidationError: 发起网络请求之前的输入校验失败
//! - StorageError: 持久化写入失败
//! - PersistenceReadError: 持久化数据损坏（在本地恢复为空，不向用户报告）
//! - ItemError: 批量流水线中单个文件的失败原因

use thiserror::Error;

/// 分析客户端错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("未配置 API Key，请在设置中填写或在构建时提供 GEMINI_API_KEY")]
    MissingApiKey,

    #[error("请求失败: {0}")]
    Request(String),

    #[error("API 返回错误 (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("分析超时（超过 {seconds} 秒）")]
    Timeout { seconds: u64 },

    #[error("分析失败：未获取到有效的分析内容")]
    EmptyResponse,

    #[error("无法解析 AI 分析结果: {0}")]
    Parse(String),

    #[error("分析结果缺少必填字段: {0}")]
    MissingField(&'static str),

    #[error("无效的市场情绪: {0}")]
    InvalidSentiment(String),

    #[error("无效的报告日期: {0}（应为 YYYY-MM-DD）")]
    InvalidReportDate(String),
}

/// 输入校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("请先选择一个文件")]
    NoFilesSelected,

    #[error("待分析队列为空")]
    EmptyQueue,

    #[error("文件过大: {file_name}（{size} 字节，上限 {limit} 字节）")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },

    #[error("不支持的文件类型: {file_name}")]
    UnsupportedFileType { file_name: String },

    #[error("文件为空: {file_name}")]
    EmptyFile { file_name: String },

    #[error("文件没有可分析的文本内容: {file_name}")]
    EmptyContent { file_name: String },

    #[error("正在分析中，请稍候")]
    Busy,

    #[error("没有可保存的分析结果")]
    NothingToCommit,

    #[error("上传会话已结束")]
    Closed,
}

/// 持久化写入错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("本地存储不可用: {0}")]
    Unavailable(String),

    #[error("写入本地存储失败: {0}")]
    Write(String),

    #[error("序列化失败: {0}")]
    Serialize(String),
}

/// 持久化数据读取问题（恢复时记录日志后丢弃）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceReadError {
    #[error("无法读取本地存储: {0}")]
    Unavailable(String),

    #[error("持久化数据不是合法 JSON: {0}")]
    Malformed(String),

    #[error("持久化数据不是数组")]
    NotAnArray,

    #[error("持久化数据结构不匹配: {0}")]
    WrongShape(String),
}

/// 单个文件在流水线中的失败原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemError {
    #[error("读取文件失败: {0}")]
    Read(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// 通用错误类型
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, Error>;
