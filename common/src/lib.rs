//! Report AI Common Library
//!
//! 浏览器端（WASM）与本地测试共用的数据模型、分析契约、批量上传流水线与报告存储

pub mod analyzer;
pub mod config;
pub mod error;
pub mod export;
pub mod gemini;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod store;
pub mod types;
pub mod views;

pub use analyzer::{with_timeout, Analyzer};
pub use config::{AnalysisConfig, Settings, UploadLimits};
pub use error::{AnalysisError, Error, ItemError, Result, StorageError, ValidationError};
pub use parser::{extract_json, parse_analysis_response};
pub use pipeline::{BatchPipeline, FailurePolicy, Flow, PipelineState, SourceFile};
pub use store::{MemoryStorage, ReportStore, Storage};
pub use types::{AnalysisResult, ReportRecord, Sentiment};
pub use views::{MonthGroup, ReportQuery, ALL_CATEGORY};
