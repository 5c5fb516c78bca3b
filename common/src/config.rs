//! 设置
//!
//! 分析服务参数、上传限制，以及保存在本地存储中的用户设置。

use crate::store::Storage;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 提交给模型的最大字符数，超出部分直接截断
pub const DEFAULT_MAX_INPUT_CHARS: usize = 10_000;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// 10 MiB
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub const SETTINGS_STORAGE_KEY: &str = "market_reports_settings";

/// 分析服务参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    pub model: String,
    pub api_base: String,
    pub max_input_chars: usize,
    pub timeout_seconds: u64,
    pub temperature: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            temperature: 0.1,
        }
    }
}

impl AnalysisConfig {
    /// generateContent 接口地址（不含 API Key）
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

/// 上传限制
#[derive(Debug, Clone, PartialEq)]
pub struct UploadLimits {
    pub max_file_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            allowed_extensions: vec!["txt".into(), "md".into(), "markdown".into()],
        }
    }
}

impl UploadLimits {
    pub fn is_allowed(&self, file_name: &str) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    /// 文件选择框的 accept 属性
    pub fn accept_attribute(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// 用户设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub analysis: AnalysisConfig,
}

impl Settings {
    /// 读取设置；不存在或损坏时使用默认值
    pub fn load<S: Storage>(storage: &S) -> Self {
        match storage.get(SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("设置数据损坏，使用默认值: {}", e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("读取设置失败，使用默认值: {}", e);
                Self::default()
            }
        }
    }

    pub fn save<S: Storage>(&self, storage: &S) -> crate::Result<()> {
        let content = serde_json::to_string(self)?;
        storage.set(SETTINGS_STORAGE_KEY, &content)?;
        Ok(())
    }

    /// 构建环境提供的 Key 优先，其次是用户设置；空白视为未设置
    pub fn resolve_api_key(&self, env_key: Option<&str>) -> Option<String> {
        env_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()))
            .map(str::to_string)
    }
}
