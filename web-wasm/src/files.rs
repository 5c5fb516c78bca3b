//! 浏览器 File → SourceFile

use async_trait::async_trait;
use gloo::file::futures::read_as_text;
use report_ai_common::SourceFile;
use web_sys::FileList;

/// 用户选择或拖入的文件
#[derive(Debug, Clone)]
pub struct BrowserFile(web_sys::File);

impl From<web_sys::File> for BrowserFile {
    fn from(file: web_sys::File) -> Self {
        Self(file)
    }
}

#[async_trait(?Send)]
impl SourceFile for BrowserFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn size(&self) -> u64 {
        self.0.size() as u64
    }

    async fn read_text(&self) -> Result<String, String> {
        let file = gloo::file::File::from(self.0.clone());
        read_as_text(&file).await.map_err(|e| e.to_string())
    }
}

/// FileList → Vec<BrowserFile>
pub fn collect_files(list: &FileList) -> Vec<BrowserFile> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(BrowserFile::from)
        .collect()
}
