//! 文件下载（Blob + object URL）

use crate::js_error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// 生成 Markdown 文件并触发浏览器下载
pub fn download_markdown(file_name: &str, content: &str) -> Result<(), String> {
    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let options = BlobPropertyBag::new();
    options.set_type("text/markdown;charset=utf-8");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "无法获取 document".to_string())?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| "无法创建下载链接".to_string())?;

    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    tracing::debug!("下载 {}", file_name);
    Url::revoke_object_url(&url).map_err(js_error)
}
