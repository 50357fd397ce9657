//! 资源获取
//!
//! `http://` / `https://` 开头的位置通过阻塞 HTTP 请求获取，其余按文件路径读取。

use std::path::Path;

use crate::{CaptureError, Result};

/// 是否为远程地址
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// 获取二进制内容
pub fn fetch_bytes(location: &str) -> Result<Vec<u8>> {
    if is_remote(location) {
        log::debug!("Fetching {}", location);
        let response = reqwest::blocking::get(location)
            .map_err(|e| CaptureError::Fetch(format!("{}: {}", location, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Fetch(format!("{}: HTTP {}", location, status)));
        }
        let bytes = response
            .bytes()
            .map_err(|e| CaptureError::Fetch(format!("{}: {}", location, e)))?;
        Ok(bytes.to_vec())
    } else {
        std::fs::read(Path::new(location))
            .map_err(|e| CaptureError::Fetch(format!("{}: {}", location, e)))
    }
}

/// 获取文本内容（UTF-8）
pub fn fetch_text(location: &str) -> Result<String> {
    let bytes = fetch_bytes(location)?;
    String::from_utf8(bytes).map_err(|e| CaptureError::Fetch(format!("{}: {}", location, e)))
}
