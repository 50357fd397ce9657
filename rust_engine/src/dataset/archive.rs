//! 数据集归档

use std::io::{Seek, Write};

use crate::{CaptureError, Result};

/// 归档写入器：按 目录/名称.扩展名 追加条目
pub trait ArchiveWriter {
    fn add_entry(&mut self, folder: &str, name: &str, extension: &str, data: &[u8]) -> Result<()>;
}

/// 条目路径；目录为空时直接放在根目录
pub fn entry_path(folder: &str, name: &str, extension: &str) -> String {
    if folder.is_empty() {
        format!("{}.{}", name, extension)
    } else {
        format!("{}/{}.{}", folder, name, extension)
    }
}

/// zip 归档（deflate 压缩）
pub struct ZipArchive<W: Write + Seek> {
    writer: zip::ZipWriter<W>,
    entry_count: usize,
}

impl<W: Write + Seek> ZipArchive<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: zip::ZipWriter::new(inner),
            entry_count: 0,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// 写入中央目录并返回底层写入器
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .finish()
            .map_err(|e| CaptureError::Archive(format!("Failed to finish zip: {}", e)))
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchive<W> {
    fn add_entry(&mut self, folder: &str, name: &str, extension: &str, data: &[u8]) -> Result<()> {
        let path = entry_path(folder, name, extension);
        let options =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.writer
            .start_file(path.as_str(), options)
            .map_err(|e| CaptureError::Archive(format!("Failed to start '{}': {}", path, e)))?;
        self.writer.write_all(data)?;
        self.entry_count += 1;
        Ok(())
    }
}

/// 内存归档，按写入顺序保存条目
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, data)| data.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArchiveWriter for MemoryArchive {
    fn add_entry(&mut self, folder: &str, name: &str, extension: &str, data: &[u8]) -> Result<()> {
        self.entries.push((entry_path(folder, name, extension), data.to_vec()));
        Ok(())
    }
}
