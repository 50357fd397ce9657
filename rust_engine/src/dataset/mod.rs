//! LoRA 训练数据集导出
//!
//! 按 JSON 清单逐条加载动画姿态、取景、截图，把图片与标注文本写入归档。

mod archive;
mod generator;
mod manifest;

pub use archive::{entry_path, ArchiveWriter, MemoryArchive, ZipArchive};
pub use generator::{LoraDataGenerator, LoraReport, LoraRequest};
pub use manifest::{CameraBias, DataItem, Manifest, MAX_IMAGE_SIZE};
