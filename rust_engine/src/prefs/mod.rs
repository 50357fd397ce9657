//! 用户偏好持久化
//!
//! `PreferenceStore` 是按字符串键存取 JSON 值的文件存储；
//! `MergeOptions` 是合并/图集选项在其中的读写模型。

mod merge_options;
mod store;

pub use merge_options::{atlas_resolution, AtlasKind, MergeMode, MergeOptions};
pub use store::PreferenceStore;
