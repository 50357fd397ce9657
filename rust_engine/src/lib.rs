//! Avatar Capture Engine - 角色截图与 LoRA 数据集导出
//!
//! 提供：
//! - glTF/GLB 蒙皮角色加载与场景图
//! - 骨骼顶点偏移包围盒计算（T-pose 采样，保证姿态恢复）
//! - 基于骨骼锚点的相机取景（特写/中景/牛仔/全身）
//! - 软件光栅化截图
//! - 基于 JSON 清单的 LoRA 数据集 zip 导出
//! - 合并/图集选项偏好持久化

pub mod animation;
pub mod bounds;
pub mod capture;
pub mod config;
pub mod dataset;
pub mod fetch;
pub mod framing;
pub mod model;
pub mod prefs;
pub mod scene;
pub mod skeleton;
pub mod skinning;

pub use animation::{AnimationClip, AnimationPlayer, GltfAnimationPlayer};
pub use bounds::{compute_offsets, BoneOffset, BoneOffsets};
pub use capture::{Background, CaptureSession, Renderer, SoftwareRenderer};
pub use config::CaptureConfig;
pub use dataset::{ArchiveWriter, LoraDataGenerator, LoraRequest, Manifest, MemoryArchive, ZipArchive};
pub use framing::{AnchorPoint, CameraTransform, FramingSpec, ShotPreset};
pub use model::CharacterModel;
pub use prefs::{MergeMode, MergeOptions, PreferenceStore};
pub use scene::{NodeId, NodeKind, NodeTransform, Scene};
pub use skeleton::{PoseGuard, PoseSnapshot, Skeleton};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("glTF error: {0}")]
    Gltf(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Animation error: {0}")]
    Animation(String),

    #[error("Invalid framing: {0}")]
    InvalidFraming(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
