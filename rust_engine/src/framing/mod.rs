//! 相机取景
//!
//! 锚点解析、按两点包围盒计算相机变换、预设镜头（特写/中景/牛仔/全身）。

mod anchor;
mod camera;
mod preset;

pub use anchor::{resolve_anchor, AnchorPoint};
pub use camera::{frame, CameraTransform};
pub use preset::{frame_shot, FrameMargins, FramingSpec, ShotPreset};
