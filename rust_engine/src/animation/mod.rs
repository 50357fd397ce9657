//! 动画系统
//!
//! glTF 动画片段解析、关键帧采样，以及数据集生成使用的动画加载原语。

mod clip;
mod keyframe;
mod player;

pub use clip::{AnimationClip, NodeChannels};
pub use keyframe::{Interpolation, Keyable, Track};
pub use player::{AnimationPlayer, GltfAnimationPlayer};

/// 帧号换算秒数时使用的帧率
pub const DEFAULT_FPS: f32 = 30.0;
