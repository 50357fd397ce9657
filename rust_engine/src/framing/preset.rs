//! 预设镜头

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use super::{frame, resolve_anchor, CameraTransform};
use crate::bounds::BoneOffsets;
use crate::config::CaptureConfig;
use crate::model::CharacterModel;
use crate::{CaptureError, Result};

/// 预设镜头
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShotPreset {
    /// 特写：头到头
    Closeup,
    /// 中景：胸到头
    Medium,
    /// 牛仔镜头：髋到头
    Cowboy,
    /// 全身：脚到头
    Full,
}

impl ShotPreset {
    pub const ALL: [ShotPreset; 4] = [
        ShotPreset::Closeup,
        ShotPreset::Medium,
        ShotPreset::Cowboy,
        ShotPreset::Full,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShotPreset::Closeup => "closeup",
            ShotPreset::Medium => "medium",
            ShotPreset::Cowboy => "cowboy",
            ShotPreset::Full => "full",
        }
    }

    /// 按配置中的骨骼名展开为取景参数
    pub fn spec(&self, config: &CaptureConfig) -> FramingSpec {
        let min_bone = match self {
            ShotPreset::Closeup => &config.head_bone,
            ShotPreset::Medium => &config.chest_bone,
            ShotPreset::Cowboy => &config.hips_bone,
            ShotPreset::Full => &config.foot_bone,
        };
        FramingSpec::new(min_bone.clone(), config.head_bone.clone())
    }
}

impl fmt::Display for ShotPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShotPreset {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closeup" => Ok(ShotPreset::Closeup),
            "medium" => Ok(ShotPreset::Medium),
            "cowboy" => Ok(ShotPreset::Cowboy),
            "full" | "fullshot" => Ok(ShotPreset::Full),
            other => Err(CaptureError::InvalidArgument(format!("unknown camera frame '{}'", other))),
        }
    }
}

/// 取景参数：两端骨骼及各自使用 min 还是 max 偏移
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramingSpec {
    pub min_bone: String,
    pub max_bone: String,
    pub min_uses_max: bool,
    pub max_uses_max: bool,
}

impl FramingSpec {
    /// 下端取 min 偏移，上端取 max 偏移
    pub fn new(min_bone: impl Into<String>, max_bone: impl Into<String>) -> Self {
        Self {
            min_bone: min_bone.into(),
            max_bone: max_bone.into(),
            min_uses_max: false,
            max_uses_max: true,
        }
    }
}

/// 取景上下边距（世界单位）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMargins {
    pub top: f32,
    pub bottom: f32,
}

impl Default for FrameMargins {
    fn default() -> Self {
        Self { top: 0.2, bottom: 0.2 }
    }
}

impl From<&CaptureConfig> for FrameMargins {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            top: config.frame_margin_top,
            bottom: config.frame_margin_bottom,
        }
    }
}

/// 按取景参数在当前姿态下计算相机
pub fn frame_shot(
    model: &CharacterModel,
    offsets: &BoneOffsets,
    spec: &FramingSpec,
    bias: Vec3,
    margins: FrameMargins,
    fov: f32,
) -> Result<CameraTransform> {
    let mut min = resolve_anchor(model, offsets, &spec.min_bone, spec.min_uses_max).position();
    let mut max = resolve_anchor(model, offsets, &spec.max_bone, spec.max_uses_max).position();

    min.y -= margins.bottom;
    max.y += margins.top;

    frame(min, max, bias, fov)
}
