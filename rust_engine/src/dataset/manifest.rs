//! 数据集清单

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::framing::ShotPreset;
use crate::{CaptureError, Result};

/// 图片单边最大像素数
pub const MAX_IMAGE_SIZE: u32 = 8192;

/// 相机方向偏置：预设名称或 `[x, y, z]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraBias {
    Named(String),
    Vector([f32; 3]),
}

impl CameraBias {
    pub fn to_vec3(&self) -> Vec3 {
        match self {
            CameraBias::Vector(v) => Vec3::from(*v),
            CameraBias::Named(name) => match name.trim().to_ascii_lowercase().as_str() {
                "front" => Vec3::Z,
                "back" => Vec3::NEG_Z,
                "left" => Vec3::NEG_X,
                "right" => Vec3::X,
                other => {
                    log::warn!("Unknown camera position '{}', using front", other);
                    Vec3::Z
                }
            },
        }
    }
}

/// 数据集条目
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataItem {
    pub animation_path: String,
    #[serde(default)]
    pub animation_time: Option<f32>,
    /// 按 30fps 换算，存在时优先于 `animation_time`
    #[serde(default)]
    pub animation_frame: Option<f32>,
    #[serde(default)]
    pub look_at_camera: Option<bool>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub camera_position: Option<CameraBias>,
    #[serde(default)]
    pub camera_frame: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl DataItem {
    /// 动画采样时间（秒）；帧号或时间不是有限值时报错
    pub fn time(&self, fps: f32) -> Result<f32> {
        let time = match self.animation_frame {
            Some(frame) => frame / fps,
            None => self.animation_time.unwrap_or(0.0),
        };
        if !time.is_finite() {
            return Err(CaptureError::Manifest(format!(
                "animation time for '{}' is not finite (frame {:?}, time {:?}, fps {})",
                self.animation_path, self.animation_frame, self.animation_time, fps
            )));
        }
        Ok(time)
    }

    /// 相机偏置，缺省为正面
    pub fn camera_bias(&self) -> Vec3 {
        self.camera_position.as_ref().map_or(Vec3::Z, CameraBias::to_vec3)
    }

    /// 预设镜头，缺失或无法识别时使用全身
    pub fn shot_preset(&self) -> ShotPreset {
        match self.camera_frame.as_deref() {
            None => {
                log::warn!("No camera frame for '{}', using full shot", self.animation_path);
                ShotPreset::Full
            }
            Some(name) => name.parse().unwrap_or_else(|_| {
                log::warn!("Unknown camera frame '{}', using full shot", name);
                ShotPreset::Full
            }),
        }
    }
}

/// 数据集清单
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manifest {
    pub assets_location: String,
    pub animations_directory: String,
    pub background_grayscale: f32,
    pub top_frame_offset_pixels: f32,
    pub bottom_frame_offset_pixels: f32,
    pub background_description: String,
    pub width: u32,
    pub height: u32,
    pub data_collection: Option<Vec<DataItem>>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            assets_location: String::new(),
            animations_directory: String::new(),
            background_grayscale: 1.0,
            top_frame_offset_pixels: 64.0,
            bottom_frame_offset_pixels: 64.0,
            background_description: String::new(),
            width: 512,
            height: 512,
            data_collection: None,
        }
    }
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(text).map_err(|e| CaptureError::Manifest(e.to_string()))?;
        let valid_size = 1..=MAX_IMAGE_SIZE;
        if !valid_size.contains(&manifest.width) || !valid_size.contains(&manifest.height) {
            return Err(CaptureError::Manifest(format!(
                "image size must be within 1..={}, got {}x{}",
                MAX_IMAGE_SIZE, manifest.width, manifest.height
            )));
        }

        for item in manifest.items() {
            let times = item.animation_frame.iter().chain(&item.animation_time);
            if let Some(bad) = times.copied().find(|t| !t.is_finite()) {
                return Err(CaptureError::Manifest(format!(
                    "animation time {} for '{}' is not finite",
                    bad, item.animation_path
                )));
            }
        }
        Ok(manifest)
    }

    pub fn items(&self) -> &[DataItem] {
        self.data_collection.as_deref().unwrap_or(&[])
    }

    /// 动画完整位置：资源根 + 动画目录 + "/" + 条目路径
    pub fn animation_location(&self, item: &DataItem) -> String {
        format!(
            "{}{}/{}",
            self.assets_location, self.animations_directory, item.animation_path
        )
    }

    pub fn caption(&self, trigger_word: &str, item: &DataItem) -> String {
        format!(
            "{} {} {}",
            trigger_word, item.description, self.background_description
        )
    }
}
