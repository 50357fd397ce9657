//! 截图与数据集配置
//!
//! 所有参数扁平化；运行时通过 `set_config` 覆盖，命令行可从 JSON 文件加载
//! （缺省字段取默认值）。

use std::path::Path;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::animation::DEFAULT_FPS;
use crate::Result;

/// 截图配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    // ========== 相机 ==========
    /// 垂直视场角（度），默认 30.0
    pub fov: f32,
    /// 取景上边距（世界单位，加到最高锚点），默认 0.2
    pub frame_margin_top: f32,
    /// 取景下边距（世界单位，从最低锚点减去），默认 0.2
    pub frame_margin_bottom: f32,

    // ========== 骨骼偏移 ==========
    /// 参与偏移统计的最小主权重，默认 0.2
    pub min_weight: f32,
    /// 需要统计偏移的骨骼
    pub offset_bones: Vec<String>,

    // ========== 取景骨骼 ==========
    pub head_bone: String,
    pub chest_bone: String,
    pub hips_bone: String,
    /// 全身取景的最低骨骼，默认 leftFoot
    pub foot_bone: String,

    // ========== 数据集 ==========
    /// 标注文本的触发词，默认 "anata"
    pub trigger_word: String,
    /// 动画帧率（帧号换算为秒），默认 30.0
    pub animation_fps: f32,
    /// 压缩包内的目录名，默认 "lora_Data"
    pub dataset_folder: String,
    /// 压缩包文件名（不含扩展名），默认 "lora_zip"
    pub zip_name: String,

    // ========== 渲染 ==========
    /// 会话默认背景色（线性 RGB），默认深灰
    pub background_color: [f32; 3],
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fov: 30.0,
            frame_margin_top: 0.2,
            frame_margin_bottom: 0.2,

            min_weight: 0.2,
            offset_bones: [
                "head",
                "chest",
                "hips",
                "leftUpperLeg",
                "leftFoot",
                "rightUpperLeg",
                "rightFoot",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),

            head_bone: "head".to_string(),
            chest_bone: "chest".to_string(),
            hips_bone: "hips".to_string(),
            foot_bone: "leftFoot".to_string(),

            trigger_word: "anata".to_string(),
            animation_fps: DEFAULT_FPS,
            dataset_folder: "lora_Data".to_string(),
            zip_name: "lora_zip".to_string(),

            background_color: [0.1, 0.1, 0.1],
        }
    }
}

/// 全局配置实例
static CAPTURE_CONFIG: Lazy<RwLock<CaptureConfig>> = Lazy::new(|| {
    RwLock::new(CaptureConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> CaptureConfig {
    CAPTURE_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 手动设置配置
pub fn set_config(config: CaptureConfig) {
    *CAPTURE_CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(CaptureConfig::default());
}

/// 从 JSON 文件读取配置
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CaptureConfig> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let config = serde_json::from_str(&text)?;
    log::info!("Loaded capture config from {}", path.as_ref().display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fov": 45.0, "trigger_word": "ohwx"}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert!((config.fov - 45.0).abs() < 0.001);
        assert_eq!(config.trigger_word, "ohwx");
        assert_eq!(config.offset_bones.len(), 7);
        assert!((config.min_weight - 0.2).abs() < 0.001);
        assert_eq!(config.animation_fps, DEFAULT_FPS);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_config("/nonexistent/capture.json"),
            Err(crate::CaptureError::Io(_))
        ));
    }
}
