//! 截图背景

use glam::Vec3;
use image::{imageops::FilterType, Rgba, RgbaImage};

use crate::fetch::fetch_bytes;
use crate::{CaptureError, Result};

/// 截图背景：纯色或图片（按输出尺寸拉伸）
#[derive(Clone, Debug)]
pub enum Background {
    Color(Vec3),
    Image(RgbaImage),
}

impl Background {
    /// 灰度背景，`value` 范围 0~1
    pub fn grayscale(value: f32) -> Self {
        Background::Color(Vec3::splat(value.clamp(0.0, 1.0)))
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Background::Color(Vec3::new(r, g, b).clamp(Vec3::ZERO, Vec3::ONE))
    }

    /// 生成指定尺寸的背景画布
    pub fn fill(&self, width: u32, height: u32) -> RgbaImage {
        match self {
            Background::Color(color) => RgbaImage::from_pixel(width, height, to_rgba(*color)),
            Background::Image(image) => {
                if image.dimensions() == (width, height) {
                    image.clone()
                } else {
                    image::imageops::resize(image, width, height, FilterType::Triangle)
                }
            }
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Vec3::splat(0.1))
    }
}

/// 线性颜色转 8 位像素
pub fn to_rgba(color: Vec3) -> Rgba<u8> {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
}

/// 从内存解码背景图片
pub fn decode_background(data: &[u8]) -> Result<Background> {
    let img = image::load_from_memory(data)
        .map_err(|e| CaptureError::Image(format!("Failed to decode background image: {}", e)))?;
    Ok(Background::Image(img.to_rgba8()))
}

/// 从文件路径或 URL 加载背景图片
pub fn load_background_image(location: &str) -> Result<Background> {
    let data = fetch_bytes(location)?;
    let background = decode_background(&data)?;
    log::info!("Loaded background image from {}", location);
    Ok(background)
}
