//! 截图会话
//!
//! 会话开始时计算一次骨骼偏移，之后在角色的当前姿态下取景与截图。
//! 会话独占借用角色，同一角色同一时刻只能有一个会话。

use glam::Vec3;
use image::RgbaImage;

use super::{encode_png, load_background_image, Background, Renderer};
use crate::bounds::{compute_offsets, BoneOffsets};
use crate::config::CaptureConfig;
use crate::framing::{frame_shot, AnchorPoint, CameraTransform, FrameMargins, FramingSpec, ShotPreset};
use crate::model::CharacterModel;
use crate::Result;

pub struct CaptureSession<'a> {
    character: &'a mut CharacterModel,
    offsets: BoneOffsets,
    config: CaptureConfig,
    background: Background,
}

impl<'a> CaptureSession<'a> {
    /// 开始会话：使用配置中的背景色，按配置的骨骼列表与最小权重计算偏移
    pub fn begin(character: &'a mut CharacterModel, config: &CaptureConfig) -> Result<Self> {
        let background = Background::Color(Vec3::from(config.background_color));
        Self::begin_with_background(character, config, background)
    }

    /// 先设置背景，再计算骨骼偏移
    pub fn begin_with_background(
        character: &'a mut CharacterModel,
        config: &CaptureConfig,
        background: Background,
    ) -> Result<Self> {
        let offsets = compute_offsets(character, &config.offset_bones, config.min_weight)?;
        log::info!(
            "Capture session started for '{}' ({} bone offsets)",
            character.name,
            offsets.len()
        );
        Ok(Self {
            character,
            offsets,
            config: config.clone(),
            background,
        })
    }

    pub fn offsets(&self) -> &BoneOffsets {
        &self.offsets
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn character(&self) -> &CharacterModel {
        &*self.character
    }

    /// 可变访问角色（用于加载动画姿态）；偏移不会重新计算
    pub fn character_mut(&mut self) -> &mut CharacterModel {
        &mut *self.character
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// 从文件或 URL 加载背景图片；失败时保留原背景
    pub fn set_background_image(&mut self, location: &str) -> Result<()> {
        self.background = load_background_image(location)?;
        Ok(())
    }

    /// 当前姿态下的骨骼锚点
    pub fn anchor(&self, bone_name: &str, use_max: bool) -> AnchorPoint {
        crate::framing::resolve_anchor(&*self.character, &self.offsets, bone_name, use_max)
    }

    pub fn frame_shot(&self, spec: &FramingSpec, bias: Vec3) -> Result<CameraTransform> {
        frame_shot(
            &*self.character,
            &self.offsets,
            spec,
            bias,
            FrameMargins::from(&self.config),
            self.config.fov,
        )
    }

    pub fn frame_preset(&self, preset: ShotPreset, bias: Vec3) -> Result<CameraTransform> {
        self.frame_shot(&preset.spec(&self.config), bias)
    }

    pub fn capture<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        camera: &CameraTransform,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage> {
        renderer.render(&*self.character, camera, &self.background, width, height)
    }

    /// 截图并编码为 PNG
    pub fn capture_png<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        camera: &CameraTransform,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let image = self.capture(renderer, camera, width, height)?;
        encode_png(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SoftwareRenderer;
    use crate::model::mannequin;
    use glam::Quat;

    #[test]
    fn test_session_offsets_cover_configured_bones() {
        let mut model = mannequin();
        let config = CaptureConfig::default();
        let session = CaptureSession::begin(&mut model, &config).unwrap();

        assert_eq!(session.offsets().len(), config.offset_bones.len());
        for name in &config.offset_bones {
            assert!(!session.offsets().get(name).unwrap().is_empty(), "{}", name);
        }
    }

    #[test]
    fn test_framing_follows_current_pose() {
        let mut model = mannequin();
        let config = CaptureConfig::default();
        let mut session = CaptureSession::begin(&mut model, &config).unwrap();
        let before = session.frame_preset(ShotPreset::Closeup, Vec3::Z).unwrap();

        let hips = session.character().find_bone("hips").unwrap();
        let scene = session.character_mut().scene_mut();
        scene.node_mut(hips).unwrap().transform.translation.y -= 0.5;
        scene.update_world_matrices();

        let after = session.frame_preset(ShotPreset::Closeup, Vec3::Z).unwrap();
        assert!((before.target.y - after.target.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_capture_png() {
        let mut model = mannequin();
        let head = model.find_bone("head").unwrap();
        model.scene_mut().node_mut(head).unwrap().transform.rotation = Quat::from_rotation_y(0.5);
        model.scene_mut().update_world_matrices();

        let config = CaptureConfig::default();
        let mut session = CaptureSession::begin(&mut model, &config).unwrap();
        session.set_background(Background::grayscale(0.5));
        let camera = session.frame_preset(ShotPreset::Medium, Vec3::Z).unwrap();
        let png = session.capture_png(&mut SoftwareRenderer::new(), &camera, 32, 48).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 48));
    }

    #[test]
    fn test_missing_background_image_keeps_previous() {
        let mut model = mannequin();
        let mut session = CaptureSession::begin(&mut model, &CaptureConfig::default()).unwrap();
        session.set_background(Background::grayscale(1.0));
        assert!(session.set_background_image("/nonexistent/bg.png").is_err());
        assert!(matches!(session.background(), Background::Color(c) if c.x == 1.0));
    }

    #[test]
    fn test_begin_with_background() {
        let mut model = mannequin();
        let session =
            CaptureSession::begin_with_background(&mut model, &CaptureConfig::default(), Background::grayscale(0.8))
                .unwrap();
        assert!(matches!(session.background(), Background::Color(c) if (c.y - 0.8).abs() < 1e-6));
        assert!(!session.offsets().is_empty());
    }
}
