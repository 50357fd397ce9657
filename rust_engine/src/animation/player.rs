//! 动画加载与播放

use std::collections::HashMap;
use std::sync::Arc;

use super::AnimationClip;
use crate::fetch::fetch_bytes;
use crate::model::CharacterModel;
use crate::Result;

/// 动画加载原语：把指定位置的动画在 `time` 秒处的姿态应用到角色
pub trait AnimationPlayer {
    fn load_animation(&mut self, model: &mut CharacterModel, location: &str, time: f32) -> Result<()>;
}

/// glTF/GLB 动画播放器，按位置缓存已解析的片段
#[derive(Default)]
pub struct GltfAnimationPlayer {
    cache: HashMap<String, Arc<AnimationClip>>,
}

impl GltfAnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取（必要时加载）片段
    pub fn clip(&mut self, location: &str) -> Result<Arc<AnimationClip>> {
        if let Some(clip) = self.cache.get(location) {
            return Ok(Arc::clone(clip));
        }
        let bytes = fetch_bytes(location)?;
        let clip = Arc::new(AnimationClip::from_gltf_slice(&bytes)?);
        log::info!(
            "Loaded animation '{}' from {} ({:.2}s, {} channels)",
            clip.name,
            location,
            clip.duration,
            clip.channels.len()
        );
        self.cache.insert(location.to_string(), Arc::clone(&clip));
        Ok(clip)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl AnimationPlayer for GltfAnimationPlayer {
    fn load_animation(&mut self, model: &mut CharacterModel, location: &str, time: f32) -> Result<()> {
        let clip = self.clip(location)?;
        clip.apply(model.scene_mut(), time);
        Ok(())
    }
}
