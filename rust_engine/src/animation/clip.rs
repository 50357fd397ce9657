//! glTF 动画片段

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use super::keyframe::{Interpolation, Track};
use crate::scene::Scene;
use crate::{CaptureError, Result};

/// 单个节点的变换轨道
#[derive(Clone, Debug, Default)]
pub struct NodeChannels {
    pub node_name: String,
    pub translation: Option<Track<Vec3>>,
    pub rotation: Option<Track<Quat>>,
    pub scale: Option<Track<Vec3>>,
}

/// 动画片段：按节点名绑定的平移/旋转/缩放轨道
#[derive(Clone, Debug, Default)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<NodeChannels>,
}

impl AnimationClip {
    /// 解析 glTF/GLB 数据中的第一个动画
    pub fn from_gltf_slice(bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).map_err(|e| CaptureError::Animation(e.to_string()))?;
        let animation = document
            .animations()
            .next()
            .ok_or_else(|| CaptureError::Animation("document contains no animation".to_string()))?;
        Ok(Self::from_gltf(&animation, &buffers))
    }

    pub fn from_gltf(animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> Self {
        let mut clip = AnimationClip {
            name: animation.name().unwrap_or("").to_string(),
            ..Default::default()
        };

        for channel in animation.channels() {
            let node = channel.target().node();
            let node_name = node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node_{}", node.index()));
            let interpolation = Interpolation::from(channel.sampler().interpolation());

            let reader = channel.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
            let Some(inputs) = reader.read_inputs() else { continue };
            let times: Vec<f32> = inputs.collect();
            let Some(outputs) = reader.read_outputs() else { continue };

            let entry = clip.channels_for(&node_name);
            match outputs {
                ReadOutputs::Translations(it) => {
                    entry.translation = Some(Track::new(times, it.map(Vec3::from).collect(), interpolation));
                }
                ReadOutputs::Rotations(it) => {
                    let values = it.into_f32().map(|q| Quat::from_array(q).normalize()).collect();
                    entry.rotation = Some(Track::new(times, values, interpolation));
                }
                ReadOutputs::Scales(it) => {
                    entry.scale = Some(Track::new(times, it.map(Vec3::from).collect(), interpolation));
                }
                ReadOutputs::MorphTargetWeights(_) => {
                    log::debug!("Skipping morph target weights channel on '{}'", node_name);
                }
            }
        }

        clip.duration = clip
            .channels
            .iter()
            .flat_map(|c| {
                [
                    c.translation.as_ref().map(Track::duration),
                    c.rotation.as_ref().map(Track::duration),
                    c.scale.as_ref().map(Track::duration),
                ]
            })
            .flatten()
            .fold(0.0, f32::max);
        clip
    }

    fn channels_for(&mut self, node_name: &str) -> &mut NodeChannels {
        let index = match self.channels.iter().position(|c| c.node_name == node_name) {
            Some(index) => index,
            None => {
                self.channels.push(NodeChannels {
                    node_name: node_name.to_string(),
                    ..Default::default()
                });
                self.channels.len() - 1
            }
        };
        &mut self.channels[index]
    }

    /// 把片段在 `time` 秒处的姿态写入场景并同步世界矩阵
    ///
    /// 超过片段长度时循环；每条轨道作用于第一个同名节点。
    pub fn apply(&self, scene: &mut Scene, time: f32) {
        if !time.is_finite() {
            log::warn!("Ignoring non-finite animation time {} for clip '{}'", time, self.name);
            return;
        }
        let time = if self.duration > 0.0 && time > self.duration {
            time % self.duration
        } else {
            time.max(0.0)
        };

        for channels in &self.channels {
            let Some(id) = scene.find_node_by_name(&channels.node_name) else {
                log::debug!("Animation target '{}' not found in scene", channels.node_name);
                continue;
            };
            let Some(node) = scene.node_mut(id) else { continue };

            if let Some(value) = channels.translation.as_ref().and_then(|t| t.sample(time)) {
                node.transform.translation = value;
            }
            if let Some(value) = channels.rotation.as_ref().and_then(|t| t.sample(time)) {
                node.transform.rotation = value;
            }
            if let Some(value) = channels.scale.as_ref().and_then(|t| t.sample(time)) {
                node.transform.scale = value;
            }
        }
        scene.update_world_matrices();
    }
}
