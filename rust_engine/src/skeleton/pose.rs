//! 姿态快照

use crate::scene::{NodeId, NodeTransform, Scene};

/// 骨骼本地变换快照（位置/旋转/缩放逐骨骼保存）
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseSnapshot {
    entries: Vec<(NodeId, NodeTransform)>,
}

impl PoseSnapshot {
    pub fn capture(scene: &Scene, bones: &[NodeId]) -> Self {
        let entries = bones
            .iter()
            .filter_map(|&bone| scene.node(bone).map(|node| (bone, node.transform)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 原样写回本地变换（不重新计算世界矩阵）
    pub fn restore(&self, scene: &mut Scene) {
        for (bone, transform) in &self.entries {
            if let Some(node) = scene.node_mut(*bone) {
                node.transform = *transform;
            }
        }
    }
}
