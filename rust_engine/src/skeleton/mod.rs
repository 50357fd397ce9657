//! 骨架与姿态保存/恢复

mod guard;
mod pose;

pub use guard::PoseGuard;
pub use pose::PoseSnapshot;

use std::collections::HashMap;

use glam::Mat4;

use crate::scene::{NodeId, NodeTransform, Scene};

/// 骨架：按序号排列的骨骼节点及其逆绑定矩阵
///
/// 骨骼本身是场景节点，骨架只持有句柄，因此可被多个蒙皮网格共享。
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    pub bones: Vec<NodeId>,
    pub bone_inverses: Vec<Mat4>,
}

impl Skeleton {
    pub fn new(bones: Vec<NodeId>, bone_inverses: Vec<Mat4>) -> Self {
        Self { bones, bone_inverses }
    }

    /// 以骨骼当前世界矩阵作为绑定姿态创建骨架
    pub fn from_current_pose(scene: &Scene, bones: Vec<NodeId>) -> Self {
        let bone_inverses = bones
            .iter()
            .map(|&bone| scene.world_matrix(bone).inverse())
            .collect();
        Self { bones, bone_inverses }
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// 同名骨骼在骨架中的序号（第一个匹配）
    pub fn find_bone_index(&self, scene: &Scene, name: &str) -> Option<usize> {
        self.bones
            .iter()
            .position(|&bone| scene.node(bone).is_some_and(|n| n.name == name))
    }

    pub fn find_bone(&self, scene: &Scene, name: &str) -> Option<NodeId> {
        self.find_bone_index(scene, name).map(|i| self.bones[i])
    }

    fn bone_inverse(&self, index: usize) -> Mat4 {
        self.bone_inverses.get(index).copied().unwrap_or(Mat4::IDENTITY)
    }

    /// 蒙皮矩阵 = 骨骼当前世界矩阵 * 逆绑定矩阵
    pub fn bone_matrices(&self, scene: &Scene) -> Vec<Mat4> {
        self.bones
            .iter()
            .enumerate()
            .map(|(i, &bone)| scene.world_matrix(bone) * self.bone_inverse(i))
            .collect()
    }

    /// 保存骨骼本地姿态
    pub fn snapshot(&self, scene: &Scene) -> PoseSnapshot {
        PoseSnapshot::capture(scene, &self.bones)
    }

    /// 将骨架置为绑定（静止）姿态
    ///
    /// 骨骼世界矩阵取逆绑定矩阵的逆，本地变换按父节点世界矩阵反推。
    /// 按遍历顺序处理整个场景：非骨架节点（例如骨骼之间的辅助节点）
    /// 沿用本地变换，世界矩阵由已处于静止姿态的父节点重新计算。
    pub fn apply_rest_pose(&self, scene: &mut Scene) {
        let mut rest_worlds: HashMap<NodeId, Mat4> = HashMap::with_capacity(self.bones.len());
        for (i, &bone) in self.bones.iter().enumerate() {
            rest_worlds.entry(bone).or_insert_with(|| self.bone_inverse(i).inverse());
        }

        for id in scene.traversal_order() {
            let parent_world = scene
                .node(id)
                .and_then(|n| n.parent)
                .map_or(Mat4::IDENTITY, |parent| scene.world_matrix(parent));
            let Some(node) = scene.node_mut(id) else { continue };

            match rest_worlds.get(&id) {
                Some(&rest) => {
                    node.transform = NodeTransform::from_matrix(&(parent_world.inverse() * rest));
                    node.world = rest;
                }
                None => node.world = parent_world * node.transform.to_matrix(),
            }
        }
    }
}
