//! 场景图
//!
//! 角色由一组节点组成：分组、骨骼、静态网格、蒙皮网格。
//! 节点以 arena 方式存储，`NodeId` 为稳定句柄；遍历顺序为
//! 从根节点按插入顺序的深度优先先序遍历。

mod geometry;
mod graph;
mod node;

pub use geometry::Geometry;
pub use graph::{Scene, SceneVisitor};
pub use node::{MeshData, Node, NodeKind, SkinnedMeshData};

use glam::{Mat4, Quat, Vec3};

/// 场景节点句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// 节点本地变换
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl NodeTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    /// 从矩阵分解（平移/旋转/缩放）
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self { translation, rotation, scale }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
