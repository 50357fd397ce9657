//! 场景节点

use glam::Mat4;

use super::{Geometry, NodeId, NodeTransform};
use crate::skeleton::Skeleton;

/// 静态网格数据
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub geometry: Option<Geometry>,
}

/// 蒙皮网格数据
///
/// 骨骼以场景节点句柄引用，多个网格可以共享同一套骨骼。
#[derive(Clone, Debug)]
pub struct SkinnedMeshData {
    pub geometry: Option<Geometry>,
    pub skeleton: Skeleton,
    /// 绑定时网格的世界矩阵
    pub bind_matrix: Mat4,
}

/// 节点类型（封闭集合，遍历时按模式匹配分发）
#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    Bone,
    Mesh(MeshData),
    SkinnedMesh(SkinnedMeshData),
}

impl NodeKind {
    pub fn as_skinned_mesh(&self) -> Option<&SkinnedMeshData> {
        match self {
            NodeKind::SkinnedMesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// 场景节点
#[derive(Clone, Debug)]
pub struct Node {
    /// 名称（不保证唯一）
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: NodeTransform,
    /// 世界矩阵，由 `Scene::update_world_matrices` 计算
    pub world: Mat4,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, transform: NodeTransform) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform,
            world: transform.to_matrix(),
            kind,
        }
    }

    /// 世界空间位置（世界矩阵平移分量）
    pub fn world_position(&self) -> glam::Vec3 {
        self.world.w_axis.truncate()
    }
}
