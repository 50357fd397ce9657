//! 顶点蒙皮计算

mod skinning;

pub use skinning::{compute_skinning, skin_mesh};

use glam::Mat4;

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 绑定空间顶点位置
    pub positions: &'a [glam::Vec3],
    /// 每顶点四个骨骼序号
    pub skin_indices: &'a [[u16; 4]],
    /// 每顶点四个权重
    pub skin_weights: &'a [[f32; 4]],
    /// 骨骼变换矩阵（已乘以逆绑定矩阵）
    pub bone_matrices: &'a [Mat4],
    /// 网格绑定矩阵
    pub bind_matrix: Mat4,
    /// 权重全为零的顶点使用的矩阵（网格世界矩阵）
    pub fallback: Mat4,
}
