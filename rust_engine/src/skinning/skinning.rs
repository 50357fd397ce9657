//! 线性混合蒙皮

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use super::SkinningInput;
use crate::scene::{Scene, SkinnedMeshData};

/// 计算蒙皮后的世界空间顶点位置（rayon 并行）
pub fn compute_skinning(input: &SkinningInput) -> Vec<Vec3> {
    input
        .positions
        .par_iter()
        .zip(input.skin_indices.par_iter())
        .zip(input.skin_weights.par_iter())
        .map(|((&position, indices), weights)| {
            compute_vertex_skinning(
                position,
                indices,
                weights,
                input.bone_matrices,
                input.bind_matrix,
                input.fallback,
            )
        })
        .collect()
}

/// 按场景当前姿态蒙皮网格；没有蒙皮属性时只做网格世界变换
pub fn skin_mesh(scene: &Scene, mesh_world: Mat4, mesh: &SkinnedMeshData) -> Vec<Vec3> {
    let Some(geometry) = mesh.geometry.as_ref() else {
        return Vec::new();
    };

    match (&geometry.skin_indices, &geometry.skin_weights) {
        (Some(skin_indices), Some(skin_weights)) if geometry.has_skin_attributes() => {
            let bone_matrices = mesh.skeleton.bone_matrices(scene);
            compute_skinning(&SkinningInput {
                positions: &geometry.positions,
                skin_indices,
                skin_weights,
                bone_matrices: &bone_matrices,
                bind_matrix: mesh.bind_matrix,
                fallback: mesh_world,
            })
        }
        _ => geometry
            .positions
            .par_iter()
            .map(|&p| mesh_world.transform_point3(p))
            .collect(),
    }
}

/// 计算单个顶点的蒙皮
fn compute_vertex_skinning(
    position: Vec3,
    indices: &[u16; 4],
    weights: &[f32; 4],
    matrices: &[Mat4],
    bind_matrix: Mat4,
    fallback: Mat4,
) -> Vec3 {
    let total: f32 = weights.iter().sum();
    if total <= f32::EPSILON {
        return fallback.transform_point3(position);
    }

    let bind_position = bind_matrix.transform_point3(position);
    let mut skinned = Vec3::ZERO;
    for i in 0..4 {
        let w = weights[i];
        if w == 0.0 {
            continue;
        }
        let m = get_matrix(matrices, indices[i]);
        skinned += m.transform_point3(bind_position) * w;
    }
    skinned / total
}

fn get_matrix(matrices: &[Mat4], index: u16) -> Mat4 {
    matrices.get(index as usize).copied().unwrap_or(Mat4::IDENTITY)
}
