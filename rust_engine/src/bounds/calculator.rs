//! 偏移包围盒计算

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use super::{BoneOffset, BoneOffsets};
use crate::model::CharacterModel;
use crate::scene::Geometry;
use crate::skeleton::PoseGuard;
use crate::{CaptureError, Result};

/// 计算骨骼顶点偏移
///
/// 对每个蒙皮网格：保存骨架姿态、切换到静止姿态、统计主影响骨骼为目标
/// 且主权重不小于 `min_weight` 的顶点偏移（网格世界变换后的原始顶点位置
/// 减去骨骼世界位置），最后恢复姿态。多个网格的结果取并集；
/// 没有顶点符合条件的骨骼保留哨兵值。
pub fn compute_offsets<S: AsRef<str>>(
    model: &mut CharacterModel,
    bone_names: &[S],
    min_weight: f32,
) -> Result<BoneOffsets> {
    if !(0.0..=1.0).contains(&min_weight) {
        return Err(CaptureError::InvalidArgument(format!(
            "min_weight must be within [0, 1], got {}",
            min_weight
        )));
    }

    let mut offsets = BoneOffsets::new();
    for name in bone_names {
        offsets.insert(name.as_ref(), BoneOffset::EMPTY);
    }

    let mesh_ids = model.scene().skinned_meshes();
    for mesh_id in mesh_ids {
        let Some(node) = model.scene().node(mesh_id) else { continue };
        let Some(mesh) = node.kind.as_skinned_mesh() else { continue };
        let mesh_name = node.name.clone();

        let Some(geometry) = mesh.geometry.clone() else {
            log::warn!("Skinned mesh '{}' has no geometry, skipping", mesh_name);
            continue;
        };
        if !geometry.has_skin_attributes() {
            log::warn!("Skinned mesh '{}' has no skin attributes, skipping", mesh_name);
            continue;
        }
        let skeleton = mesh.skeleton.clone();

        let guard = PoseGuard::rest_pose(model.scene_mut(), &skeleton);
        let mesh_world = guard.world_matrix(mesh_id);

        for name in bone_names {
            let name = name.as_ref();
            let Some(bone_index) = skeleton.find_bone_index(&guard, name) else {
                continue;
            };
            let bone_position = guard.world_position(skeleton.bones[bone_index]);
            let offset = fold_bone_offsets(&geometry, mesh_world, bone_index, bone_position, min_weight);
            offsets.merge(name, offset);
        }
        drop(guard);

        log::debug!("Computed bone offsets for mesh '{}'", mesh_name);
    }

    for (name, offset) in offsets.iter() {
        if offset.is_empty() {
            log::warn!("No vertices weighted to bone '{}'", name);
        }
    }
    Ok(offsets)
}

/// 并行统计单根骨骼的偏移范围
fn fold_bone_offsets(
    geometry: &Geometry,
    mesh_world: Mat4,
    bone_index: usize,
    bone_position: Vec3,
    min_weight: f32,
) -> BoneOffset {
    (0..geometry.vertex_count())
        .into_par_iter()
        .filter_map(|i| {
            let (index, weight) = geometry.primary_influence(i)?;
            if index as usize != bone_index || weight < min_weight {
                return None;
            }
            Some(mesh_world.transform_point3(geometry.positions[i]) - bone_position)
        })
        .fold(BoneOffset::default, |mut acc, offset| {
            acc.include(offset);
            acc
        })
        .reduce(BoneOffset::default, BoneOffset::union)
}
