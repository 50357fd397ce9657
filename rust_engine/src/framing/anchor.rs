//! 骨骼锚点解析

use glam::Vec3;

use crate::bounds::BoneOffsets;
use crate::model::CharacterModel;

/// 锚点解析结果
///
/// 缺失数据时按程度降级，调用方可以区分三种情况。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnchorPoint {
    /// 骨骼世界位置加上偏移的 Y 分量
    Offset(Vec3),
    /// 找到骨骼，但偏移为哨兵值（没有顶点符合权重条件）
    BoneOnly(Vec3),
    /// 没有同名骨骼或没有缓存偏移，取原点
    Origin,
}

impl AnchorPoint {
    pub fn position(&self) -> Vec3 {
        match *self {
            AnchorPoint::Offset(p) | AnchorPoint::BoneOnly(p) => p,
            AnchorPoint::Origin => Vec3::ZERO,
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, AnchorPoint::Offset(_))
    }
}

/// 解析骨骼锚点（当前姿态）
///
/// `use_max` 选择偏移的 max 或 min 端；只使用偏移的 Y 分量。
pub fn resolve_anchor(
    model: &CharacterModel,
    offsets: &BoneOffsets,
    bone_name: &str,
    use_max: bool,
) -> AnchorPoint {
    let Some(bone) = model.find_bone(bone_name) else {
        log::warn!("Bone with name '{}' not found in any skinned mesh", bone_name);
        return AnchorPoint::Origin;
    };
    let Some(offset) = offsets.get(bone_name) else {
        log::warn!("No offset cached for bone '{}', using origin", bone_name);
        return AnchorPoint::Origin;
    };

    let bone_position = model.scene().world_position(bone);
    if offset.is_empty() {
        log::debug!("No vertices weighted to bone '{}', using bone position", bone_name);
        return AnchorPoint::BoneOnly(bone_position);
    }
    let y = if use_max { offset.max.y } else { offset.min.y };
    AnchorPoint::Offset(bone_position + Vec3::new(0.0, y, 0.0))
}
