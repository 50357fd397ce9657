//! 骨骼顶点偏移包围盒
//!
//! 在静止姿态下统计受骨骼主影响的顶点相对骨骼世界位置的偏移范围，
//! 取景时据此把骨骼锚点延伸到网格表面（如头顶、脚底）。

mod calculator;

pub use calculator::compute_offsets;

use std::collections::HashMap;

use glam::Vec3;

/// 单根骨骼的偏移范围
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneOffset {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoneOffset {
    /// 没有任何顶点时的哨兵值（min=+inf, max=-inf）
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// 纳入一个偏移
    pub fn include(&mut self, offset: Vec3) {
        self.min = self.min.min(offset);
        self.max = self.max.max(offset);
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// 是否仍为哨兵值
    pub fn is_empty(&self) -> bool {
        !self.min.is_finite() || !self.max.is_finite()
    }
}

impl Default for BoneOffset {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// 按骨骼名存储的偏移表，计算完成后只读
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneOffsets {
    offsets: HashMap<String, BoneOffset>,
}

impl BoneOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bone_name: &str) -> Option<&BoneOffset> {
        self.offsets.get(bone_name)
    }

    pub fn insert(&mut self, bone_name: impl Into<String>, offset: BoneOffset) {
        self.offsets.insert(bone_name.into(), offset);
    }

    /// 与已有值合并
    pub fn merge(&mut self, bone_name: &str, offset: BoneOffset) {
        let entry = self.offsets.entry(bone_name.to_string()).or_default();
        *entry = entry.union(offset);
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// 按骨骼名排序的遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneOffset)> {
        let mut entries: Vec<_> = self.offsets.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinel() {
        let mut offset = BoneOffset::EMPTY;
        assert!(offset.is_empty());
        assert_eq!(offset.min.x, f32::INFINITY);
        assert_eq!(offset.max.y, f32::NEG_INFINITY);

        offset.include(Vec3::new(1.0, -2.0, 0.5));
        assert!(!offset.is_empty());
        assert_eq!(offset.min, offset.max);
    }

    #[test]
    fn test_merge_unions_ranges() {
        let mut offsets = BoneOffsets::new();
        offsets.merge("head", BoneOffset { min: Vec3::ZERO, max: Vec3::ONE });
        offsets.merge("head", BoneOffset { min: Vec3::splat(-1.0), max: Vec3::splat(0.5) });
        offsets.merge("head", BoneOffset::EMPTY);

        let head = offsets.get("head").unwrap();
        assert_eq!(head.min, Vec3::splat(-1.0));
        assert_eq!(head.max, Vec3::ONE);
    }
}
