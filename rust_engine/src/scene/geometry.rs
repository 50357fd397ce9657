//! 网格几何数据

use glam::{Vec3, Vec4};

/// 顶点缓冲区
///
/// 蒙皮属性每顶点四个影响，`skin_indices` 为骨架内的骨骼序号。
#[derive(Clone, Debug)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
    pub skin_indices: Option<Vec<[u16; 4]>>,
    pub skin_weights: Option<Vec<[f32; 4]>>,
    pub base_color: Vec4,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            indices: None,
            skin_indices: None,
            skin_weights: None,
            base_color: Vec4::new(0.8, 0.8, 0.8, 1.0),
        }
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_skin(mut self, skin_indices: Vec<[u16; 4]>, skin_weights: Vec<[f32; 4]>) -> Self {
        self.skin_indices = Some(skin_indices);
        self.skin_weights = Some(skin_weights);
        self
    }

    pub fn with_base_color(mut self, color: Vec4) -> Self {
        self.base_color = color;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// 蒙皮属性齐全且长度与顶点数一致
    pub fn has_skin_attributes(&self) -> bool {
        match (&self.skin_indices, &self.skin_weights) {
            (Some(indices), Some(weights)) => {
                indices.len() == self.positions.len() && weights.len() == self.positions.len()
            }
            _ => false,
        }
    }

    /// 第一个蒙皮通道的 (骨骼序号, 权重)
    pub fn primary_influence(&self, vertex: usize) -> Option<(u16, f32)> {
        let index = self.skin_indices.as_ref()?.get(vertex)?[0];
        let weight = self.skin_weights.as_ref()?.get(vertex)?[0];
        Some((index, weight))
    }

    /// 三角形顶点序号；无索引时按顶点顺序每三个一组
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            None => (0..self.positions.len() as u32 / 3)
                .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_attributes_require_matching_lengths() {
        let geometry = Geometry::new(vec![Vec3::ZERO, Vec3::X]);
        assert!(!geometry.has_skin_attributes());

        let partial = geometry.clone().with_skin(vec![[0; 4]], vec![[1.0, 0.0, 0.0, 0.0]]);
        assert!(!partial.has_skin_attributes());

        let full = geometry.with_skin(vec![[0; 4], [1, 0, 0, 0]], vec![[1.0, 0.0, 0.0, 0.0]; 2]);
        assert!(full.has_skin_attributes());
        assert_eq!(full.primary_influence(1), Some((1, 1.0)));
        assert_eq!(full.primary_influence(2), None);
    }

    #[test]
    fn test_triangles_without_indices() {
        let geometry = Geometry::new(vec![Vec3::ZERO; 7]);
        assert_eq!(geometry.triangles(), vec![[0, 1, 2], [3, 4, 5]]);

        let indexed = Geometry::new(vec![Vec3::ZERO; 3]).with_indices(vec![2, 1, 0, 0]);
        assert_eq!(indexed.triangles(), vec![[2, 1, 0]]);
    }
}
