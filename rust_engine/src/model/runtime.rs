//! 运行时角色

use crate::scene::{NodeId, NodeKind, Scene};

/// 运行时角色：具名场景图
///
/// 骨骼姿态属于场景；姿态的独占修改通过 `&mut CharacterModel` 借用保证。
#[derive(Clone, Debug, Default)]
pub struct CharacterModel {
    pub name: String,
    scene: Scene,
}

impl CharacterModel {
    pub fn new(name: impl Into<String>, mut scene: Scene) -> Self {
        scene.update_world_matrices();
        Self { name: name.into(), scene }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// 蒙皮网格数量
    pub fn skinned_mesh_count(&self) -> usize {
        self.scene.skinned_meshes().len()
    }

    /// 所有网格顶点总数
    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.scene.traverse(|_, node| {
            let geometry = match &node.kind {
                NodeKind::Mesh(mesh) => mesh.geometry.as_ref(),
                NodeKind::SkinnedMesh(mesh) => mesh.geometry.as_ref(),
                _ => None,
            };
            count += geometry.map_or(0, |g| g.vertex_count());
        });
        count
    }

    /// 第一个同名骨骼
    pub fn find_bone(&self, name: &str) -> Option<NodeId> {
        self.scene.find_first_bone(name)
    }
}
