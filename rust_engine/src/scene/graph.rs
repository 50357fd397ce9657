//! 场景图存储与遍历

use glam::{Mat4, Vec3};

use super::{MeshData, Node, NodeId, NodeKind, NodeTransform, SkinnedMeshData};

/// 场景访问者，按节点类型分发
pub trait SceneVisitor {
    fn visit_group(&mut self, _id: NodeId, _node: &Node) {}
    fn visit_bone(&mut self, _id: NodeId, _node: &Node) {}
    fn visit_mesh(&mut self, _id: NodeId, _node: &Node, _mesh: &MeshData) {}
    fn visit_skinned_mesh(&mut self, _id: NodeId, _node: &Node, _mesh: &SkinnedMeshData) {}
}

/// 场景图
#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点，`parent` 为 `None` 时作为根节点
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        transform: NodeTransform,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(name, kind, transform);

        match parent.filter(|p| p.0 < self.nodes.len()) {
            Some(p) => {
                node.parent = Some(p);
                self.nodes[p.0].children.push(id);
            }
            None => {
                if let Some(p) = parent {
                    log::warn!("Parent node {:?} does not exist, adding '{}' as root", p, node.name);
                }
                self.roots.push(id);
            }
        }

        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// 先序遍历顺序（父节点总在子节点之前）
    pub fn traversal_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    pub fn traverse<F: FnMut(NodeId, &Node)>(&self, mut f: F) {
        for id in self.traversal_order() {
            f(id, &self.nodes[id.0]);
        }
    }

    pub fn accept<V: SceneVisitor>(&self, visitor: &mut V) {
        self.traverse(|id, node| match &node.kind {
            NodeKind::Group => visitor.visit_group(id, node),
            NodeKind::Bone => visitor.visit_bone(id, node),
            NodeKind::Mesh(mesh) => visitor.visit_mesh(id, node, mesh),
            NodeKind::SkinnedMesh(mesh) => visitor.visit_skinned_mesh(id, node, mesh),
        });
    }

    /// 从根节点重新计算全部世界矩阵
    ///
    /// 同步执行；姿态修改后调用即完成变换传播。
    pub fn update_world_matrices(&mut self) {
        for id in self.traversal_order() {
            let local = self.nodes[id.0].transform.to_matrix();
            let world = match self.nodes[id.0].parent {
                Some(parent) => self.nodes[parent.0].world * local,
                None => local,
            };
            self.nodes[id.0].world = world;
        }
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        self.node(id).map(|n| n.world).unwrap_or(Mat4::IDENTITY)
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.node(id).map(Node::world_position).unwrap_or(Vec3::ZERO)
    }

    /// 所有蒙皮网格（遍历顺序）
    pub fn skinned_meshes(&self) -> Vec<NodeId> {
        struct Collect(Vec<NodeId>);
        impl SceneVisitor for Collect {
            fn visit_skinned_mesh(&mut self, id: NodeId, _node: &Node, _mesh: &SkinnedMeshData) {
                self.0.push(id);
            }
        }

        let mut collect = Collect(Vec::new());
        self.accept(&mut collect);
        collect.0
    }

    /// 在蒙皮网格的骨架中查找第一个同名骨骼
    ///
    /// 按网格遍历顺序、骨架内骨骼顺序，第一个匹配即返回。
    pub fn find_first_bone(&self, name: &str) -> Option<NodeId> {
        for mesh_id in self.skinned_meshes() {
            let Some(mesh) = self.nodes[mesh_id.0].kind.as_skinned_mesh() else {
                continue;
            };
            if mesh.geometry.is_none() {
                log::error!("Invalid skinned mesh '{}': no geometry", self.nodes[mesh_id.0].name);
                continue;
            }
            if let Some(bone) = mesh.skeleton.find_bone(self, name) {
                return Some(bone);
            }
        }
        None
    }

    /// 按遍历顺序查找第一个同名节点
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.traversal_order()
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_world_matrices_follow_hierarchy() {
        let mut scene = Scene::new();
        let root = scene.add_node("root", NodeKind::Group, NodeTransform::from_translation(Vec3::Y), None);
        let child = scene.add_node(
            "child",
            NodeKind::Bone,
            NodeTransform {
                translation: Vec3::X,
                rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                scale: Vec3::ONE,
            },
            Some(root),
        );
        let grandchild = scene.add_node("tip", NodeKind::Bone, NodeTransform::from_translation(Vec3::X), Some(child));

        scene.update_world_matrices();

        assert!((scene.world_position(child) - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
        // 子节点绕 Z 旋转 90 度后，+X 指向 +Y
        assert!((scene.world_position(grandchild) - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_traversal_is_preorder_in_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", NodeKind::Group, NodeTransform::default(), None);
        let b = scene.add_node("b", NodeKind::Group, NodeTransform::default(), None);
        let a1 = scene.add_node("a1", NodeKind::Group, NodeTransform::default(), Some(a));
        let a2 = scene.add_node("a2", NodeKind::Group, NodeTransform::default(), Some(a));
        let a1x = scene.add_node("a1x", NodeKind::Group, NodeTransform::default(), Some(a1));

        assert_eq!(scene.traversal_order(), vec![a, a1, a1x, a2, b]);
        assert_eq!(scene.find_node_by_name("a2"), Some(a2));
        assert_eq!(scene.find_node_by_name("missing"), None);
    }

    #[test]
    fn test_invalid_parent_becomes_root() {
        let mut scene = Scene::new();
        let id = scene.add_node("orphan", NodeKind::Group, NodeTransform::default(), Some(NodeId(42)));
        assert_eq!(scene.roots(), &[id]);
        assert!(scene.node(id).and_then(|n| n.parent).is_none());
    }
}
