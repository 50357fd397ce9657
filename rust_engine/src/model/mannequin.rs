//! 程序化人体模型
//!
//! 每根骨骼包一个长方体，顶点全权重绑定到所属骨骼。
//! 用于命令行预览与测试，骨骼命名遵循 VRM humanoid。

use glam::{Mat4, Vec3, Vec4};

use super::CharacterModel;
use crate::scene::{Geometry, NodeKind, NodeTransform, Scene, SkinnedMeshData};
use crate::skeleton::Skeleton;

/// 骨骼定义：(名称, 父骨骼, 本地平移, 长方体中心偏移, 长方体半尺寸)
pub const MANNEQUIN_BONES: &[(&str, Option<&str>, [f32; 3], [f32; 3], [f32; 3])] = &[
    ("hips", None, [0.0, 0.95, 0.0], [0.0, 0.05, 0.0], [0.16, 0.1, 0.1]),
    ("chest", Some("hips"), [0.0, 0.25, 0.0], [0.0, 0.15, 0.0], [0.18, 0.18, 0.1]),
    ("head", Some("chest"), [0.0, 0.4, 0.0], [0.0, 0.12, 0.0], [0.1, 0.13, 0.11]),
    ("leftUpperArm", Some("chest"), [0.2, 0.3, 0.0], [0.15, 0.0, 0.0], [0.15, 0.05, 0.05]),
    ("rightUpperArm", Some("chest"), [-0.2, 0.3, 0.0], [-0.15, 0.0, 0.0], [0.15, 0.05, 0.05]),
    ("leftUpperLeg", Some("hips"), [0.09, -0.05, 0.0], [0.0, -0.2, 0.0], [0.07, 0.2, 0.07]),
    ("leftLowerLeg", Some("leftUpperLeg"), [0.0, -0.42, 0.0], [0.0, -0.2, 0.0], [0.06, 0.2, 0.06]),
    ("leftFoot", Some("leftLowerLeg"), [0.0, -0.42, 0.0], [0.0, -0.03, 0.05], [0.05, 0.03, 0.1]),
    ("rightUpperLeg", Some("hips"), [-0.09, -0.05, 0.0], [0.0, -0.2, 0.0], [0.07, 0.2, 0.07]),
    ("rightLowerLeg", Some("rightUpperLeg"), [0.0, -0.42, 0.0], [0.0, -0.2, 0.0], [0.06, 0.2, 0.06]),
    ("rightFoot", Some("rightLowerLeg"), [0.0, -0.42, 0.0], [0.0, -0.03, 0.05], [0.05, 0.03, 0.1]),
];

/// 构建静止姿态的程序化人体
pub fn mannequin() -> CharacterModel {
    let mut scene = Scene::new();
    let armature = scene.add_node("Armature", NodeKind::Group, NodeTransform::default(), None);

    let mut bones = Vec::with_capacity(MANNEQUIN_BONES.len());
    for (name, parent, translation, _, _) in MANNEQUIN_BONES {
        let parent_id = match parent {
            Some(parent) => MANNEQUIN_BONES
                .iter()
                .position(|(n, ..)| n == parent)
                .map(|i| bones[i]),
            None => Some(armature),
        };
        let id = scene.add_node(
            *name,
            NodeKind::Bone,
            NodeTransform::from_translation(Vec3::from(*translation)),
            parent_id,
        );
        bones.push(id);
    }
    scene.update_world_matrices();

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    let mut skin_indices = Vec::new();
    for (bone_index, (_, _, _, center, half)) in MANNEQUIN_BONES.iter().enumerate() {
        let origin = scene.world_position(bones[bone_index]) + Vec3::from(*center);
        add_box(&mut positions, &mut indices, origin, Vec3::from(*half));
        skin_indices.extend(std::iter::repeat([bone_index as u16, 0, 0, 0]).take(8));
    }
    let skin_weights = vec![[1.0, 0.0, 0.0, 0.0]; positions.len()];

    let geometry = Geometry::new(positions)
        .with_indices(indices)
        .with_skin(skin_indices, skin_weights)
        .with_base_color(Vec4::new(0.85, 0.72, 0.62, 1.0));

    let skeleton = Skeleton::from_current_pose(&scene, bones);
    scene.add_node(
        "Body",
        NodeKind::SkinnedMesh(SkinnedMeshData {
            geometry: Some(geometry),
            skeleton,
            bind_matrix: Mat4::IDENTITY,
        }),
        NodeTransform::default(),
        None,
    );

    CharacterModel::new("mannequin", scene)
}

/// 轴对齐长方体，6 个面各拆成两个逆时针三角形
fn add_box(positions: &mut Vec<Vec3>, indices: &mut Vec<u32>, center: Vec3, half: Vec3) {
    let base = positions.len() as u32;
    let (p, r) = (center, half);
    positions.extend_from_slice(&[
        Vec3::new(p.x - r.x, p.y - r.y, p.z + r.z), // 0 前左下
        Vec3::new(p.x + r.x, p.y - r.y, p.z + r.z), // 1 前右下
        Vec3::new(p.x + r.x, p.y + r.y, p.z + r.z), // 2 前右上
        Vec3::new(p.x - r.x, p.y + r.y, p.z + r.z), // 3 前左上
        Vec3::new(p.x + r.x, p.y - r.y, p.z - r.z), // 4 后右下
        Vec3::new(p.x - r.x, p.y - r.y, p.z - r.z), // 5 后左下
        Vec3::new(p.x - r.x, p.y + r.y, p.z - r.z), // 6 后左上
        Vec3::new(p.x + r.x, p.y + r.y, p.z - r.z), // 7 后右上
    ]);

    let quads = [
        [0, 1, 2, 3], // +Z
        [4, 5, 6, 7], // -Z
        [5, 0, 3, 6], // -X
        [1, 4, 7, 2], // +X
        [3, 2, 7, 6], // +Y
        [5, 4, 1, 0], // -Y
    ];
    for [a, b, c, d] in quads {
        indices.extend_from_slice(&[base + a, base + b, base + c, base + a, base + c, base + d]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mannequin_layout() {
        let model = mannequin();
        assert_eq!(model.skinned_mesh_count(), 1);
        assert_eq!(model.vertex_count(), MANNEQUIN_BONES.len() * 8);

        let head = model.find_bone("head").unwrap();
        assert!((model.scene().world_position(head) - Vec3::new(0.0, 1.6, 0.0)).length() < 1e-5);

        let foot = model.find_bone("leftFoot").unwrap();
        assert!((model.scene().world_position(foot).y - 0.06).abs() < 1e-5);
    }
}
