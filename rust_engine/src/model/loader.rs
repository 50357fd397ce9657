//! glTF/GLB 角色加载器

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Quat, Vec3, Vec4};
use gltf::mesh::util::{ReadIndices, ReadJoints, ReadWeights};

use crate::scene::{Geometry, MeshData, NodeId, NodeKind, NodeTransform, Scene, SkinnedMeshData};
use crate::skeleton::Skeleton;
use crate::{CaptureError, Result};

use super::CharacterModel;

/// 从文件加载 glTF/GLB 角色
pub fn load_gltf<P: AsRef<Path>>(path: P) -> Result<CharacterModel> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| CaptureError::Gltf(format!("{}: {}", path.display(), e)))?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "character".to_string());
    build_character(name, &document, &buffers)
}

/// 从内存加载 glTF/GLB 角色（外部缓冲区只支持 data URI）
pub fn load_gltf_slice(bytes: &[u8]) -> Result<CharacterModel> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| CaptureError::Gltf(e.to_string()))?;
    build_character("character".to_string(), &document, &buffers)
}

fn build_character(
    name: String,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<CharacterModel> {
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| CaptureError::Gltf("document has no scene".to_string()))?;

    let joint_indices: Vec<usize> = document
        .skins()
        .flat_map(|skin| skin.joints().map(|j| j.index()).collect::<Vec<_>>())
        .collect();

    // 第一遍：建立节点层级，网格节点稍后填充
    let mut scene = Scene::new();
    let mut ids: HashMap<usize, NodeId> = HashMap::new();
    let mut mesh_nodes = Vec::new();
    let mut stack: Vec<(gltf::Node, Option<NodeId>)> =
        gltf_scene.nodes().map(|n| (n, None)).collect();
    stack.reverse();

    while let Some((node, parent)) = stack.pop() {
        let kind = if joint_indices.contains(&node.index()) {
            NodeKind::Bone
        } else {
            NodeKind::Group
        };
        let node_name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));
        let id = scene.add_node(node_name, kind, decompose_node(&node), parent);
        ids.insert(node.index(), id);

        if node.mesh().is_some() {
            mesh_nodes.push((id, node.clone()));
        }
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|c| (c, Some(id))));
    }
    scene.update_world_matrices();

    // 第二遍：网格与骨架（骨骼节点此时都已存在）
    for (id, node) in mesh_nodes {
        let Some(mesh) = node.mesh() else { continue };
        let geometry = read_geometry(&mesh, buffers);

        let kind = match node.skin() {
            Some(skin) => {
                let bones: Vec<NodeId> = skin
                    .joints()
                    .filter_map(|j| {
                        let bone = ids.get(&j.index()).copied();
                        if bone.is_none() {
                            log::warn!("Skin joint {} is not part of the loaded scene", j.index());
                        }
                        bone
                    })
                    .collect();
                let reader = skin.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
                let bone_inverses = match reader.read_inverse_bind_matrices() {
                    Some(iter) => iter.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
                    None => vec![Mat4::IDENTITY; bones.len()],
                };
                NodeKind::SkinnedMesh(SkinnedMeshData {
                    geometry,
                    skeleton: Skeleton::new(bones, bone_inverses),
                    bind_matrix: scene.world_matrix(id),
                })
            }
            None => NodeKind::Mesh(MeshData { geometry }),
        };

        if let Some(scene_node) = scene.node_mut(id) {
            scene_node.kind = kind;
        }
    }

    log::info!(
        "Loaded glTF character '{}': {} nodes, {} skins",
        name,
        scene.len(),
        document.skins().count()
    );
    Ok(CharacterModel::new(name, scene))
}

/// 合并网格的全部图元；缺少蒙皮属性的图元补零权重
fn read_geometry(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Option<Geometry> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut skin_indices: Vec<[u16; 4]> = Vec::new();
    let mut skin_weights: Vec<[f32; 4]> = Vec::new();
    let mut any_skin = false;
    let mut base_color = None;

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
        let Some(pos_it) = reader.read_positions() else {
            log::warn!("Primitive {} of mesh '{}' has no positions", primitive.index(), mesh.name().unwrap_or(""));
            continue;
        };

        let base = positions.len() as u32;
        let count_before = positions.len();
        positions.extend(pos_it.map(Vec3::from));
        let count = positions.len() - count_before;

        match reader.read_indices() {
            Some(ReadIndices::U8(it)) => indices.extend(it.map(|i| i as u32 + base)),
            Some(ReadIndices::U16(it)) => indices.extend(it.map(|i| i as u32 + base)),
            Some(ReadIndices::U32(it)) => indices.extend(it.map(|i| i + base)),
            None => indices.extend(base..base + count as u32),
        }

        let joints: Option<Vec<[u16; 4]>> = reader.read_joints(0).map(|joints| match joints {
            ReadJoints::U8(it) => it
                .map(|v| [v[0] as u16, v[1] as u16, v[2] as u16, v[3] as u16])
                .collect(),
            ReadJoints::U16(it) => it.collect(),
        });
        let weights: Option<Vec<[f32; 4]>> = reader.read_weights(0).map(|weights| match weights {
            ReadWeights::F32(it) => it.collect(),
            ReadWeights::U16(it) => it.map(|v| v.map(|w| w as f32 / 65535.0)).collect(),
            ReadWeights::U8(it) => it.map(|v| v.map(|w| w as f32 / 255.0)).collect(),
        });

        match (joints, weights) {
            (Some(j), Some(w)) if j.len() == count && w.len() == count => {
                any_skin = true;
                skin_indices.extend(j);
                skin_weights.extend(w);
            }
            _ => {
                skin_indices.extend(std::iter::repeat([0; 4]).take(count));
                skin_weights.extend(std::iter::repeat([0.0; 4]).take(count));
            }
        }

        if base_color.is_none() {
            base_color = Some(Vec4::from(
                primitive.material().pbr_metallic_roughness().base_color_factor(),
            ));
        }
    }

    if positions.is_empty() {
        return None;
    }

    let mut geometry = Geometry::new(positions).with_indices(indices);
    if any_skin {
        geometry = geometry.with_skin(skin_indices, skin_weights);
    }
    if let Some(color) = base_color {
        geometry = geometry.with_base_color(color);
    }
    Some(geometry)
}

fn decompose_node(node: &gltf::Node) -> NodeTransform {
    match node.transform() {
        gltf::scene::Transform::Matrix { matrix } => {
            NodeTransform::from_matrix(&Mat4::from_cols_array_2d(&matrix))
        }
        gltf::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => NodeTransform {
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation).normalize(),
            scale: Vec3::from(scale),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKINNED_PAIR: &str = include_str!("../../tests/fixtures/skinned_pair.gltf");

    #[test]
    fn test_load_skinned_pair() {
        let model = load_gltf_slice(SKINNED_PAIR.as_bytes()).unwrap();
        assert_eq!(model.skinned_mesh_count(), 1);
        assert_eq!(model.vertex_count(), 6);

        let head = model.find_bone("head").unwrap();
        assert!((model.scene().world_position(head) - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-5);

        let mesh_id = model.scene().skinned_meshes()[0];
        let mesh = model.scene().node(mesh_id).unwrap().kind.as_skinned_mesh().unwrap();
        assert_eq!(mesh.skeleton.bone_count(), 2);
        let geometry = mesh.geometry.as_ref().unwrap();
        assert!(geometry.has_skin_attributes());
        assert_eq!(geometry.primary_influence(4), Some((1, 1.0)));
        assert!((geometry.base_color.x - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_invalid_document_is_error() {
        assert!(matches!(
            load_gltf_slice(b"not a gltf"),
            Err(CaptureError::Gltf(_))
        ));
    }
}
