//! 作用域姿态守卫
//!
//! 进入时保存骨架姿态并切换到静止姿态，离开作用域时（包括提前返回
//! 与 panic 展开）恢复原姿态并同步世界矩阵。

use std::ops::Deref;

use super::{PoseSnapshot, Skeleton};
use crate::scene::Scene;

pub struct PoseGuard<'a> {
    scene: &'a mut Scene,
    snapshot: PoseSnapshot,
}

impl<'a> PoseGuard<'a> {
    /// 保存当前姿态，切换到静止姿态并完成变换传播
    pub fn rest_pose(scene: &'a mut Scene, skeleton: &Skeleton) -> Self {
        let snapshot = skeleton.snapshot(scene);
        skeleton.apply_rest_pose(scene);
        scene.update_world_matrices();
        Self { scene, snapshot }
    }

    pub fn snapshot(&self) -> &PoseSnapshot {
        &self.snapshot
    }
}

impl Deref for PoseGuard<'_> {
    type Target = Scene;

    fn deref(&self) -> &Scene {
        self.scene
    }
}

impl Drop for PoseGuard<'_> {
    fn drop(&mut self) {
        self.snapshot.restore(self.scene);
        self.scene.update_world_matrices();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeKind, NodeTransform};
    use glam::{Quat, Vec3};

    fn two_bone_scene() -> (Scene, Skeleton) {
        let mut scene = Scene::new();
        let root = scene.add_node(
            "hips",
            NodeKind::Bone,
            NodeTransform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            None,
        );
        let head = scene.add_node(
            "head",
            NodeKind::Bone,
            NodeTransform::from_translation(Vec3::new(0.0, 0.5, 0.0)),
            Some(root),
        );
        scene.update_world_matrices();
        let skeleton = Skeleton::from_current_pose(&scene, vec![root, head]);
        (scene, skeleton)
    }

    fn pose_away_from_rest(scene: &mut Scene, skeleton: &Skeleton) {
        let root = scene.node_mut(skeleton.bones[0]).unwrap();
        root.transform.rotation = Quat::from_rotation_z(0.7);
        root.transform.translation = Vec3::new(0.3, 0.8, -0.2);
        let head = scene.node_mut(skeleton.bones[1]).unwrap();
        head.transform.scale = Vec3::splat(1.3);
        scene.update_world_matrices();
    }

    #[test]
    fn test_rest_pose_inside_guard() {
        let (mut scene, skeleton) = two_bone_scene();
        pose_away_from_rest(&mut scene, &skeleton);
        let head = skeleton.bones[1];

        let guard = PoseGuard::rest_pose(&mut scene, &skeleton);
        assert_eq!(guard.snapshot().len(), 2);
        assert!((guard.world_position(head) - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_pose_restored_on_drop() {
        let (mut scene, skeleton) = two_bone_scene();
        pose_away_from_rest(&mut scene, &skeleton);
        let before = skeleton.snapshot(&scene);
        let head_world = scene.world_matrix(skeleton.bones[1]);

        drop(PoseGuard::rest_pose(&mut scene, &skeleton));

        assert_eq!(skeleton.snapshot(&scene), before);
        assert_eq!(scene.world_matrix(skeleton.bones[1]), head_world);
    }

    #[test]
    fn test_pose_restored_on_panic() {
        let (mut scene, skeleton) = two_bone_scene();
        pose_away_from_rest(&mut scene, &skeleton);
        let before = skeleton.snapshot(&scene);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = PoseGuard::rest_pose(&mut scene, &skeleton);
            panic!("sampling failed");
        }));

        assert!(result.is_err());
        assert_eq!(skeleton.snapshot(&scene), before);
    }

    #[test]
    fn test_rest_pose_through_helper_node() {
        let mut scene = Scene::new();
        let hips = scene.add_node(
            "hips",
            NodeKind::Bone,
            NodeTransform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            None,
        );
        let helper = scene.add_node(
            "neck_helper",
            NodeKind::Group,
            NodeTransform::from_translation(Vec3::new(0.0, 0.2, 0.0)),
            Some(hips),
        );
        let head = scene.add_node(
            "head",
            NodeKind::Bone,
            NodeTransform::from_translation(Vec3::new(0.0, 0.5, 0.0)),
            Some(helper),
        );
        scene.update_world_matrices();
        let skeleton = Skeleton::from_current_pose(&scene, vec![hips, head]);

        scene.node_mut(hips).unwrap().transform.rotation = Quat::from_rotation_z(1.2);
        scene.update_world_matrices();
        assert!((scene.world_position(head) - Vec3::new(0.0, 1.7, 0.0)).length() > 0.1);

        let guard = PoseGuard::rest_pose(&mut scene, &skeleton);
        assert!((guard.world_position(helper) - Vec3::new(0.0, 1.2, 0.0)).length() < 1e-5);
        assert!((guard.world_position(head) - Vec3::new(0.0, 1.7, 0.0)).length() < 1e-5);
    }
}
