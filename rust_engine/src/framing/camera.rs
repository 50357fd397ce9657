//! 两点取景相机

use glam::{Mat4, Vec3};

use crate::{CaptureError, Result};

/// 相机近平面
pub const NEAR_PLANE: f32 = 0.1;
/// 相机远平面
pub const FAR_PLANE: f32 = 1000.0;

/// 相机变换
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    /// 注视点
    pub target: Vec3,
    /// 视线方向（单位向量）
    pub direction: Vec3,
    /// 垂直视场角（度）
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraTransform {
    /// 视图矩阵（右手坐标系，Y 轴向上；视线接近竖直时改用 Z 轴）
    pub fn view_matrix(&self) -> Mat4 {
        let up = if self.direction.dot(Vec3::Y).abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_to_rh(self.position, self.direction, up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// 相机到注视中心的距离
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

/// 计算框住两个锚点的相机
///
/// 两点包围盒的对角线长度按垂直视场角换算成距离；`bias` 的 Y 分量减半后
/// 作为观察方向的反向，零向量时沿 -Z 观察。
pub fn frame(min_anchor: Vec3, max_anchor: Vec3, bias: Vec3, fov: f32) -> Result<CameraTransform> {
    if !min_anchor.is_finite() || !max_anchor.is_finite() || !bias.is_finite() {
        return Err(CaptureError::InvalidFraming(format!(
            "non-finite input: min={}, max={}, bias={}",
            min_anchor, max_anchor, bias
        )));
    }
    if !(fov > 0.0 && fov < 180.0) {
        return Err(CaptureError::InvalidFraming(format!(
            "field of view must be within (0, 180) degrees, got {}",
            fov
        )));
    }

    let lower = min_anchor.min(max_anchor);
    let upper = min_anchor.max(max_anchor);
    let diagonal = (upper - lower).length();
    if diagonal < f32::EPSILON {
        return Err(CaptureError::InvalidFraming(format!(
            "anchors coincide at {}",
            min_anchor
        )));
    }

    let center = (lower + upper) * 0.5;
    let distance = diagonal / (2.0 * (fov.to_radians() / 2.0).tan());

    let bias = Vec3::new(bias.x, bias.y * 0.5, bias.z);
    let target = center - bias;
    let direction = (-bias).try_normalize().unwrap_or(Vec3::NEG_Z);
    let position = center - direction * distance;

    Ok(CameraTransform {
        position,
        target,
        direction,
        fov,
        near: NEAR_PLANE,
        far: FAR_PLANE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_front() {
        let camera = frame(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Z, 30.0).unwrap();
        let expected_distance = 2.0 / (2.0 * 15f32.to_radians().tan());

        assert!((camera.direction - Vec3::NEG_Z).length() < 1e-5);
        assert!((camera.position - Vec3::new(0.0, 1.0, expected_distance)).length() < 1e-4);
        assert!((camera.target - Vec3::new(0.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_bias_looks_down_negative_z() {
        let camera = frame(Vec3::ZERO, Vec3::Y, Vec3::ZERO, 30.0).unwrap();
        assert_eq!(camera.direction, Vec3::NEG_Z);
        assert!(camera.position.z > 0.0);
        assert_eq!(camera.target, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_deterministic() {
        let a = frame(Vec3::new(-0.3, 0.1, 0.2), Vec3::new(0.2, 1.7, -0.1), Vec3::new(1.0, 1.0, 1.0), 30.0).unwrap();
        let b = frame(Vec3::new(-0.3, 0.1, 0.2), Vec3::new(0.2, 1.7, -0.1), Vec3::new(1.0, 1.0, 1.0), 30.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_distance_scales_linearly() {
        let center = Vec3::new(0.0, 1.0, 0.0);
        let near = frame(center - Vec3::Y, center + Vec3::Y, Vec3::Z, 30.0).unwrap();
        let far = frame(center - Vec3::Y * 2.0, center + Vec3::Y * 2.0, Vec3::Z, 30.0).unwrap();

        let ratio = far.distance_to(center) / near.distance_to(center);
        assert!((ratio - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_bias_y_is_halved() {
        let camera = frame(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, 2.0), 30.0).unwrap();
        let expected = Vec3::new(0.0, -1.0, -2.0).normalize();
        assert!((camera.direction - expected).length() < 1e-5);
        assert!((camera.target - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            frame(Vec3::ONE, Vec3::ONE, Vec3::Z, 30.0),
            Err(CaptureError::InvalidFraming(_))
        ));
        assert!(frame(Vec3::ZERO, Vec3::Y, Vec3::Z, 0.0).is_err());
        assert!(frame(Vec3::ZERO, Vec3::Y, Vec3::Z, 180.0).is_err());
        assert!(frame(Vec3::ZERO, Vec3::INFINITY, Vec3::Z, 30.0).is_err());
    }

    #[test]
    fn test_view_matrix_centres_target() {
        let camera = frame(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), Vec3::X, 30.0).unwrap();
        let view = camera.view_matrix();
        let centre_in_view = view.transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(centre_in_view.x.abs() < 1e-4);
        assert!(centre_in_view.y.abs() < 1e-4);
        assert!(centre_in_view.z < 0.0);
    }
}
