//! 动画关键帧轨道

use glam::{Quat, Vec3};

/// 关键帧插值方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    /// 三次样条；只保留数值关键帧，帧间按线性插值
    CubicSpline,
}

impl From<gltf::animation::Interpolation> for Interpolation {
    fn from(value: gltf::animation::Interpolation) -> Self {
        match value {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        }
    }
}

/// 可插值的关键帧数值
pub trait Keyable: Copy {
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Keyable for Vec3 {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl Keyable for Quat {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t).normalize()
    }
}

/// 单个属性的关键帧轨道，时间单位为秒且递增
#[derive(Clone, Debug)]
pub struct Track<T> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: Interpolation,
}

impl<T: Keyable> Track<T> {
    /// 三次样条输出按 (入切线, 数值, 出切线) 排列，这里只取数值
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Self {
        let values = if interpolation == Interpolation::CubicSpline && values.len() == times.len() * 3 {
            values.chunks_exact(3).map(|c| c[1]).collect()
        } else {
            values
        };
        Self { times, values, interpolation }
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty() || self.values.is_empty()
    }

    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// 采样指定时间；超出范围取端点值，非有限时间返回 `None`
    pub fn sample(&self, time: f32) -> Option<T> {
        let count = self.times.len().min(self.values.len());
        if count == 0 || !time.is_finite() {
            return None;
        }
        if time <= self.times[0] || count == 1 {
            return Some(self.values[0]);
        }
        if time >= self.times[count - 1] {
            return Some(self.values[count - 1]);
        }

        // 第一个大于 time 的关键帧
        let next = self.times[..count].partition_point(|&t| t <= time);
        let prev = next - 1;
        let (t0, t1) = (self.times[prev], self.times[next]);

        match self.interpolation {
            Interpolation::Step => Some(self.values[prev]),
            Interpolation::Linear | Interpolation::CubicSpline => {
                let span = t1 - t0;
                let factor = if span > f32::EPSILON { (time - t0) / span } else { 0.0 };
                Some(T::interpolate(self.values[prev], self.values[next], factor))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_sampling() {
        let track = Track::new(
            vec![0.0, 1.0, 3.0],
            vec![Vec3::ZERO, Vec3::X, Vec3::new(3.0, 0.0, 0.0)],
            Interpolation::Linear,
        );
        assert!((track.sample(0.5).unwrap() - Vec3::new(0.5, 0.0, 0.0)).length() < 0.001);
        assert!((track.sample(2.0).unwrap() - Vec3::new(2.0, 0.0, 0.0)).length() < 0.001);
        assert_eq!(track.sample(-1.0), Some(Vec3::ZERO));
        assert_eq!(track.sample(10.0), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert!((track.duration() - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_step_sampling() {
        let track = Track::new(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::Y], Interpolation::Step);
        assert_eq!(track.sample(0.99), Some(Vec3::ZERO));
        assert_eq!(track.sample(1.0), Some(Vec3::Y));
    }

    #[test]
    fn test_cubic_spline_uses_value_keys() {
        let track = Track::new(
            vec![0.0, 1.0],
            vec![Vec3::splat(9.0), Vec3::ZERO, Vec3::splat(9.0), Vec3::splat(9.0), Vec3::Y, Vec3::splat(9.0)],
            Interpolation::CubicSpline,
        );
        assert_eq!(track.values, vec![Vec3::ZERO, Vec3::Y]);
        assert!((track.sample(0.5).unwrap() - Vec3::new(0.0, 0.5, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_rotation_slerp() {
        let track = Track::new(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)],
            Interpolation::Linear,
        );
        let half = track.sample(0.5).unwrap();
        assert!(half.abs_diff_eq(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4), 1e-4));
    }

    #[test]
    fn test_empty_track() {
        let track: Track<Vec3> = Track::new(Vec::new(), Vec::new(), Interpolation::Linear);
        assert!(track.is_empty());
        assert_eq!(track.sample(1.0), None);
    }

    #[test]
    fn test_non_finite_time_is_not_sampled() {
        let track = Track::new(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::Y], Interpolation::Linear);
        assert_eq!(track.sample(f32::NAN), None);
        assert_eq!(track.sample(f32::INFINITY), None);
        assert_eq!(track.sample(f32::NEG_INFINITY), None);
    }
}
