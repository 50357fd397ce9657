//! 截图渲染器
//!
//! `Renderer` 是截图原语的抽象；`SoftwareRenderer` 在 CPU 上完成蒙皮、
//! 投影与 z-buffer 光栅化，使用网格基础色做 Lambert 着色。

use std::io::Cursor;

use glam::{Mat4, Vec3, Vec4Swizzles};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use super::Background;
use crate::framing::CameraTransform;
use crate::model::CharacterModel;
use crate::scene::{Geometry, NodeKind};
use crate::skinning::skin_mesh;
use crate::{CaptureError, Result};

/// 截图渲染器
pub trait Renderer {
    fn render(
        &mut self,
        model: &CharacterModel,
        camera: &CameraTransform,
        background: &Background,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage>;
}

/// CPU 光栅化渲染器
#[derive(Clone, Debug)]
pub struct SoftwareRenderer {
    /// 环境光强度
    pub ambient: f32,
    /// 漫反射强度（光源与相机同向）
    pub diffuse: f32,
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self {
            ambient: 0.35,
            diffuse: 0.65,
        }
    }
}

/// 屏幕空间顶点；相机后方的顶点为 `None`
type ScreenVertex = Option<Vec3>;

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_geometry(
        &self,
        target: &mut Target,
        geometry: &Geometry,
        world_positions: &[Vec3],
        view_projection: Mat4,
        view_dir: Vec3,
    ) {
        let (width, height) = (target.width as f32, target.height as f32);
        let screen: Vec<ScreenVertex> = world_positions
            .par_iter()
            .map(|&p| {
                let clip = view_projection * p.extend(1.0);
                if clip.w <= 1e-5 {
                    return None;
                }
                let ndc = clip.xyz() / clip.w;
                Some(Vec3::new(
                    (ndc.x + 1.0) * 0.5 * width,
                    (1.0 - ndc.y) * 0.5 * height,
                    ndc.z,
                ))
            })
            .collect();

        let base = geometry.base_color.truncate();
        for [a, b, c] in geometry.triangles() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let (Some(Some(sa)), Some(Some(sb)), Some(Some(sc))) =
                (screen.get(a), screen.get(b), screen.get(c))
            else {
                continue;
            };

            let normal = (world_positions[b] - world_positions[a])
                .cross(world_positions[c] - world_positions[a])
                .normalize_or_zero();
            let intensity = self.ambient + self.diffuse * normal.dot(-view_dir).abs();
            let color = super::background::to_rgba(base * intensity);

            target.fill_triangle(*sa, *sb, *sc, color);
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn render(
        &mut self,
        model: &CharacterModel,
        camera: &CameraTransform,
        background: &Background,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidArgument(format!(
                "image size must be non-zero, got {}x{}",
                width, height
            )));
        }

        let view_projection =
            camera.projection_matrix(width as f32 / height as f32) * camera.view_matrix();
        let mut target = Target {
            width,
            height,
            color: background.fill(width, height),
            depth: vec![f32::INFINITY; width as usize * height as usize],
        };

        let scene = model.scene();
        for id in scene.traversal_order() {
            let Some(node) = scene.node(id) else { continue };
            match &node.kind {
                NodeKind::SkinnedMesh(mesh) => {
                    if let Some(geometry) = &mesh.geometry {
                        let positions = skin_mesh(scene, node.world, mesh);
                        self.draw_geometry(&mut target, geometry, &positions, view_projection, camera.direction);
                    }
                }
                NodeKind::Mesh(mesh) => {
                    if let Some(geometry) = &mesh.geometry {
                        let positions: Vec<Vec3> = geometry
                            .positions
                            .par_iter()
                            .map(|&p| node.world.transform_point3(p))
                            .collect();
                        self.draw_geometry(&mut target, geometry, &positions, view_projection, camera.direction);
                    }
                }
                NodeKind::Group | NodeKind::Bone => {}
            }
        }

        Ok(target.color)
    }
}

/// 颜色缓冲与深度缓冲
struct Target {
    width: u32,
    height: u32,
    color: RgbaImage,
    depth: Vec<f32>,
}

impl Target {
    /// 边函数光栅化，像素中心采样
    fn fill_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, color: Rgba<u8>) {
        let area = edge(a, b, c);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil().max(0.0) as u32).min(self.width);
        let max_y = (a.y.max(b.y).max(c.y).ceil().max(0.0) as u32).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let z = w0 * a.z + w1 * b.z + w2 * c.z;
                if !(-1.0..=1.0).contains(&z) {
                    continue;
                }
                let index = y as usize * self.width as usize + x as usize;
                if z < self.depth[index] {
                    self.depth[index] = z;
                    self.color.put_pixel(x, y, color);
                }
            }
        }
    }
}

fn edge(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// PNG 编码
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| CaptureError::Image(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}
