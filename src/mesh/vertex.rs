//! GPU vertex layout for terrain chunks.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// One terrain vertex, laid out for direct upload.
/// Must match the vertex input of the terrain shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
    /// Padding for alignment
    pub _pad: f32,
}

impl TerrainVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
            color: color.to_array(),
            _pad: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 48);
        assert_eq!(std::mem::size_of::<TerrainVertex>() % 16, 0);
    }

    #[test]
    fn test_vertex_accessors() {
        let v = TerrainVertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, Vec2::new(0.25, 0.75), Vec3::splat(0.5));
        assert_eq!(v.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.normal(), Vec3::Y);
        assert_eq!(v.uv(), Vec2::new(0.25, 0.75));
        assert_eq!(v.color(), Vec3::splat(0.5));
    }

    #[test]
    fn test_vertex_cast_to_bytes() {
        let vertices = [TerrainVertex::default(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 3 * 48);
    }
}
