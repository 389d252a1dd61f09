//! Surface classification by steepness

use glam::Vec3;

/// Surface types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    Grass,
    Stone,
}

impl Surface {
    /// Classify a surface from its steepness (`1 - normal.y`)
    pub fn from_steepness(steepness: f32, grass_limit: f32) -> Self {
        if steepness < grass_limit {
            Surface::Grass
        } else {
            Surface::Stone
        }
    }

    /// Base color (linear RGB)
    pub fn color(&self) -> Vec3 {
        match self {
            Surface::Grass => Vec3::new(0.1, 0.25, 0.05),
            Surface::Stone => Vec3::new(0.31, 0.31, 0.31),
        }
    }
}
