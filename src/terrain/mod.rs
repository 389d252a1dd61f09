//! Procedural terrain surface

pub mod field;
pub use field::HeightField;

pub mod generator;
pub use generator::{TerrainGenerator, TerrainParams};

pub mod palette;
pub use palette::Surface;
