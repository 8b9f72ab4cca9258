use std::{fs::File, io::BufReader, path::Path};

use eyre::{Result, WrapErr};
use glam::{Vec2, Vec3};

mod skn;

pub use self::skn::read_skn;

#[cfg(test)]
pub use self::skn::fixtures;

/// A single skinned vertex as stored in the SKN file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
    /// Skinning data, the viewer shows the bind pose only
    #[allow(unused)]
    pub bone_indices: [u8; 4],
    #[allow(unused)]
    pub weights: [f32; 4],
}

/// A named sub-range of the mesh (one per material in the file)
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub start_vertex: u32,
    pub vertex_count: u32,
    pub start_index: u32,
    pub index_count: u32,
}

/// A character model read from disk
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u16>,
    /// Empty for version 0 files
    pub materials: Vec<Material>,
}

/// Floats per vertex in [`Model::interleaved`]
pub const INTERLEAVED_STRIDE: usize = 8;

impl Model {
    pub fn from_file<P: AsRef<Path>>(name: &str, path: P) -> Result<Model> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Couldn't open model file '{}'", path.display()))?;

        read_skn(name, &mut BufReader::new(file))
            .wrap_err_with(|| format!("Couldn't read model file '{}'", path.display()))
    }

    /// Vertex data laid out as [position, normal, texcoord] per vertex
    pub fn interleaved(&self) -> Vec<f32> {
        let mut buf = Vec::with_capacity(self.vertices.len() * INTERLEAVED_STRIDE);

        for v in &self.vertices {
            buf.extend_from_slice(&v.position.to_array());
            buf.extend_from_slice(&v.normal.to_array());
            buf.extend_from_slice(&v.texcoord.to_array());
        }

        buf
    }

    /// Axis-aligned bounding box (min, max). None for a model without vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;

        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.position), max.max(v.position))
        }))
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
