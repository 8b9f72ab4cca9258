use std::io::Read;

use byteorder::{ReadBytesExt, LE};
use eyre::{eyre, Result, WrapErr};
use glam::{Vec2, Vec3};

use super::{Material, Model, Vertex};

pub const SKN_MAGIC: i32 = 0x0011_2233;
const MATERIAL_NAME_LEN: usize = 64;
/// Header counts are untrusted, buffers only grow past this as data arrives
const MAX_PREALLOC: usize = 64 * 1024;

/// Reads a skinned mesh in the SKN format (versions 0 to 2)
pub fn read_skn<R: Read>(name: &str, reader: &mut R) -> Result<Model> {
    let magic = reader.read_i32::<LE>().wrap_err("Missing SKN header")?;
    if magic != SKN_MAGIC {
        return Err(eyre!("Not a SKN file (magic 0x{magic:08X})"));
    }

    let version = reader.read_u16::<LE>()?;
    let _object_count = reader.read_u16::<LE>()?;

    if version > 2 {
        return Err(eyre!("Unsupported SKN version {version}"));
    }

    let mut materials = Vec::new();
    if version >= 1 {
        let material_count = reader.read_u32::<LE>()?;
        for _ in 0..material_count {
            materials.push(read_material(reader).wrap_err("Truncated material table")?);
        }
    }

    let index_count = read_count(reader, "index")?;
    let vertex_count = read_count(reader, "vertex")?;

    if index_count % 3 != 0 {
        return Err(eyre!("Index count {index_count} is not a triangle list"));
    }

    let mut indices = Vec::with_capacity(index_count.min(MAX_PREALLOC));
    for _ in 0..index_count {
        indices.push(reader.read_u16::<LE>().wrap_err("Truncated index data")?);
    }

    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(eyre!("Index {bad} out of range ({vertex_count} vertices)"));
    }

    let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOC));
    for _ in 0..vertex_count {
        vertices.push(read_vertex(reader).wrap_err("Truncated vertex data")?);
    }

    // Version 2 has a 12 byte tail, nothing in it is needed

    for material in &materials {
        let vertex_end = material.start_vertex as u64 + material.vertex_count as u64;
        let index_end = material.start_index as u64 + material.index_count as u64;

        if vertex_end > vertex_count as u64 || index_end > index_count as u64 {
            return Err(eyre!("Material '{}' is out of the mesh bounds", material.name));
        }
    }

    Ok(Model {
        name: name.to_string(),
        vertices,
        indices,
        materials,
    })
}

fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let count = reader.read_i32::<LE>()?;
    usize::try_from(count).map_err(|_| eyre!("Negative {what} count {count}"))
}

fn read_material<R: Read>(reader: &mut R) -> Result<Material> {
    let mut raw_name = [0u8; MATERIAL_NAME_LEN];
    reader.read_exact(&mut raw_name)?;

    let end = raw_name.iter().position(|&b| b == 0).unwrap_or(MATERIAL_NAME_LEN);
    let name = String::from_utf8_lossy(&raw_name[..end]).into_owned();

    let mut field = |what: &str| -> Result<u32> {
        let v = reader.read_i32::<LE>()?;
        u32::try_from(v).map_err(|_| eyre!("Material '{name}' has a negative {what}"))
    };

    let start_vertex = field("start vertex")?;
    let vertex_count = field("vertex count")?;
    let start_index = field("start index")?;
    let index_count = field("index count")?;

    Ok(Material {
        name,
        start_vertex,
        vertex_count,
        start_index,
        index_count,
    })
}

fn read_vertex<R: Read>(reader: &mut R) -> Result<Vertex> {
    let mut position = [0f32; 3];
    let mut bone_indices = [0u8; 4];
    let mut weights = [0f32; 4];
    let mut normal = [0f32; 3];
    let mut texcoord = [0f32; 2];

    reader.read_f32_into::<LE>(&mut position)?;
    reader.read_exact(&mut bone_indices)?;
    reader.read_f32_into::<LE>(&mut weights)?;
    reader.read_f32_into::<LE>(&mut normal)?;
    reader.read_f32_into::<LE>(&mut texcoord)?;

    Ok(Vertex {
        position: Vec3::from(position),
        normal: Vec3::from(normal),
        texcoord: Vec2::from(texcoord),
        bone_indices,
        weights,
    })
}
