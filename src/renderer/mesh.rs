use std::ptr;

use eyre::{eyre, Result};

use crate::{model::Model, ogl};

/// A model uploaded to the GPU as one VAO with interleaved vertex data
pub struct GpuMesh {
    pub vao: u32,
    vbo: u32,
    ibo: u32,
    pub index_count: usize,
}

impl GpuMesh {
    pub fn from_model(model: &Model) -> Result<Self> {
        if model.indices.is_empty() {
            return Err(eyre!("Model '{}' has no triangles", model.name));
        }

        let data = model.interleaved();
        let layout = [
            (ogl::POS_INDEX, 3),
            (ogl::NORMALS_INDEX, 3),
            (ogl::TEXCOORDS_INDEX, 2),
        ];

        let mut vao = 0;

        let (vbo, ibo) = unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);

            let vbo = ogl::create_interleaved_buf(&data, &layout);
            let ibo = ogl::create_index_buf(&model.indices);

            // Unbind buffers
            gl::BindVertexArray(0);
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, 0);

            (vbo, ibo)
        };

        let mesh = Self {
            vao,
            vbo,
            ibo,
            index_count: model.indices.len(),
        };

        if mesh.vao == 0 {
            mesh.delete();
            return Err(eyre!("Model VAO wasn't correctly initialized"));
        }

        Ok(mesh)
    }

    pub fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawElements(
                gl::TRIANGLES,
                self.index_count as i32,
                gl::UNSIGNED_SHORT,
                ptr::null(),
            );
            gl::BindVertexArray(0);
        }
    }

    pub fn delete(self) {
        unsafe {
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteBuffers(1, &self.ibo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}
