use std::ffi::CString;

use eyre::{eyre, Result, WrapErr};
use gl::types::GLenum;

use super::api::GlApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderKind::Vertex => gl::VERTEX_SHADER,
            ShaderKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// A single compiled shader stage
#[derive(Debug)]
pub struct Shader {
    pub id: u32,
}

impl Shader {
    pub fn compile<A: GlApi>(api: &A, kind: ShaderKind, src: &str) -> Result<Shader> {
        let src = CString::new(src).wrap_err("Shader source contains a NUL byte")?;

        let id = api.create_shader(kind.gl_enum());
        if id == 0 {
            return Err(eyre!("Failed to create a {kind:?} shader"));
        }

        api.shader_source(id, &src);
        api.compile_shader(id);

        if !api.compile_status(id) {
            let info_msg = api.shader_info_log(id);
            api.delete_shader(id);
            return Err(eyre!("Failed to compile a {kind:?} shader: '{info_msg}'"));
        }

        Ok(Shader { id })
    }

    pub fn delete<A: GlApi>(self, api: &A) {
        api.delete_shader(self.id);
    }
}
