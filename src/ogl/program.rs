use std::{collections::HashMap, ffi::CString};

use eyre::{eyre, Result, WrapErr};
use glam::{Mat4, Vec3, Vec4};

use super::{
    api::{check_error, GlApi},
    shader::Shader,
};

/// Represents an OpenGL shader program (a linked set of shader stages).
///
/// Every operation forwards to the driver and checks its error flag right after.
/// Uniforms have to be registered with [`ShaderProgram::set_uniform_location`]
/// before they can be updated by name.
pub struct ShaderProgram<A: GlApi> {
    api: A,
    /// 0 means no program
    id: u32,
    /// Attached stages, in attach order
    shaders: Vec<u32>,
    /// Name -> location cache
    uniforms: HashMap<String, i32>,
}

impl<A: GlApi> ShaderProgram<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            id: 0,
            shaders: Vec::new(),
            uniforms: HashMap::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    #[allow(unused)]
    pub fn attached_shaders(&self) -> &[u32] {
        &self.shaders
    }

    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        self.uniforms.get(name).copied()
    }

    #[allow(unused)]
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn create(&mut self) -> Result<()> {
        self.id = self.api.create_program();
        if self.id == 0 {
            return Err(eyre!("Failed to create a shader program"));
        }

        Ok(())
    }

    /// The shader is only recorded (and later detached by `destroy`) if attaching succeeded
    pub fn attach_shader(&mut self, shader: &Shader) -> Result<()> {
        self.api.attach_shader(self.id, shader.id);
        check_error(&self.api, "glAttachShader")?;

        self.shaders.push(shader.id);
        Ok(())
    }

    pub fn bind_attribute(&mut self, location: u32, name: &str) -> Result<()> {
        let c_name = to_c_name(name)?;
        self.api.bind_attrib_location(self.id, location, &c_name);
        check_error(&self.api, "glBindAttribLocation")
            .wrap_err_with(|| format!("Couldn't bind attribute '{name}'"))
    }

    pub fn set_uniform_location(&mut self, name: &str) -> Result<()> {
        let c_name = to_c_name(name)?;

        let location = self.api.get_uniform_location(self.id, &c_name);
        if location == -1 {
            return Err(eyre!("Uniform '{name}' not found in program {}", self.id));
        }

        self.uniforms.insert(name.to_string(), location);
        Ok(())
    }

    pub fn link(&mut self) -> Result<()> {
        self.api.link_program(self.id);
        check_error(&self.api, "glLinkProgram")?;

        if !self.api.link_status(self.id) {
            let info_msg = self.api.program_info_log(self.id);
            log::error!("Shader program {} failed to link: {info_msg}", self.id);
            return Err(eyre!("Failed to link a shader program: '{info_msg}'"));
        }

        Ok(())
    }

    /// Makes this the current program
    pub fn use_program(&self) -> Result<()> {
        self.api.use_program(self.id);
        check_error(&self.api, "glUseProgram")
    }

    pub fn update_uniform<V: UniformValue>(&self, name: &str, value: V) -> Result<()> {
        let location = self
            .uniform_location(name)
            .ok_or_else(|| eyre!("Uniform '{name}' has no recorded location"))?;

        value.upload(&self.api, location);
        check_error(&self.api, "glUniform")
            .wrap_err_with(|| format!("Couldn't update uniform '{name}'"))
    }

    /// Detaches all stages and deletes the program. Safe to call more than once.
    pub fn destroy(&mut self) {
        for shader in self.shaders.drain(..) {
            self.api.detach_shader(self.id, shader);
        }

        if self.id != 0 {
            self.api.delete_program(self.id);
            self.id = 0;
        }

        self.uniforms.clear();
    }
}

fn to_c_name(name: &str) -> Result<CString> {
    CString::new(name)
        .wrap_err_with(|| format!("Name '{}' contains a NUL byte", name.escape_debug()))
}

/// A value that can be written into a uniform slot
pub trait UniformValue {
    fn upload<A: GlApi>(&self, api: &A, location: i32);
}

impl UniformValue for Vec3 {
    fn upload<A: GlApi>(&self, api: &A, location: i32) {
        api.uniform_3f(location, self.to_array());
    }
}

impl UniformValue for Vec4 {
    fn upload<A: GlApi>(&self, api: &A, location: i32) {
        api.uniform_4f(location, self.to_array());
    }
}

impl UniformValue for Mat4 {
    fn upload<A: GlApi>(&self, api: &A, location: i32) {
        api.uniform_matrix_4f(location, &self.to_cols_array());
    }
}

impl UniformValue for i32 {
    fn upload<A: GlApi>(&self, api: &A, location: i32) {
        api.uniform_1i(location, *self);
    }
}

impl UniformValue for f32 {
    fn upload<A: GlApi>(&self, api: &A, location: i32) {
        api.uniform_1f(location, *self);
    }
}
