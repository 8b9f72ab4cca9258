use std::ffi::CStr;

use eyre::{eyre, Result};
use gl::types::GLenum;

/// The subset of the OpenGL API used for shader programs.
///
/// Every method maps to exactly one driver call. Errors are not reported here,
/// callers query [`GlApi::get_error`] afterwards (see [`check_error`]).
pub trait GlApi {
    fn create_program(&self) -> u32;
    fn attach_shader(&self, program: u32, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);
    fn bind_attrib_location(&self, program: u32, index: u32, name: &CStr);
    /// Returns -1 if the uniform doesn't exist (or was optimized out)
    fn get_uniform_location(&self, program: u32, name: &CStr) -> i32;
    fn link_program(&self, program: u32);
    fn link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&self, program: u32);
    fn delete_program(&self, program: u32);

    fn create_shader(&self, kind: GLenum) -> u32;
    fn shader_source(&self, shader: u32, src: &CStr);
    fn compile_shader(&self, shader: u32);
    fn compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    fn uniform_1i(&self, location: i32, v: i32);
    fn uniform_1f(&self, location: i32, v: f32);
    fn uniform_3f(&self, location: i32, v: [f32; 3]);
    fn uniform_4f(&self, location: i32, v: [f32; 4]);
    /// Column-major, never transposed
    fn uniform_matrix_4f(&self, location: i32, m: &[f32; 16]);

    fn get_error(&self) -> GLenum;
}

/// Turns the driver's error flag into an error naming the failed operation.
pub fn check_error<A: GlApi + ?Sized>(api: &A, what: &str) -> Result<()> {
    match api.get_error() {
        gl::NO_ERROR => Ok(()),
        code => Err(eyre!("{what} failed with GL error 0x{code:04X}")),
    }
}

/// Forwards to the global function pointers loaded by the `gl` crate.
///
/// Requires a current OpenGL context on the calling thread.
#[derive(Clone, Copy, Default)]
pub struct NativeGl;

const INFO_LOG_LEN: usize = 1024;

impl GlApi for NativeGl {
    fn create_program(&self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &CStr) {
        unsafe { gl::BindAttribLocation(program, index, name.as_ptr()) }
    }

    fn get_uniform_location(&self, program: u32, name: &CStr) -> i32 {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn link_program(&self, program: u32) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: u32) -> bool {
        let mut res = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut res) };
        res != 0
    }

    fn program_info_log(&self, program: u32) -> String {
        let mut info_log = [0u8; INFO_LOG_LEN];
        let mut info_len = 0;

        unsafe {
            gl::GetProgramInfoLog(
                program,
                INFO_LOG_LEN as i32,
                &mut info_len,
                info_log.as_mut_ptr() as _,
            );
        }

        let len = (info_len.max(0) as usize).min(INFO_LOG_LEN);
        String::from_utf8_lossy(&info_log[..len]).into_owned()
    }

    fn use_program(&self, program: u32) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: u32) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn create_shader(&self, kind: GLenum) -> u32 {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: u32, src: &CStr) {
        let ptr = src.as_ptr();
        unsafe { gl::ShaderSource(shader, 1, &ptr, std::ptr::null()) }
    }

    fn compile_shader(&self, shader: u32) {
        unsafe { gl::CompileShader(shader) }
    }

    fn compile_status(&self, shader: u32) -> bool {
        let mut res = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut res) };
        res != 0
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let mut info_log = [0u8; INFO_LOG_LEN];
        let mut info_len = 0;

        unsafe {
            gl::GetShaderInfoLog(
                shader,
                INFO_LOG_LEN as i32,
                &mut info_len,
                info_log.as_mut_ptr() as _,
            );
        }

        let len = (info_len.max(0) as usize).min(INFO_LOG_LEN);
        String::from_utf8_lossy(&info_log[..len]).into_owned()
    }

    fn delete_shader(&self, shader: u32) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn uniform_1i(&self, location: i32, v: i32) {
        unsafe { gl::Uniform1i(location, v) }
    }

    fn uniform_1f(&self, location: i32, v: f32) {
        unsafe { gl::Uniform1f(location, v) }
    }

    fn uniform_3f(&self, location: i32, v: [f32; 3]) {
        unsafe { gl::Uniform3f(location, v[0], v[1], v[2]) }
    }

    fn uniform_4f(&self, location: i32, v: [f32; 4]) {
        unsafe { gl::Uniform4f(location, v[0], v[1], v[2], v[3]) }
    }

    fn uniform_matrix_4f(&self, location: i32, m: &[f32; 16]) {
        unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr()) }
    }

    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }
}
