use std::{
    ffi::{c_void, CStr},
    mem::size_of,
    ptr,
};

/// The driver seam used by shaders and programs.
pub mod api;

/// Abstraction for working with OpenGL shader programs.
pub mod program;

/// Abstraction for compiling single shader stages.
pub mod shader;

pub const POS_INDEX: u32 = 0;
pub const NORMALS_INDEX: u32 = 1;
pub const TEXCOORDS_INDEX: u32 = 2;

/// Routes driver debug messages into the log. Needs GL 4.3 or KHR_debug, a no-op otherwise.
pub fn init_debug() {
    if !gl::DebugMessageCallback::is_loaded() {
        log::debug!("GL debug output is not available");
        return;
    }

    unsafe {
        gl::Enable(gl::DEBUG_OUTPUT);
        gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
        gl::DebugMessageCallback(Some(gl_debug_callback), ptr::null());
        gl::DebugMessageControl(
            gl::DONT_CARE,
            gl::DONT_CARE,
            gl::DONT_CARE,
            0,
            ptr::null(),
            gl::TRUE,
        );
    };
}

extern "system" fn gl_debug_callback(
    _src: u32,
    _typ: u32,
    id: u32,
    severity: u32,
    _len: i32,
    msg: *const i8,
    _user_param: *mut c_void,
) {
    // Buffer creation on NVidia cards
    if id == 131185 {
        return;
    }

    let msg = unsafe { CStr::from_ptr(msg) };
    let msg = msg.to_string_lossy();

    match severity {
        gl::DEBUG_SEVERITY_HIGH => log::error!("OpenGL: '{msg}'"),
        gl::DEBUG_SEVERITY_MEDIUM => log::warn!("OpenGL: '{msg}'"),
        gl::DEBUG_SEVERITY_LOW => log::info!("OpenGL: '{msg}'"),
        _ => log::debug!("OpenGL: '{msg}'"),
    }
}

/// Uploads interleaved f32 vertex data into a new ARRAY_BUFFER.
///
/// `layout` lists (attribute index, component count) in the order they appear
/// inside one vertex. Expects a VAO to be bound.
pub fn create_interleaved_buf(data: &[f32], layout: &[(u32, i32)]) -> u32 {
    let stride: i32 = layout.iter().map(|(_, comps)| comps).sum();
    let stride_bytes = stride * size_of::<f32>() as i32;

    let mut buffer = 0;

    unsafe {
        gl::GenBuffers(1, &mut buffer);
        gl::BindBuffer(gl::ARRAY_BUFFER, buffer);
        gl::BufferData(
            gl::ARRAY_BUFFER,
            (data.len() * size_of::<f32>()) as isize,
            data.as_ptr() as _,
            gl::STATIC_DRAW,
        );

        let mut offset = 0;
        for &(index, comps) in layout {
            gl::VertexAttribPointer(
                index,
                comps,
                gl::FLOAT,
                gl::FALSE,
                stride_bytes,
                (offset * size_of::<f32>()) as *const c_void,
            );
            gl::EnableVertexAttribArray(index);
            offset += comps as usize;
        }
    }

    buffer
}

/// Uploads u16 indices into a new ELEMENT_ARRAY_BUFFER. Expects a VAO to be bound.
pub fn create_index_buf(indices: &[u16]) -> u32 {
    let mut buffer = 0;

    unsafe {
        gl::GenBuffers(1, &mut buffer);
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, buffer);
        gl::BufferData(
            gl::ELEMENT_ARRAY_BUFFER,
            (indices.len() * size_of::<u16>()) as isize,
            indices.as_ptr() as _,
            gl::STATIC_DRAW,
        );
    }

    buffer
}
