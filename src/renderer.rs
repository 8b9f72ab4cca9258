use eyre::{Result, WrapErr};
use glam::{Mat4, Vec3, Vec4};

use crate::{
    camera::Camera,
    model::Model,
    ogl::{
        self,
        api::{GlApi, NativeGl},
        program::ShaderProgram,
        shader::{Shader, ShaderKind},
    },
};

mod mesh;

use self::mesh::GpuMesh;

/// Models are authored in large units, this makes them fit the default camera
pub const DEFAULT_MODEL_SCALE: f32 = 0.11;

const VS_SRC: &str = include_str!("../shaders/model.vert");
const FS_SRC: &str = include_str!("../shaders/model.frag");

const ATTRIBUTES: [(u32, &str); 3] = [
    (ogl::POS_INDEX, "in_position"),
    (ogl::NORMALS_INDEX, "in_normal"),
    (ogl::TEXCOORDS_INDEX, "in_texcoord"),
];

const U_WORLD: &str = "u_world";
const U_VIEW: &str = "u_view";
const U_PROJECTION: &str = "u_projection";
const U_LIGHT_DIRECTION: &str = "u_light_direction";
const U_BASE_COLOR: &str = "u_base_color";

/// What the window controller needs from a renderer
pub trait RenderBackend {
    /// Sets up GPU state. Requires a current GL context.
    fn on_load(&mut self) -> Result<()>;
    fn on_resize(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn on_render(&mut self, camera: &Camera);
    /// Replaces the displayed model
    fn load_model(&mut self, model: &Model) -> Result<()>;
    fn set_world(&mut self, world: Mat4);
    fn world(&self) -> Mat4;
    fn shut_down(&mut self);
}

/// The OpenGL renderer
pub struct Renderer {
    program: ShaderProgram<NativeGl>,
    shaders: Vec<Shader>,
    mesh: Option<GpuMesh>,
    world: Mat4,
    viewport: (i32, i32, i32, i32),
    base_color: Vec4,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            program: ShaderProgram::new(NativeGl),
            shaders: Vec::new(),
            mesh: None,
            world: Mat4::from_scale(Vec3::splat(DEFAULT_MODEL_SCALE)),
            viewport: (0, 0, 1, 1),
            base_color: Vec4::new(0.85, 0.8, 0.75, 1.),
        }
    }

    fn create_program(&mut self) -> Result<()> {
        let vs = Shader::compile(&NativeGl, ShaderKind::Vertex, VS_SRC)?;
        self.shaders.push(vs);
        let fs = Shader::compile(&NativeGl, ShaderKind::Fragment, FS_SRC)?;
        self.shaders.push(fs);

        self.program.create()?;
        for shader in &self.shaders {
            self.program.attach_shader(shader)?;
        }

        for (location, name) in ATTRIBUTES {
            self.program.bind_attribute(location, name)?;
        }

        self.program.link()?;
        log::debug!("Model shader program {} linked", self.program.id());

        // A uniform the driver optimized out is not fatal, updating it just fails later
        for name in [U_WORLD, U_VIEW, U_PROJECTION, U_LIGHT_DIRECTION, U_BASE_COLOR] {
            if let Err(e) = self.program.set_uniform_location(name) {
                log::warn!("{e}");
            }
        }

        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Uploads the per-frame uniforms. A uniform that fails is logged and
/// doesn't keep the others from being uploaded.
fn upload_uniforms<A: GlApi>(
    program: &ShaderProgram<A>,
    world: Mat4,
    camera: &Camera,
    base_color: Vec4,
) {
    // Headlight: the light comes from the camera
    let light_dir = (camera.eye() - camera.target()).normalize_or_zero();

    let results = [
        (U_WORLD, program.update_uniform(U_WORLD, world)),
        (U_VIEW, program.update_uniform(U_VIEW, camera.view())),
        (U_PROJECTION, program.update_uniform(U_PROJECTION, camera.projection())),
        (U_LIGHT_DIRECTION, program.update_uniform(U_LIGHT_DIRECTION, light_dir)),
        (U_BASE_COLOR, program.update_uniform(U_BASE_COLOR, base_color)),
    ];

    for (name, result) in results {
        if let Err(e) = result {
            log::debug!("Skipped uniform '{name}': {e:#}");
        }
    }
}

impl RenderBackend for Renderer {
    fn on_load(&mut self) -> Result<()> {
        unsafe {
            gl::ClearColor(0.1, 0.1, 0.1, 1.0);
        }

        self.create_program()
            .wrap_err("Couldn't create the model shader program")
    }

    fn on_resize(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = (x, y, width.max(1), height.max(1));
    }

    fn on_render(&mut self, camera: &Camera) {
        let (x, y, width, height) = self.viewport;

        unsafe {
            gl::Viewport(x, y, width, height);
            gl::Enable(gl::DEPTH_TEST);
            gl::Enable(gl::CULL_FACE);
            gl::CullFace(gl::BACK);
            gl::FrontFace(gl::CCW);
            gl::Disable(gl::BLEND);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }

        if let Some(mesh) = &self.mesh {
            match self.program.use_program() {
                Ok(()) => {
                    upload_uniforms(&self.program, self.world, camera, self.base_color);
                    mesh.draw();
                }
                Err(e) => log::error!("{e:#}"),
            }
        }

        unsafe {
            // Otherwise egui doesn't render correctly
            gl::Disable(gl::DEPTH_TEST);
            gl::Disable(gl::CULL_FACE);
            gl::UseProgram(0);
        }
    }

    fn load_model(&mut self, model: &Model) -> Result<()> {
        let mesh = GpuMesh::from_model(model)?;

        if let Some(old) = self.mesh.replace(mesh) {
            old.delete();
        }

        log::info!(
            "Loaded model '{}' ({} triangles, {} materials)",
            model.name,
            model.triangle_count(),
            model.materials.len()
        );
        if let Some((min, max)) = model.bounds() {
            log::debug!("Model bounds: {min} .. {max}");
        }
        Ok(())
    }

    fn set_world(&mut self, world: Mat4) {
        self.world = world;
    }

    fn world(&self) -> Mat4 {
        self.world
    }

    fn shut_down(&mut self) {
        if let Some(mesh) = self.mesh.take() {
            mesh.delete();
        }

        self.program.destroy();
        for shader in self.shaders.drain(..) {
            shader.delete(&NativeGl);
        }
    }
}
