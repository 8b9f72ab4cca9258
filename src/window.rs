use std::time::Instant;

use egui::CtxRef;
use egui_backend::{painter::Painter, DpiScaling, EguiStateHandler};
use egui_sdl2_gl::ShaderVersion;
use eyre::{eyre, Result};
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    mouse::MouseButton as SdlMouseButton,
    video::Window,
    video::{GLContext, GLProfile, SwapInterval},
    EventPump, Sdl, VideoSubsystem,
};

use egui_sdl2_gl as egui_backend;

use crate::{
    input::{Key, MouseButton},
    viewer::{MenuItem, ViewerEvent},
};

/// The SDL2 window with its GL context and the egui overlay
pub struct ViewerWindow {
    _sdl_context: Sdl,
    _video_subsystem: VideoSubsystem,
    window: Window,
    _gl_ctx: GLContext,
    event_pump: EventPump,

    pub egui_ctx: CtxRef,
    egui_state: EguiStateHandler,
    painter: Painter,
    start_time: Instant,
}

impl ViewerWindow {
    pub fn new(title: &str, dim: (u32, u32)) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(|e| eyre!("{e}"))?;
        let video_subsystem = sdl_context.video().map_err(|e| eyre!("{e}"))?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_major_version(3);
        gl_attr.set_context_minor_version(3);
        gl_attr.set_context_profile(GLProfile::Core);
        if cfg!(debug_assertions) {
            gl_attr.set_context_flags().debug().set();
        }
        gl_attr.set_double_buffer(true);
        gl_attr.set_depth_size(24);

        let window = video_subsystem
            .window(title, dim.0, dim.1)
            .opengl()
            .resizable()
            .position_centered()
            .allow_highdpi()
            .build()?;

        // Init OpenGL
        let gl_ctx = window.gl_create_context().map_err(|e| eyre!("{e}"))?;
        gl::load_with(|name| video_subsystem.gl_get_proc_address(name) as _);

        window
            .subsystem()
            .gl_set_swap_interval(SwapInterval::VSync)
            .map_err(|e| eyre!("{e}"))?;

        let (painter, egui_state) =
            egui_backend::with_sdl2(&window, ShaderVersion::Default, DpiScaling::Default);
        let egui_ctx = egui::CtxRef::default();
        let event_pump = sdl_context.event_pump().map_err(|e| eyre!("{e}"))?;

        Ok(Self {
            _sdl_context: sdl_context,
            _video_subsystem: video_subsystem,
            window,
            _gl_ctx: gl_ctx,
            event_pump,
            egui_ctx,
            egui_state,
            painter,
            start_time: Instant::now(),
        })
    }

    /// Window size in points
    pub fn size(&self) -> (u32, u32) {
        self.window.size()
    }

    /// Framebuffer size in pixels
    pub fn drawable_size(&self) -> (i32, i32) {
        let (w, h) = self.window.drawable_size();
        (w as i32, h as i32)
    }

    pub fn begin_frame(&mut self) {
        self.egui_state.input.time = Some(self.start_time.elapsed().as_secs_f64());
        self.egui_ctx.begin_frame(self.egui_state.input.take());
    }

    /// Paints the gui on top of the scene, swaps buffers and returns if egui
    /// wants another frame
    pub fn end_frame(&mut self) -> bool {
        let (egui_output, paint_cmds) = self.egui_ctx.end_frame();
        self.egui_state.process_output(&self.window, &egui_output);

        let paint_jobs = self.egui_ctx.tessellate(paint_cmds);
        self.painter
            .paint_jobs(None, paint_jobs, &self.egui_ctx.font_image());
        self.window.gl_swap_window();

        egui_output.needs_repaint
    }

    /// Feeds pending events to egui and translates the rest for the viewer.
    ///
    /// The flag is set if any event arrived at all.
    pub fn poll_events(&mut self) -> (Vec<ViewerEvent>, bool) {
        let wants_pointer = self.egui_ctx.wants_pointer_input();
        let wants_keyboard = self.egui_ctx.wants_keyboard_input();

        let mut events = Vec::new();
        let mut any = false;

        let raw: Vec<Event> = self.event_pump.poll_iter().collect();
        for event in raw {
            any = true;

            if let Some(e) = self.translate(&event, wants_pointer, wants_keyboard) {
                events.push(e);
            }

            self.egui_state
                .process_input(&self.window, event, &mut self.painter);
        }

        (events, any)
    }

    fn translate(
        &self,
        event: &Event,
        wants_pointer: bool,
        wants_keyboard: bool,
    ) -> Option<ViewerEvent> {
        let e = match *event {
            Event::Quit { .. } => ViewerEvent::Menu(MenuItem::Close),
            Event::Window {
                win_event: WindowEvent::SizeChanged(..),
                ..
            } => {
                let (width, height) = self.drawable_size();
                ViewerEvent::Resize {
                    x: 0,
                    y: 0,
                    width,
                    height,
                }
            }
            // Always forwarded so a drag ending over a panel stops
            Event::MouseButtonUp {
                mouse_btn, x, y, ..
            } => ViewerEvent::MouseUp {
                button: mouse_button(mouse_btn),
                x: x as f32,
                y: y as f32,
            },
            _ if wants_pointer && is_pointer_event(event) => return None,
            Event::MouseButtonDown {
                mouse_btn, x, y, ..
            } => ViewerEvent::MouseDown {
                button: mouse_button(mouse_btn),
                x: x as f32,
                y: y as f32,
            },
            Event::MouseMotion { x, y, .. } => ViewerEvent::MouseMove {
                x: x as f32,
                y: y as f32,
            },
            Event::MouseWheel { y, .. } => ViewerEvent::MouseWheel { delta: y as f32 },
            _ if wants_keyboard => return None,
            Event::KeyDown {
                keycode: Some(Keycode::Return),
                ..
            } => ViewerEvent::ModelListKeyPress('\r'),
            Event::KeyDown {
                keycode: Some(keycode),
                ..
            } => ViewerEvent::KeyDown(key(keycode)),
            Event::KeyUp {
                keycode: Some(keycode),
                ..
            } => ViewerEvent::KeyUp(key(keycode)),
            _ => return None,
        };

        Some(e)
    }
}

fn is_pointer_event(event: &Event) -> bool {
    matches!(
        event,
        Event::MouseButtonDown { .. } | Event::MouseMotion { .. } | Event::MouseWheel { .. }
    )
}

fn mouse_button(button: SdlMouseButton) -> MouseButton {
    match button {
        SdlMouseButton::Left => MouseButton::Left,
        SdlMouseButton::Middle => MouseButton::Middle,
        SdlMouseButton::Right => MouseButton::Right,
        _ => MouseButton::Other,
    }
}

fn key(keycode: Keycode) -> Key {
    match keycode {
        Keycode::W => Key::W,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::D => Key::D,
        Keycode::Q => Key::Q,
        Keycode::E => Key::E,
        Keycode::R => Key::R,
        Keycode::Up => Key::Up,
        Keycode::Down => Key::Down,
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        Keycode::Escape => Key::Escape,
        _ => Key::Other,
    }
}
