use std::{
    f32::consts::FRAC_PI_4,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use glam::{Mat4, Vec3};

use crate::{
    camera::Camera,
    input::{Key, MouseButton},
    reader::DirectoryReader,
    renderer::{RenderBackend, DEFAULT_MODEL_SCALE},
};

mod timer;

pub use self::timer::FrameTimer;

pub const APP_NAME: &str = "LOLViewer";

const FIELD_OF_VIEW: f32 = FRAC_PI_4;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;

/// Trackbar units per world scale unit
pub const SCALE_TRACKBAR_UNITS: f32 = 1000.0;
pub const Y_OFFSET_RANGE: RangeInclusive<i32> = -100..=100;
pub const MODEL_SCALE_RANGE: RangeInclusive<i32> = 1..=1000;

/// The folder the user has to pick as the root
pub const ROOT_FOLDER_NAME: &str = "Riot Games";

const READ_ERROR: &str = "Unable to read models. If you installed League of Legends in a \
    non-default location, change the default directory to the 'Riot Games' folder by using \
    the command in the 'Options' menu.";
const WRONG_FOLDER_ERROR: &str = "The 'Riot Games' folder was not selected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Close,
    About,
    ReadModels,
}

/// Everything the window can tell the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// The GL context exists, carries the drawable size
    Load { width: i32, height: i32 },
    Resize { x: i32, y: i32, width: i32, height: i32 },
    Paint,
    Dispose,
    MouseDown { button: MouseButton, x: f32, y: f32 },
    MouseUp { button: MouseButton, x: f32, y: f32 },
    MouseMove { x: f32, y: f32 },
    MouseWheel { delta: f32 },
    KeyDown(Key),
    KeyUp(Key),
    Menu(MenuItem),
    DirectorySelected(PathBuf),
    ModelListSelect(Option<usize>),
    ModelListActivate,
    ModelListKeyPress(char),
    YOffsetScroll(i32),
    ModelScaleScroll(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// A message box the host should display
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub title: String,
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    fn error(text: &str) -> Self {
        Self {
            title: "Error".to_string(),
            text: text.to_string(),
            kind: MessageKind::Error,
        }
    }
}

/// What the viewer asks the window to do
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    Redraw,
    Close,
    ShowMessage(Message),
    /// The user picked a new root which should be remembered
    RootChanged(PathBuf),
}

/// The world transform for the trackbar values: translate down by `y_offset`, then scale
pub fn world_transform(y_offset: i32, scale_value: i32) -> Mat4 {
    let scale = scale_value as f32 / SCALE_TRACKBAR_UNITS;
    let translation = Vec3::new(0., -y_offset as f32, 0.);

    Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(translation)
}

/// Main window controller.
///
/// Translates window events into calls on the renderer, the camera and the
/// directory reader.
pub struct Viewer<R: RenderBackend> {
    loaded: bool,
    timer: FrameTimer,
    camera: Camera,
    renderer: R,
    reader: DirectoryReader,
    model_names: Vec<String>,
    selected: Option<usize>,
    y_offset: i32,
    model_scale: i32,
    commands: Vec<ViewerCommand>,
}

impl<R: RenderBackend> Viewer<R> {
    pub fn new(renderer: R, reader: DirectoryReader) -> Self {
        let mut camera = Camera::new();
        camera.set_view_parameters(Vec3::new(0., 0., 100.), Vec3::ZERO);

        Self {
            loaded: false,
            timer: FrameTimer::new(),
            camera,
            renderer,
            reader,
            model_names: Vec::new(),
            selected: None,
            y_offset: 0,
            model_scale: (DEFAULT_MODEL_SCALE * SCALE_TRACKBAR_UNITS).round() as i32,
            commands: Vec::new(),
        }
    }

    #[allow(unused)]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[allow(unused)]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn root(&self) -> &Path {
        self.reader.root()
    }

    pub fn model_names(&self) -> &[String] {
        &self.model_names
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn y_offset(&self) -> i32 {
        self.y_offset
    }

    pub fn model_scale(&self) -> i32 {
        self.model_scale
    }

    /// Handles one event and returns the commands it produced
    pub fn handle(&mut self, event: ViewerEvent) -> Vec<ViewerCommand> {
        match event {
            ViewerEvent::Load { width, height } => self.on_load(width, height),
            ViewerEvent::Resize {
                x,
                y,
                width,
                height,
            } => self.on_resize(x, y, width, height),
            ViewerEvent::Paint => self.on_paint(),
            ViewerEvent::Dispose => self.renderer.shut_down(),

            ViewerEvent::MouseDown { button, x, y } => {
                self.camera.on_mouse_button_down(button, x, y);
                self.update_frame();
            }
            ViewerEvent::MouseUp { button, x, y } => {
                self.camera.on_mouse_button_up(button, x, y);
                self.update_frame();
            }
            ViewerEvent::MouseMove { x, y } => {
                self.camera.on_mouse_move(x, y);
                self.update_frame();
            }
            ViewerEvent::MouseWheel { delta } => {
                self.camera.on_mouse_wheel(delta);
                self.update_frame();
            }

            ViewerEvent::KeyDown(key) => {
                self.camera.on_key_down(key);
                self.update_frame();

                if key == Key::Escape {
                    self.commands.push(ViewerCommand::Close);
                }
            }
            ViewerEvent::KeyUp(key) => {
                self.camera.on_key_up(key);
                self.update_frame();
            }

            ViewerEvent::Menu(MenuItem::Close) => self.commands.push(ViewerCommand::Close),
            ViewerEvent::Menu(MenuItem::About) => self.on_about(),
            ViewerEvent::Menu(MenuItem::ReadModels) => self.read_models(),
            ViewerEvent::DirectorySelected(path) => self.on_directory_selected(path),

            ViewerEvent::ModelListSelect(index) => {
                self.selected = index.filter(|&i| i < self.model_names.len());
            }
            ViewerEvent::ModelListActivate => self.on_model_activated(),
            ViewerEvent::ModelListKeyPress(c) => {
                if c == '\r' {
                    self.on_model_activated();
                }
            }

            ViewerEvent::YOffsetScroll(value) => {
                self.y_offset = value.clamp(*Y_OFFSET_RANGE.start(), *Y_OFFSET_RANGE.end());
                self.apply_world();
            }
            ViewerEvent::ModelScaleScroll(value) => {
                self.model_scale =
                    value.clamp(*MODEL_SCALE_RANGE.start(), *MODEL_SCALE_RANGE.end());
                self.apply_world();
            }
        }

        std::mem::take(&mut self.commands)
    }

    fn on_load(&mut self, width: i32, height: i32) {
        self.loaded = true;

        self.read_models();

        if let Err(e) = self.renderer.on_load() {
            log::error!("Renderer setup failed: {e:#}");
            self.commands.push(ViewerCommand::Close);
            return;
        }

        // Initial resize to set up the camera and renderer parameters
        self.on_resize(0, 0, width, height);
        self.timer.start();
    }

    fn on_resize(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if !self.loaded {
            return;
        }

        self.camera.set_projection_parameters(
            FIELD_OF_VIEW,
            (width - x) as f32,
            (height - y) as f32,
            NEAR_PLANE,
            FAR_PLANE,
        );
        self.renderer.on_resize(x, y, width, height);

        self.update_frame();
    }

    fn on_paint(&mut self) {
        if !self.loaded {
            return;
        }

        self.renderer.on_render(&self.camera);
    }

    fn update_frame(&mut self) {
        let elapsed = self.timer.elapsed_and_restart();
        self.camera.on_update(elapsed as f32);

        self.commands.push(ViewerCommand::Redraw);
    }

    fn on_about(&mut self) {
        self.commands.push(ViewerCommand::ShowMessage(Message {
            title: "About".to_string(),
            text: format!("{APP_NAME} {}", env!("CARGO_PKG_VERSION")),
            kind: MessageKind::Info,
        }));
    }

    fn on_directory_selected(&mut self, path: PathBuf) {
        let is_root = path
            .file_name()
            .map_or(false, |name| name == ROOT_FOLDER_NAME);

        if !is_root {
            self.commands
                .push(ViewerCommand::ShowMessage(Message::error(WRONG_FOLDER_ERROR)));
            return;
        }

        self.reader.set_root(&path);
        self.commands.push(ViewerCommand::RootChanged(path));

        self.read_models();
    }

    fn read_models(&mut self) {
        if let Err(e) = self.reader.read() {
            log::warn!("{e:#}");
            self.commands
                .push(ViewerCommand::ShowMessage(Message::error(READ_ERROR)));
            return;
        }

        self.model_names = self.reader.model_names();
        self.selected = None;
    }

    fn on_model_activated(&mut self) {
        if let Some(name) = self.selected.and_then(|i| self.model_names.get(i)) {
            match self.reader.get_model(name) {
                Ok(model) => {
                    if let Err(e) = self.renderer.load_model(&model) {
                        log::error!("Couldn't display '{name}': {e:#}");
                    }
                }
                Err(e) => log::error!("{e:#}"),
            }
        }

        self.update_frame();
    }

    fn apply_world(&mut self) {
        self.renderer
            .set_world(world_transform(self.y_offset, self.model_scale));

        self.on_paint();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        f32::consts::FRAC_PI_4,
        fs,
        path::{Path, PathBuf},
    };

    use eyre::{eyre, Result};
    use glam::{Mat4, Vec3, Vec4};
    use tempfile::TempDir;

    use super::{
        world_transform, MenuItem, MessageKind, Viewer, ViewerCommand, ViewerEvent,
    };
    use crate::{
        camera::Camera,
        input::{Key, MouseButton},
        model::{fixtures::triangle_skn, Model},
        reader::DirectoryReader,
        renderer::RenderBackend,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Load,
        Resize(i32, i32, i32, i32),
        Render,
        LoadModel(String),
        ShutDown,
    }

    #[derive(Default)]
    struct FakeRenderer {
        ops: Vec<Op>,
        fail_load: bool,
        fail_model: bool,
        world: Option<Mat4>,
    }

    impl RenderBackend for FakeRenderer {
        fn on_load(&mut self) -> Result<()> {
            self.ops.push(Op::Load);
            if self.fail_load {
                return Err(eyre!("no GL 3.3"));
            }
            Ok(())
        }

        fn on_resize(&mut self, x: i32, y: i32, width: i32, height: i32) {
            self.ops.push(Op::Resize(x, y, width, height));
        }

        fn on_render(&mut self, _camera: &Camera) {
            self.ops.push(Op::Render);
        }

        fn load_model(&mut self, model: &Model) -> Result<()> {
            self.ops.push(Op::LoadModel(model.name.clone()));
            if self.fail_model {
                return Err(eyre!("mesh has no indices"));
            }
            Ok(())
        }

        fn set_world(&mut self, world: Mat4) {
            self.world = Some(world);
        }

        fn world(&self) -> Mat4 {
            self.world.unwrap_or(Mat4::IDENTITY)
        }

        fn shut_down(&mut self) {
            self.ops.push(Op::ShutDown);
        }
    }

    fn riot_games() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Riot Games");
        let chars = characters(&root);
        for champ in ["Annie", "Ashe"] {
            fs::create_dir_all(chars.join(champ)).unwrap();
            fs::write(chars.join(champ).join(format!("{champ}.skn")), triangle_skn()).unwrap();
        }
        (dir, root)
    }

    fn characters(root: &Path) -> PathBuf {
        root.join("League of Legends/game/DATA/Characters")
    }

    fn viewer(root: PathBuf) -> Viewer<FakeRenderer> {
        Viewer::new(FakeRenderer::default(), DirectoryReader::new(root))
    }

    fn loaded() -> (TempDir, Viewer<FakeRenderer>) {
        let (dir, root) = riot_games();
        let mut viewer = viewer(root);
        viewer.handle(ViewerEvent::Load {
            width: 800,
            height: 600,
        });
        (dir, viewer)
    }

    fn messages(commands: &[ViewerCommand]) -> Vec<(MessageKind, String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                ViewerCommand::ShowMessage(m) => Some((m.kind, m.text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn load_reads_models_then_sets_up_renderer() {
        let (_dir, root) = riot_games();
        let mut viewer = viewer(root);

        let commands = viewer.handle(ViewerEvent::Load {
            width: 800,
            height: 600,
        });

        assert!(viewer.is_loaded());
        assert_eq!(viewer.model_names(), &["Annie", "Ashe"]);
        assert_eq!(
            viewer.renderer().ops,
            vec![Op::Load, Op::Resize(0, 0, 800, 600)]
        );
        assert_eq!(commands, vec![ViewerCommand::Redraw]);
        assert_ne!(viewer.camera().projection(), Mat4::IDENTITY);
    }

    #[test]
    fn renderer_failure_closes_window() {
        let (_dir, root) = riot_games();
        let renderer = FakeRenderer {
            fail_load: true,
            ..Default::default()
        };
        let mut viewer = Viewer::new(renderer, DirectoryReader::new(root));

        let commands = viewer.handle(ViewerEvent::Load {
            width: 800,
            height: 600,
        });

        assert_eq!(commands, vec![ViewerCommand::Close]);
        assert_eq!(viewer.renderer().ops, vec![Op::Load]);
    }

    #[test]
    fn missing_models_show_error_but_still_load() {
        let dir = TempDir::new().unwrap();
        let mut viewer = viewer(dir.path().join("Riot Games"));

        let commands = viewer.handle(ViewerEvent::Load {
            width: 800,
            height: 600,
        });

        let msgs = messages(&commands);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].0, MessageKind::Error);
        assert!(msgs[0].1.starts_with("Unable to read models"));
        assert!(viewer.renderer().ops.contains(&Op::Load));
    }

    #[test]
    fn events_before_load_are_ignored() {
        let (_dir, root) = riot_games();
        let mut viewer = viewer(root);

        let commands = viewer.handle(ViewerEvent::Resize {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        });
        viewer.handle(ViewerEvent::Paint);

        assert!(commands.is_empty());
        assert!(viewer.renderer().ops.is_empty());
    }

    #[test]
    fn paint_renders_once_loaded() {
        let (_dir, mut viewer) = loaded();

        let commands = viewer.handle(ViewerEvent::Paint);

        assert!(commands.is_empty());
        assert_eq!(viewer.renderer().ops.last(), Some(&Op::Render));
    }

    #[test]
    fn input_updates_camera_and_requests_redraw() {
        let (_dir, mut viewer) = loaded();
        let eye = viewer.camera().eye();

        assert_eq!(
            viewer.handle(ViewerEvent::MouseDown {
                button: MouseButton::Left,
                x: 0.,
                y: 0.
            }),
            vec![ViewerCommand::Redraw]
        );
        viewer.handle(ViewerEvent::MouseMove { x: 50., y: 0. });
        viewer.handle(ViewerEvent::MouseUp {
            button: MouseButton::Left,
            x: 50.,
            y: 0.,
        });
        assert_ne!(viewer.camera().eye(), eye);

        let radius = viewer.camera().radius();
        assert_eq!(
            viewer.handle(ViewerEvent::MouseWheel { delta: 1. }),
            vec![ViewerCommand::Redraw]
        );
        assert!(viewer.camera().radius() < radius);

        assert_eq!(
            viewer.handle(ViewerEvent::KeyUp(Key::W)),
            vec![ViewerCommand::Redraw]
        );
    }

    #[test]
    fn escape_closes() {
        let (_dir, mut viewer) = loaded();

        let commands = viewer.handle(ViewerEvent::KeyDown(Key::Escape));
        assert_eq!(commands, vec![ViewerCommand::Redraw, ViewerCommand::Close]);

        let commands = viewer.handle(ViewerEvent::Menu(MenuItem::Close));
        assert_eq!(commands, vec![ViewerCommand::Close]);
    }

    #[test]
    fn about_shows_info() {
        let (_dir, mut viewer) = loaded();

        let msgs = messages(&viewer.handle(ViewerEvent::Menu(MenuItem::About)));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].0, MessageKind::Info);
        assert_eq!(msgs[0].1, "LOLViewer 1.0.0");
    }

    #[test]
    fn activating_selection_loads_model() {
        let (_dir, mut viewer) = loaded();

        viewer.handle(ViewerEvent::ModelListSelect(Some(1)));
        let commands = viewer.handle(ViewerEvent::ModelListActivate);

        assert_eq!(commands, vec![ViewerCommand::Redraw]);
        assert_eq!(
            viewer.renderer().ops.last(),
            Some(&Op::LoadModel("Ashe".to_string()))
        );
    }

    #[test]
    fn enter_key_in_list_loads_model() {
        let (_dir, mut viewer) = loaded();
        viewer.handle(ViewerEvent::ModelListSelect(Some(0)));

        viewer.handle(ViewerEvent::ModelListKeyPress('a'));
        assert!(!matches!(viewer.renderer().ops.last(), Some(Op::LoadModel(_))));

        viewer.handle(ViewerEvent::ModelListKeyPress('\r'));
        assert_eq!(
            viewer.renderer().ops.last(),
            Some(&Op::LoadModel("Annie".to_string()))
        );
    }

    #[test]
    fn unreadable_model_is_logged_and_redrawn() {
        let (dir, mut viewer) = loaded();
        let broken = characters(&dir.path().join("Riot Games")).join("Broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("Broken.skn"), b"not a skn file").unwrap();

        viewer.handle(ViewerEvent::Menu(MenuItem::ReadModels));
        assert_eq!(viewer.model_names(), &["Annie", "Ashe", "Broken"]);

        viewer.handle(ViewerEvent::ModelListSelect(Some(2)));
        let before = viewer.renderer().ops.clone();
        let commands = viewer.handle(ViewerEvent::ModelListActivate);

        assert_eq!(commands, vec![ViewerCommand::Redraw]);
        assert_eq!(viewer.renderer().ops, before);
        assert_eq!(viewer.selected(), Some(2));
        assert_eq!(viewer.model_names().len(), 3);
    }

    #[test]
    fn renderer_rejecting_model_is_logged_and_redrawn() {
        let (_dir, root) = riot_games();
        let renderer = FakeRenderer {
            fail_model: true,
            ..Default::default()
        };
        let mut viewer = Viewer::new(renderer, DirectoryReader::new(root));
        viewer.handle(ViewerEvent::Load {
            width: 800,
            height: 600,
        });

        viewer.handle(ViewerEvent::ModelListSelect(Some(0)));
        let commands = viewer.handle(ViewerEvent::ModelListActivate);

        assert_eq!(commands, vec![ViewerCommand::Redraw]);
        assert_eq!(
            viewer.renderer().ops.last(),
            Some(&Op::LoadModel("Annie".to_string()))
        );
        assert_eq!(viewer.selected(), Some(0));
    }

    #[test]
    fn resize_projects_the_offset_rectangle() {
        let (_dir, mut viewer) = loaded();

        let commands = viewer.handle(ViewerEvent::Resize {
            x: 100,
            y: 50,
            width: 1100,
            height: 650,
        });

        assert_eq!(commands, vec![ViewerCommand::Redraw]);
        assert_eq!(
            viewer.renderer().ops.last(),
            Some(&Op::Resize(100, 50, 1100, 650))
        );
        assert_eq!(
            viewer.camera().projection(),
            Mat4::perspective_rh_gl(FRAC_PI_4, 1000. / 600., 0.1, 1000.)
        );
    }

    #[test]
    fn activating_without_selection_only_redraws() {
        let (_dir, mut viewer) = loaded();
        viewer.handle(ViewerEvent::ModelListSelect(Some(42)));
        assert_eq!(viewer.selected(), None);

        let before = viewer.renderer().ops.len();
        let commands = viewer.handle(ViewerEvent::ModelListActivate);

        assert_eq!(commands, vec![ViewerCommand::Redraw]);
        assert_eq!(viewer.renderer().ops.len(), before);
    }

    #[test]
    fn selecting_another_root_requires_riot_games_folder() {
        let (_dir, mut viewer) = loaded();
        let other = TempDir::new().unwrap();

        let commands = viewer.handle(ViewerEvent::DirectorySelected(other.path().to_path_buf()));

        let msgs = messages(&commands);
        assert_eq!(msgs, vec![(MessageKind::Error, super::WRONG_FOLDER_ERROR.to_string())]);
        assert_eq!(viewer.model_names().len(), 2);
    }

    #[test]
    fn selecting_new_root_rereads_models() {
        let (_dir, mut viewer) = loaded();
        let (_other_dir, other_root) = riot_games();
        let extra = characters(&other_root).join("Teemo");
        fs::create_dir_all(&extra).unwrap();
        fs::write(extra.join("Teemo.skn"), triangle_skn()).unwrap();

        viewer.handle(ViewerEvent::ModelListSelect(Some(0)));
        let commands = viewer.handle(ViewerEvent::DirectorySelected(other_root.clone()));

        assert_eq!(commands, vec![ViewerCommand::RootChanged(other_root.clone())]);
        assert_eq!(viewer.root(), other_root);
        assert_eq!(viewer.model_names(), &["Annie", "Ashe", "Teemo"]);
        assert_eq!(viewer.selected(), None);
    }

    #[test]
    fn trackbars_set_world_and_repaint() {
        let (_dir, mut viewer) = loaded();

        viewer.handle(ViewerEvent::YOffsetScroll(50));
        viewer.handle(ViewerEvent::ModelScaleScroll(500));

        assert_eq!(viewer.renderer().world(), world_transform(50, 500));
        assert_eq!(viewer.renderer().ops.last(), Some(&Op::Render));
    }

    #[test]
    fn trackbar_values_are_clamped() {
        let (_dir, mut viewer) = loaded();

        viewer.handle(ViewerEvent::YOffsetScroll(1000));
        viewer.handle(ViewerEvent::ModelScaleScroll(0));

        assert_eq!(viewer.y_offset(), 100);
        assert_eq!(viewer.model_scale(), 1);
    }

    #[test]
    fn world_translates_before_scaling() {
        let world = world_transform(50, 500);
        let p = world * Vec4::new(0., 50., 0., 1.);

        assert!(p.truncate().abs_diff_eq(Vec3::ZERO, 1e-5));

        let p = world * Vec4::new(2., 0., 0., 1.);
        assert!(p.truncate().abs_diff_eq(Vec3::new(1., -25., 0.), 1e-5));
    }

    #[test]
    fn default_scale_trackbar_matches_renderer() {
        let (_dir, viewer) = loaded();
        assert_eq!(viewer.model_scale(), 110);
    }

    #[test]
    fn dispose_shuts_renderer_down() {
        let (_dir, mut viewer) = loaded();

        viewer.handle(ViewerEvent::Dispose);
        assert_eq!(viewer.renderer().ops.last(), Some(&Op::ShutDown));
    }
}
