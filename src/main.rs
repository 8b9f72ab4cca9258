use std::{thread, time::Duration};

use eyre::Result;
use gui::Gui;
use reader::DirectoryReader;
use renderer::Renderer;
use settings::Settings;
use viewer::{Viewer, ViewerCommand, ViewerEvent, APP_NAME};
use window::ViewerWindow;

mod camera;
mod gui;
mod input;
mod model;
mod ogl;
mod reader;
mod renderer;
mod settings;
mod viewer;
mod window;

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let settings = Settings::load();

    let title = format!("{APP_NAME} {}", env!("CARGO_PKG_VERSION"));
    let mut window = ViewerWindow::new(&title, (settings.window_width, settings.window_height))?;

    ogl::init_debug();

    let reader = DirectoryReader::new(&settings.root_dir);
    let mut viewer = Viewer::new(Renderer::new(), reader);
    let mut app = App {
        gui: Gui::new(),
        settings,
        dirty: true,
        running: true,
    };

    let (width, height) = window.drawable_size();
    app.dispatch(&mut viewer, ViewerEvent::Load { width, height });

    'render_loop: while app.running {
        let (events, any_input) = window.poll_events();
        for event in events {
            app.dispatch(&mut viewer, event);
            if !app.running {
                break 'render_loop;
            }
        }

        if !app.dirty && !any_input {
            thread::sleep(Duration::from_millis(10));
            continue;
        }
        app.dirty = false;

        window.begin_frame();
        app.dispatch(&mut viewer, ViewerEvent::Paint);

        for event in app.gui.show(&window.egui_ctx, &viewer) {
            app.dispatch(&mut viewer, event);
        }

        if window.end_frame() {
            app.dirty = true;
        }
    }

    viewer.handle(ViewerEvent::Dispose);

    let (width, height) = window.size();
    app.settings.window_width = width;
    app.settings.window_height = height;
    if let Err(e) = app.settings.save() {
        log::warn!("{e:#}");
    }

    Ok(())
}

/// Executes the commands the viewer produces
struct App {
    gui: Gui,
    settings: Settings,
    /// A new frame has to be drawn
    dirty: bool,
    running: bool,
}

impl App {
    fn dispatch(&mut self, viewer: &mut Viewer<Renderer>, event: ViewerEvent) {
        for command in viewer.handle(event) {
            match command {
                ViewerCommand::Redraw => self.dirty = true,
                ViewerCommand::Close => self.running = false,
                ViewerCommand::ShowMessage(message) => {
                    self.gui.push_message(message);
                    self.dirty = true;
                }
                ViewerCommand::RootChanged(root) => {
                    log::info!("Model root set to '{}'", root.display());
                    self.settings.root_dir = root;
                    if let Err(e) = self.settings.save() {
                        log::warn!("{e:#}");
                    }
                }
            }
        }
    }
}
