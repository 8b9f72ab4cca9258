use std::collections::VecDeque;

use egui::{Color32, CtxRef, RichText, ScrollArea, Slider};

use crate::{
    renderer::RenderBackend,
    viewer::{
        MenuItem, Message, MessageKind, Viewer, ViewerEvent, MODEL_SCALE_RANGE, Y_OFFSET_RANGE,
    },
};

/// Widgets around the 3D view. Widget interactions are returned as viewer
/// events instead of being applied directly.
#[derive(Default)]
pub struct Gui {
    /// Message boxes waiting to be acknowledged, oldest first
    messages: VecDeque<Message>,
    /// Text of the open 'Set Directory' dialog
    directory_input: Option<String>,
}

impl Gui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push_back(message);
    }

    pub fn show<R: RenderBackend>(
        &mut self,
        ctx: &CtxRef,
        viewer: &Viewer<R>,
    ) -> Vec<ViewerEvent> {
        let mut events = Vec::new();

        self.menu_bar(ctx, viewer, &mut events);
        self.side_panel(ctx, viewer, &mut events);
        self.directory_dialog(ctx, &mut events);
        self.message_box(ctx);

        events
    }

    fn menu_bar<R: RenderBackend>(
        &mut self,
        ctx: &CtxRef,
        viewer: &Viewer<R>,
        events: &mut Vec<ViewerEvent>,
    ) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Close").clicked() {
                        events.push(ViewerEvent::Menu(MenuItem::Close));
                    }
                });

                ui.menu_button("Options", |ui| {
                    if ui.button("Set Directory...").clicked() {
                        self.directory_input = Some(viewer.root().display().to_string());
                    }

                    if ui.button("Read Models").clicked() {
                        events.push(ViewerEvent::Menu(MenuItem::ReadModels));
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        events.push(ViewerEvent::Menu(MenuItem::About));
                    }
                });
            });
        });
    }

    fn side_panel<R: RenderBackend>(
        &self,
        ctx: &CtxRef,
        viewer: &Viewer<R>,
        events: &mut Vec<ViewerEvent>,
    ) {
        egui::SidePanel::left("model_panel").show(ctx, |ui| {
            ui.add(egui::Label::new(RichText::new("Models").heading().strong()));
            ui.label(format!("{} found", viewer.model_names().len()));
            ui.separator();

            ScrollArea::vertical()
                .max_height((ui.available_height() - 120.).max(100.))
                .show(ui, |ui| {
                    for (i, name) in viewer.model_names().iter().enumerate() {
                        let is_selected = viewer.selected() == Some(i);
                        let response = ui.selectable_label(is_selected, name.as_str());

                        if response.clicked() {
                            events.push(ViewerEvent::ModelListSelect(Some(i)));
                        }

                        if response.double_clicked() {
                            events.push(ViewerEvent::ModelListSelect(Some(i)));
                            events.push(ViewerEvent::ModelListActivate);
                        }
                    }
                });

            ui.separator();

            ui.label(format!("Camera distance: {:.0}", viewer.camera().radius()));

            let mut y_offset = viewer.y_offset();
            if ui
                .add(Slider::new(&mut y_offset, Y_OFFSET_RANGE).text("Y offset"))
                .changed()
            {
                events.push(ViewerEvent::YOffsetScroll(y_offset));
            }

            let mut model_scale = viewer.model_scale();
            if ui
                .add(Slider::new(&mut model_scale, MODEL_SCALE_RANGE).text("Model scale"))
                .changed()
            {
                events.push(ViewerEvent::ModelScaleScroll(model_scale));
            }
        });
    }

    fn directory_dialog(&mut self, ctx: &CtxRef, events: &mut Vec<ViewerEvent>) {
        let Some(input) = &mut self.directory_input else {
            return;
        };

        let mut close = false;

        egui::Window::new("Set Directory")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Select the 'Riot Games' folder.");
                ui.text_edit_singleline(input);

                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        events.push(ViewerEvent::DirectorySelected(input.trim().into()));
                        close = true;
                    }

                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.directory_input = None;
        }
    }

    fn message_box(&mut self, ctx: &CtxRef) {
        let Some(message) = self.messages.front() else {
            return;
        };

        let mut acknowledged = false;

        egui::Window::new(message.title.as_str())
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let text = RichText::new(message.text.as_str());
                match message.kind {
                    MessageKind::Info => ui.label(text),
                    MessageKind::Error => ui.label(text.color(Color32::LIGHT_RED)),
                };

                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });

        if acknowledged {
            self.messages.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Gui;
    use crate::viewer::{Message, MessageKind};

    fn message(text: &str) -> Message {
        Message {
            title: "Error".to_string(),
            text: text.to_string(),
            kind: MessageKind::Error,
        }
    }

    #[test]
    fn starts_with_nothing_open() {
        let gui = Gui::new();

        assert!(gui.messages.is_empty());
        assert!(gui.directory_input.is_none());
    }

    #[test]
    fn messages_queue_oldest_first() {
        let mut gui = Gui::default();
        gui.push_message(message("first"));
        gui.push_message(message("second"));

        assert_eq!(gui.messages.front().map(|m| m.text.as_str()), Some("first"));
        assert_eq!(gui.messages.len(), 2);
    }
}
