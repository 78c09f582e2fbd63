//! egui rendering of the document tree. Widgets never mutate the document
//! directly; every interaction comes back as a [`DomEvent`].

use egui::scroll_area::ScrollSource;

use crate::ui::{
    app::DomEvent,
    document::{Document, NodeId, NodeKind},
    layout::{ACTIVE_CLASS, MODAL_BACKDROP_CLASS},
    tags::TAG_CLASS,
};

const ROW_CLASSES: [&str; 5] = ["nav", "field", "tag-list", TAG_CLASS, "modal-header"];

struct Renderer<'a> {
    doc: &'a Document,
    push_focus: bool,
    events: Vec<DomEvent>,
}

impl Renderer<'_> {
    fn is_row(&self, node: NodeId) -> bool {
        ROW_CLASSES.iter().any(|class| self.doc.has_class(node, class))
    }

    fn children(&mut self, ui: &mut egui::Ui, node: NodeId) {
        let doc = self.doc;
        for child in doc.children(node) {
            self.node(ui, *child);
        }
    }

    fn track(&mut self, node: NodeId, response: &egui::Response) {
        if self.push_focus && self.doc.active_element() == Some(node) {
            response.request_focus();
        }
        if response.gained_focus() {
            self.events.push(DomEvent::Focus(node));
        }
    }

    fn node(&mut self, ui: &mut egui::Ui, node: NodeId) {
        let doc = self.doc;
        if doc.is_hidden(node) {
            return;
        }
        let Some(kind) = doc.kind(node) else {
            return;
        };
        let text = doc.text(node);

        ui.push_id(node, |ui| match kind {
            NodeKind::Container => {
                let row = self.is_row(node);
                let body = |ui: &mut egui::Ui, renderer: &mut Self| {
                    if !text.is_empty() {
                        ui.label(text);
                    }
                    renderer.children(ui, node);
                };
                if row {
                    ui.horizontal_wrapped(|ui| body(ui, self));
                } else {
                    ui.vertical(|ui| body(ui, self));
                }
            }
            NodeKind::Heading => {
                ui.heading(text);
            }
            NodeKind::Paragraph => {
                if doc.dom_id(node) == Some("status-banner") {
                    ui.colored_label(ui.visuals().warn_fg_color, text);
                } else if doc.children(node).is_empty() {
                    ui.label(text);
                } else {
                    ui.horizontal_wrapped(|ui| {
                        if !text.is_empty() {
                            ui.label(text);
                        }
                        self.children(ui, node);
                    });
                }
            }
            NodeKind::Span => {
                ui.label(text);
            }
            NodeKind::Strong => {
                ui.label(egui::RichText::new(text).strong());
            }
            NodeKind::LineBreak => {}
            NodeKind::Button => {
                let response = ui.button(text);
                self.track(node, &response);
                if response.clicked() {
                    self.events.push(DomEvent::Click(node));
                }
            }
            NodeKind::Link => {
                let response = ui.selectable_label(doc.has_class(node, ACTIVE_CLASS), text);
                self.track(node, &response);
                if response.clicked() {
                    self.events.push(DomEvent::Click(node));
                }
            }
            NodeKind::TextInput | NodeKind::TextArea => {
                let mut value = doc.value(node).to_string();
                let edit = if matches!(kind, NodeKind::TextArea) {
                    egui::TextEdit::multiline(&mut value)
                } else {
                    egui::TextEdit::singleline(&mut value)
                };
                let response = ui.add(edit.id(egui::Id::new(node)));
                self.track(node, &response);
                if response.changed() {
                    self.events.push(DomEvent::Input { node, value });
                }
            }
            NodeKind::Checkbox => {
                let mut checked = doc.is_checked(node);
                let response = ui.checkbox(&mut checked, text);
                self.track(node, &response);
                if response.changed() {
                    self.events.push(DomEvent::Toggle { node, checked });
                }
            }
            NodeKind::Radio { .. } => {
                let response = ui.radio(doc.is_checked(node), text);
                self.track(node, &response);
                if response.clicked() && !doc.is_checked(node) {
                    self.events.push(DomEvent::Toggle {
                        node,
                        checked: true,
                    });
                }
            }
            NodeKind::Range { min, max } => {
                let mut value: i32 = doc.value(node).parse().unwrap_or(*min);
                let response = ui.add(egui::Slider::new(&mut value, *min..=*max));
                self.track(node, &response);
                if response.changed() {
                    self.events.push(DomEvent::Input {
                        node,
                        value: value.to_string(),
                    });
                }
            }
        });
    }
}

/// Draws one frame of `doc` and returns the interactions it produced.
/// `push_focus` moves widget focus to the document's active element.
pub fn show(ctx: &egui::Context, doc: &Document, push_focus: bool) -> Vec<DomEvent> {
    let mut renderer = Renderer {
        doc,
        push_focus,
        events: Vec::new(),
    };
    let backdrop = doc
        .with_class(doc.root(), MODAL_BACKDROP_CLASS)
        .first()
        .copied();

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .scroll_source(if doc.is_scroll_locked() {
                ScrollSource::NONE
            } else {
                ScrollSource::ALL
            })
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for child in doc.children(doc.root()) {
                    if Some(*child) != backdrop {
                        renderer.node(ui, *child);
                    }
                }
            });
    });

    if let Some(backdrop) = backdrop.filter(|node| !doc.is_hidden(*node)) {
        let modal = egui::Modal::new(egui::Id::new("moc-preview-modal"))
            .show(ctx, |ui| renderer.children(ui, backdrop));
        if modal.backdrop_response.clicked() {
            renderer.events.push(DomEvent::Click(backdrop));
        }
    }

    renderer.events
}
