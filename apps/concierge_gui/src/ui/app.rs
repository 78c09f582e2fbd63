//! Application shell: owns the document, the router, the modal and the five
//! feature orchestrators, and applies backend events once per frame.

use std::time::Duration;

use client_core::ApiError;
use crossbeam_channel::{Receiver, Sender};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiError, UiEvent},
        features::{AskFeature, MocFeature, MoveFeature, SearchFeature, TagFeature},
        orchestration::{dispatch_backend_command, refused_outcome, Orchestrator, RequestStatus},
        router::Router,
    },
    ui::{
        document::{Document, NodeId},
        layout::build_document,
        modal::{Key, KeyDisposition, KeyPress, Modal},
        registry::{ElementRegistry, RegistryError},
        render,
    },
};

/// Interaction reported by the renderer against a document node.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Click(NodeId),
    Input { node: NodeId, value: String },
    Toggle { node: NodeId, checked: bool },
    Focus(NodeId),
}

pub struct ConciergeApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    doc: Document,
    registry: ElementRegistry,
    router: Router,
    modal: Modal,

    search: Orchestrator<SearchFeature>,
    ask: Orchestrator<AskFeature>,
    mover: Orchestrator<MoveFeature>,
    moc: Orchestrator<MocFeature>,
    tag: Orchestrator<TagFeature>,

    status: Option<UiError>,
}

impl ConciergeApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        initial_fragment: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let mut doc = build_document();
        if let Some(fragment) = initial_fragment {
            doc.set_location_hash(fragment);
        }
        let registry = ElementRegistry::locate(&doc)?;
        let router = Router::new(&registry);
        let modal = Modal::new(registry.modal);

        let mut app = Self {
            cmd_tx,
            ui_rx,
            search: Orchestrator::new(SearchFeature::new(registry.search)),
            ask: Orchestrator::new(AskFeature::new(registry.ask)),
            mover: Orchestrator::new(MoveFeature::new(registry.mover)),
            moc: Orchestrator::new(MocFeature::new(registry.moc)),
            tag: Orchestrator::new(TagFeature::new(registry.tag)),
            doc,
            registry,
            router,
            modal,
            status: None,
        };
        app.router.sync_from_location(&mut app.doc);
        app.queue(Some(BackendCommand::HealthCheck));
        Ok(app)
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[cfg(test)]
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<&UiError> {
        self.status.as_ref()
    }

    #[cfg(test)]
    pub fn modal_is_open(&self) -> bool {
        self.modal.is_open()
    }

    fn has_request_in_flight(&self) -> bool {
        [
            self.search.state().status(),
            self.ask.state().status(),
            self.mover.state().status(),
            self.moc.state().status(),
            self.tag.state().status(),
        ]
        .contains(&RequestStatus::Loading)
    }

    /// Work deferred to the start of a frame: queued focus moves, location
    /// changes and backend results.
    pub fn on_frame(&mut self) {
        self.doc.run_frame();
        if self.doc.take_hash_change() {
            self.router.sync_from_location(&mut self.doc);
        }
        self.process_ui_events();
    }

    pub fn handle_key(&mut self, press: KeyPress) -> KeyDisposition {
        self.modal.handle_key(&mut self.doc, press)
    }

    pub fn dispatch(&mut self, event: DomEvent) {
        match event {
            DomEvent::Click(node) => self.on_click(node),
            DomEvent::Input { node, value } => self.doc.set_value(node, value),
            DomEvent::Toggle { node, checked } => self.on_toggle(node, checked),
            DomEvent::Focus(node) => self.doc.focus(node),
        }
    }

    fn on_click(&mut self, node: NodeId) {
        let reachable =
            !self.modal.is_open() || self.doc.is_within(node, self.registry.modal.content);
        if reachable && self.doc.is_focusable(node) {
            self.doc.focus(node);
        }
        if self.modal.is_open() {
            // Only the dialog is interactive while it is open.
            if !self.modal.handle_click(&mut self.doc, node) {
                tracing::trace!("click inside open dialog");
            }
            return;
        }

        if let Some(page) = self.router.nav_target(node).cloned() {
            self.router.navigate_to(&mut self.doc, &page);
            return;
        }

        if node == self.registry.search.submit {
            let cmd = self.search.submit(&mut self.doc);
            self.queue(cmd);
        } else if node == self.registry.search.add_tag_button {
            self.search.feature_mut().add_filter_tag(&mut self.doc);
        } else if node == self.registry.ask.submit {
            let cmd = self.ask.submit(&mut self.doc);
            self.queue(cmd);
        } else if node == self.registry.mover.submit {
            let cmd = self.mover.submit(&mut self.doc);
            self.queue(cmd);
        } else if node == self.registry.moc.submit {
            let cmd = self.moc.submit(&mut self.doc);
            self.queue(cmd);
        } else if node == self.registry.moc.preview_button {
            self.open_moc_preview();
        } else if node == self.registry.tag.submit {
            let cmd = self.tag.submit(&mut self.doc);
            self.queue(cmd);
        } else if self.search.feature_mut().remove_filter_tag(&mut self.doc, node)
            || self.tag.feature_mut().remove_applied_tag(&mut self.doc, node)
        {
            tracing::debug!("tag chip removed");
        } else if self.ask.feature().apply_followup(&mut self.doc, node) {
            let cmd = self.ask.submit(&mut self.doc);
            self.queue(cmd);
        }
    }

    fn on_toggle(&mut self, node: NodeId, checked: bool) {
        self.doc.set_checked(node, checked);
        let search = &self.registry.search;
        let ask = &self.registry.ask;
        let mover = &self.registry.mover;
        let moc = &self.registry.moc;
        let tag = &self.registry.tag;

        if node == search.filter_toggle {
            self.search
                .feature()
                .set_filter_panel_visible(&mut self.doc, checked);
        } else if node == ask.options_toggle {
            self.ask.feature().set_options_visible(&mut self.doc, checked);
        } else if node == mover.analyze_mode || node == mover.manual_mode {
            self.mover.feature().sync_mode(&mut self.doc);
        } else if [moc.topic_mode, moc.folder_mode, moc.tag_mode].contains(&node) {
            self.moc.feature().sync_mode(&mut self.doc);
        } else if node == tag.analyze_mode || node == tag.manual_mode {
            self.tag.feature().sync_mode(&mut self.doc);
        }
    }

    fn open_moc_preview(&mut self) {
        let Some(markup) = self.moc.feature().preview_markup() else {
            tracing::debug!("no generated MOC to preview yet");
            return;
        };
        self.modal.set_content(&mut self.doc, markup);
        self.modal.open(&mut self.doc);
    }

    fn queue(&mut self, cmd: Option<BackendCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        if let Some(refused) = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            let reason = self
                .status
                .as_ref()
                .map(|err| err.message().to_string())
                .unwrap_or_else(|| "backend command was not queued".to_string());
            if let Some(event) = refused_outcome(refused, ApiError::transport(reason)) {
                self.apply_ui_event(event);
            }
        }
        self.render_status();
    }

    fn set_status(&mut self, status: UiError) {
        self.status = Some(status);
        self.render_status();
    }

    fn render_status(&mut self) {
        let banner = self.registry.status_banner;
        match &self.status {
            Some(err) => {
                self.doc.set_text(banner, err.message().to_string());
                self.doc.show(banner);
            }
            None => self.doc.hide(banner),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_ui_event(event);
        }
    }

    fn apply_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Error(err) => {
                tracing::error!(
                    context = ?err.context(),
                    category = ?err.category(),
                    "{}",
                    err.message()
                );
                self.set_status(err);
            }
            UiEvent::HealthChecked { healthy } => {
                if healthy {
                    tracing::info!("api health check passed");
                } else {
                    tracing::warn!("api health check failed");
                    self.set_status(UiError::api_unreachable());
                }
            }
            UiEvent::SearchResolved { token, outcome } => {
                self.search.resolve(&mut self.doc, token, outcome);
            }
            UiEvent::AskResolved { token, outcome } => {
                self.ask.resolve(&mut self.doc, token, outcome);
            }
            UiEvent::MoveResolved { token, outcome } => {
                self.mover.resolve(&mut self.doc, token, outcome);
            }
            UiEvent::MocResolved { token, outcome } => {
                self.moc.resolve(&mut self.doc, token, outcome);
            }
            UiEvent::TagResolved { token, outcome } => {
                self.tag.resolve(&mut self.doc, token, outcome);
            }
        }
    }
}

fn key_press(key: egui::Key, modifiers: egui::Modifiers) -> KeyPress {
    let key = match key {
        egui::Key::Escape => Key::Escape,
        egui::Key::Tab => Key::Tab,
        egui::Key::Enter => Key::Enter,
        _ => Key::Other,
    };
    KeyPress::new(key, modifiers.shift)
}

impl eframe::App for ConciergeApp {
    fn raw_input_hook(&mut self, _ctx: &egui::Context, raw_input: &mut egui::RawInput) {
        if !self.modal.is_open() {
            return;
        }
        raw_input.events.retain(|event| match event {
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                self.handle_key(key_press(*key, *modifiers)) == KeyDisposition::Default
            }
            _ => true,
        });
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.on_frame();
        let push_focus = self.doc.take_focus_change();
        for event in render::show(ctx, &self.doc, push_focus) {
            self.dispatch(event);
        }
        // Backend results do not wake the window; poll faster while one is due.
        let poll = if self.has_request_in_flight() {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(250)
        };
        ctx.request_repaint_after(poll);
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
