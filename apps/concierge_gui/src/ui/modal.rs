//! Accessible dialog with a focus trap.
//!
//! The dialog is created once and reused. Each `open` captures the element that
//! had focus; the matching `close` hands focus back to it exactly once.

use crate::ui::{
    document::{Document, Markup, NodeId},
    layout::MODAL_CLOSE_CLASS,
    registry::ModalElements,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key, shift: bool) -> Self {
        Self { key, shift }
    }

    #[cfg(test)]
    pub fn escape() -> Self {
        Self::new(Key::Escape, false)
    }

    #[cfg(test)]
    pub fn tab() -> Self {
        Self::new(Key::Tab, false)
    }

    #[cfg(test)]
    pub fn shift_tab() -> Self {
        Self::new(Key::Tab, true)
    }
}

/// Whether the default action of a key press should still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Default,
    Prevented,
}

#[derive(Debug, Default, Clone)]
pub struct ModalState {
    is_open: bool,
    prior_focus: Option<NodeId>,
    focusable: Vec<NodeId>,
}

impl ModalState {
    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[cfg(test)]
    pub fn prior_focus(&self) -> Option<NodeId> {
        self.prior_focus
    }

    #[cfg(test)]
    pub fn focusable(&self) -> &[NodeId] {
        &self.focusable
    }
}

#[derive(Debug)]
pub struct Modal {
    elements: ModalElements,
    state: ModalState,
}

impl Modal {
    pub fn new(elements: ModalElements) -> Self {
        Self {
            elements,
            state: ModalState::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn open(&mut self, doc: &mut Document) {
        if self.state.is_open {
            return;
        }
        self.state.is_open = true;
        self.state.prior_focus = doc.active_element();
        doc.show(self.elements.backdrop);
        doc.set_scroll_locked(true);
        self.state.focusable = doc.focusable_within(self.elements.content);
        if let Some(first) = self.state.focusable.first() {
            doc.request_focus(*first);
        }
        tracing::debug!(focusable = self.state.focusable.len(), "modal opened");
    }

    pub fn close(&mut self, doc: &mut Document) {
        if !self.state.is_open {
            return;
        }
        self.state.is_open = false;
        doc.hide(self.elements.backdrop);
        doc.set_scroll_locked(false);
        if let Some(prior) = self.state.prior_focus.take() {
            doc.request_focus(prior);
        }
        tracing::debug!("modal closed");
    }

    /// Replaces the dialog body. The focus trap keeps the set captured by the
    /// last `open` until the next one.
    pub fn set_content(&mut self, doc: &mut Document, markup: impl IntoIterator<Item = Markup>) {
        doc.replace_children(self.elements.content, markup);
    }

    pub fn handle_key(&mut self, doc: &mut Document, press: KeyPress) -> KeyDisposition {
        if !self.state.is_open {
            return KeyDisposition::Default;
        }
        match press.key {
            Key::Escape => {
                self.close(doc);
                KeyDisposition::Default
            }
            Key::Tab => {
                let active = doc.active_element();
                let (Some(first), Some(last)) = (
                    self.state.focusable.first().copied(),
                    self.state.focusable.last().copied(),
                ) else {
                    return KeyDisposition::Default;
                };
                if !press.shift && active == Some(last) {
                    doc.focus(first);
                    KeyDisposition::Prevented
                } else if press.shift && active == Some(first) {
                    doc.focus(last);
                    KeyDisposition::Prevented
                } else {
                    KeyDisposition::Default
                }
            }
            Key::Enter | Key::Other => KeyDisposition::Default,
        }
    }

    /// Pointer activation on `target`. Returns true when the dialog consumed it
    /// by closing: a press on the backdrop itself or on a close control.
    pub fn handle_click(&mut self, doc: &mut Document, target: NodeId) -> bool {
        if !self.state.is_open {
            return false;
        }
        let on_backdrop = target == self.elements.backdrop;
        let on_close_control = doc.has_class(target, MODAL_CLOSE_CLASS)
            && doc.is_within(target, self.elements.content);
        if on_backdrop || on_close_control {
            self.close(doc);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{layout::build_document, registry::ElementRegistry};

    fn setup(buttons: usize) -> (Document, Modal, Vec<NodeId>, NodeId) {
        let mut doc = build_document();
        let registry = ElementRegistry::locate(&doc).expect("registry");
        let mut modal = Modal::new(registry.modal);
        modal.set_content(
            &mut doc,
            (0..buttons).map(|i| Markup::button(format!("b{i}")).id(format!("b{i}"))),
        );
        let ids = (0..buttons)
            .map(|i| doc.by_dom_id(&format!("b{i}")).expect("button"))
            .collect();
        let opener = registry.moc.preview_button;
        doc.focus(opener);
        (doc, modal, ids, opener)
    }

    #[test]
    fn open_focuses_first_entry_on_next_frame_and_locks_scroll() {
        let (mut doc, mut modal, buttons, opener) = setup(3);
        modal.open(&mut doc);
        assert!(modal.is_open());
        assert!(doc.is_scroll_locked());
        assert_eq!(modal.state().focusable(), buttons.as_slice());
        assert_eq!(doc.active_element(), Some(opener));
        doc.run_frame();
        assert_eq!(doc.active_element(), Some(buttons[0]));
    }

    #[test]
    fn tab_cycles_within_focusable_set() {
        let (mut doc, mut modal, buttons, _) = setup(3);
        modal.open(&mut doc);
        doc.run_frame();

        doc.focus(buttons[2]);
        assert_eq!(
            modal.handle_key(&mut doc, KeyPress::tab()),
            KeyDisposition::Prevented
        );
        assert_eq!(doc.active_element(), Some(buttons[0]));

        assert_eq!(
            modal.handle_key(&mut doc, KeyPress::shift_tab()),
            KeyDisposition::Prevented
        );
        assert_eq!(doc.active_element(), Some(buttons[2]));

        doc.focus(buttons[1]);
        assert_eq!(
            modal.handle_key(&mut doc, KeyPress::tab()),
            KeyDisposition::Default
        );
        assert_eq!(
            modal.handle_key(&mut doc, KeyPress::shift_tab()),
            KeyDisposition::Default
        );
        assert_eq!(doc.active_element(), Some(buttons[1]));
    }

    #[test]
    fn close_restores_exact_prior_focus_once() {
        let (mut doc, mut modal, buttons, opener) = setup(2);
        modal.open(&mut doc);
        doc.run_frame();
        assert_eq!(doc.active_element(), Some(buttons[0]));

        modal.close(&mut doc);
        assert!(!doc.is_scroll_locked());
        doc.run_frame();
        assert_eq!(doc.active_element(), Some(opener));
        assert_eq!(modal.state().prior_focus(), None);

        // A second close is a no-op and must not move focus again.
        doc.focus(buttons[1]);
        modal.close(&mut doc);
        doc.run_frame();
        assert_eq!(doc.active_element(), Some(buttons[1]));
    }

    #[test]
    fn open_twice_keeps_first_prior_focus() {
        let (mut doc, mut modal, buttons, opener) = setup(2);
        modal.open(&mut doc);
        doc.run_frame();
        modal.open(&mut doc);
        assert_eq!(modal.state().prior_focus(), Some(opener));
        assert_eq!(doc.active_element(), Some(buttons[0]));
    }

    #[test]
    fn escape_closes_and_backdrop_click_closes_but_content_click_does_not() {
        let (mut doc, mut modal, buttons, _) = setup(2);
        let registry = ElementRegistry::locate(&doc).expect("registry");

        modal.open(&mut doc);
        assert_eq!(
            modal.handle_key(&mut doc, KeyPress::escape()),
            KeyDisposition::Default
        );
        assert!(!modal.is_open());

        modal.open(&mut doc);
        assert!(!modal.handle_click(&mut doc, buttons[0]));
        assert!(!modal.handle_click(&mut doc, registry.modal.content));
        assert!(modal.is_open());
        assert!(modal.handle_click(&mut doc, registry.modal.backdrop));
        assert!(!modal.is_open());
        assert!(doc.is_hidden(registry.modal.backdrop));
    }

    #[test]
    fn set_content_does_not_recompute_focusable_set_until_reopen() {
        let (mut doc, mut modal, buttons, _) = setup(2);
        modal.open(&mut doc);
        modal.set_content(&mut doc, [Markup::button("only").class(MODAL_CLOSE_CLASS)]);
        assert!(modal.is_open());
        assert_eq!(modal.state().focusable(), buttons.as_slice());

        let close = doc.focusable_within(ElementRegistry::locate(&doc).expect("r").modal.content);
        assert!(modal.handle_click(&mut doc, close[0]));
        modal.open(&mut doc);
        assert_eq!(modal.state().focusable(), close.as_slice());
    }

    #[test]
    fn keys_are_ignored_while_closed() {
        let (mut doc, mut modal, _, opener) = setup(2);
        assert_eq!(
            modal.handle_key(&mut doc, KeyPress::tab()),
            KeyDisposition::Default
        );
        assert_eq!(doc.active_element(), Some(opener));
    }
}
