//! Removable tag chips rendered into a container.

use crate::ui::document::{Document, Markup, NodeId};

pub const TAG_CLASS: &str = "tag";
pub const TAG_CLOSE_CLASS: &str = "tag-close";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Chip {
    label: String,
    node: NodeId,
    close: NodeId,
}

/// Ordered tags backed by chips in `container`. Duplicates are kept as-is.
#[derive(Debug, Clone)]
pub struct TagCollection {
    container: NodeId,
    chips: Vec<Chip>,
}

impl TagCollection {
    pub fn new(container: NodeId) -> Self {
        Self {
            container,
            chips: Vec::new(),
        }
    }

    pub fn add(&mut self, doc: &mut Document, label: impl Into<String>) {
        let label = label.into();
        let Some(node) = doc.append(
            self.container,
            Markup::container()
                .class(TAG_CLASS)
                .text(label.clone())
                .child(
                    Markup::button("×")
                        .class(TAG_CLOSE_CLASS)
                        .attr("aria-label", format!("Remove tag {label}")),
                ),
        ) else {
            return;
        };
        let Some(close) = doc.children(node).first().copied() else {
            return;
        };
        self.chips.push(Chip { label, node, close });
    }

    /// Removes the chip owning the `close` control. Returns false when the
    /// control belongs to no chip of this collection.
    pub fn remove_by_close(&mut self, doc: &mut Document, close: NodeId) -> bool {
        let Some(position) = self.chips.iter().position(|chip| chip.close == close) else {
            return false;
        };
        let chip = self.chips.remove(position);
        doc.remove(chip.node);
        true
    }

    /// Drops every chip and clears the container.
    pub fn clear(&mut self, doc: &mut Document) {
        self.chips.clear();
        doc.clear_children(self.container);
    }

    pub fn replace_all(&mut self, doc: &mut Document, labels: impl IntoIterator<Item = String>) {
        self.clear(doc);
        for label in labels {
            self.add(doc, label);
        }
    }

    pub fn values(&self) -> Vec<String> {
        self.chips.iter().map(|chip| chip.label.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}
