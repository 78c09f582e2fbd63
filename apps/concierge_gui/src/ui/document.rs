//! Headless element tree the controller mutates and the egui shell renders.
//!
//! Nodes live in a `SlotMap`, so a `NodeId` held after its node was removed
//! never aliases a newer node. Mutators on unknown ids are no-ops.

use std::collections::{BTreeMap, HashMap};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct NodeId;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    Heading,
    Paragraph,
    Span,
    Strong,
    LineBreak,
    Button,
    Link,
    TextInput,
    TextArea,
    Checkbox,
    Radio { group: String },
    Range { min: i32, max: i32 },
}

impl NodeKind {
    pub fn is_form_control(&self) -> bool {
        matches!(
            self,
            NodeKind::TextInput
                | NodeKind::TextArea
                | NodeKind::Checkbox
                | NodeKind::Radio { .. }
                | NodeKind::Range { .. }
        )
    }
}

/// Declarative description of a subtree, materialized by [`Document::append`].
#[derive(Debug, Clone)]
pub struct Markup {
    kind: NodeKind,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    hidden: bool,
    children: Vec<Markup>,
}

impl Markup {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            checked: false,
            hidden: false,
            children: Vec::new(),
        }
    }

    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Heading).text(text)
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Paragraph).text(text)
    }

    pub fn span(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Span).text(text)
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Strong).text(text)
    }

    pub fn line_break() -> Self {
        Self::new(NodeKind::LineBreak)
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Button).text(text)
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(NodeKind::Link).text(text).attr("href", href)
    }

    pub fn text_input() -> Self {
        Self::new(NodeKind::TextInput)
    }

    pub fn text_area() -> Self {
        Self::new(NodeKind::TextArea)
    }

    pub fn checkbox(label: impl Into<String>) -> Self {
        Self::new(NodeKind::Checkbox).text(label)
    }

    pub fn radio(group: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(NodeKind::Radio {
            group: group.into(),
        })
        .text(label)
    }

    pub fn range(min: i32, max: i32, value: i32) -> Self {
        Self::new(NodeKind::Range { min, max }).value(value.to_string())
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn child(mut self, child: Markup) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Markup>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    dom_id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
    focused: Option<NodeId>,
    focus_queue: Vec<NodeId>,
    focus_changed: bool,
    scroll_locked: bool,
    location_hash: String,
    hash_changed: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root_node = Node {
            kind: NodeKind::Container,
            dom_id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            checked: false,
            hidden: false,
            parent: None,
            children: Vec::new(),
        };
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(root_node);
        Self {
            nodes,
            root,
            ids: HashMap::new(),
            focused: None,
            focus_queue: Vec::new(),
            focus_changed: false,
            scroll_locked: false,
            location_hash: String::new(),
            hash_changed: false,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Builds `markup` as the last child of `parent`. Returns `None` when the
    /// parent is not in the document.
    pub fn append(&mut self, parent: NodeId, markup: Markup) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        Some(self.build(parent, markup))
    }

    fn build(&mut self, parent: NodeId, markup: Markup) -> NodeId {
        let Markup {
            kind,
            id: dom_id,
            classes,
            attrs,
            text,
            value,
            checked,
            hidden,
            children,
        } = markup;
        let id = self.nodes.insert(Node {
            kind,
            dom_id: dom_id.clone(),
            classes,
            attrs,
            text,
            value,
            checked,
            hidden,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(dom_id) = dom_id {
            self.ids.insert(dom_id, id);
        }
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        for child in children {
            self.build(id, child);
        }
        id
    }

    /// Replaces every child of `parent` with freshly built `markup`.
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        markup: impl IntoIterator<Item = Markup>,
    ) -> Vec<NodeId> {
        if !self.contains(parent) {
            return Vec::new();
        }
        self.clear_children(parent);
        markup
            .into_iter()
            .map(|child| self.build(parent, child))
            .collect()
    }

    pub fn clear_children(&mut self, parent: NodeId) {
        let children = match self.node_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.release(child);
        }
    }

    /// Detaches `id` and its subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        let Some(parent) = self.node(id).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|child| *child != id);
        }
        self.release(id);
    }

    fn release(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        if let Some(dom_id) = &node.dom_id {
            if self.ids.get(dom_id) == Some(&id) {
                self.ids.remove(dom_id);
            }
        }
        if self.focused == Some(id) {
            self.focused = None;
            self.focus_changed = true;
        }
        for child in node.children {
            self.release(child);
        }
    }

    pub fn by_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.ids.get(dom_id).copied()
    }

    pub fn dom_id(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.dom_id.as_deref()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Every node below `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id)
            .is_some_and(|node| node.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.node_mut(id) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.node_mut(id) {
            node.classes.retain(|c| c != class);
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.attrs.get(name).map(String::as_str)
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.node(id).map(|node| node.text.as_str()).unwrap_or("")
    }

    /// Replaces the node's text and drops its children.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.clear_children(id);
        if let Some(node) = self.node_mut(id) {
            node.text = text.into();
        }
    }

    /// The node's own text followed by the text of its descendants.
    #[cfg(test)]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = self.text(id).to_string();
        for descendant in self.descendants(id) {
            out.push_str(self.text(descendant));
        }
        out
    }

    pub fn value(&self, id: NodeId) -> &str {
        self.node(id).map(|node| node.value.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(node) = self.node_mut(id) {
            node.value = value.into();
        }
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.checked)
    }

    /// Checking a radio unchecks the other radios of its group.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        let group = match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Radio { group }) if checked => Some(group.clone()),
            Some(_) => None,
            None => return,
        };
        if let Some(group) = group {
            let peers: Vec<NodeId> = self
                .descendants(self.root)
                .into_iter()
                .filter(|peer| {
                    *peer != id
                        && matches!(self.kind(*peer), Some(NodeKind::Radio { group: g }) if *g == group)
                })
                .collect();
            for peer in peers {
                if let Some(node) = self.node_mut(peer) {
                    node.checked = false;
                }
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.checked = checked;
        }
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.hidden)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.node_mut(id) {
            node.hidden = hidden;
        }
    }

    pub fn show(&mut self, id: NodeId) {
        self.set_hidden(id, false);
    }

    pub fn hide(&mut self, id: NodeId) {
        self.set_hidden(id, true);
    }

    /// Attached, and neither the node nor any ancestor is hidden.
    #[cfg(test)]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        let mut seen = false;
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                return false;
            };
            if node.hidden {
                return false;
            }
            seen = true;
            current = node.parent;
        }
        seen
    }

    /// Interactive nodes below `root` in document order: buttons, links with an
    /// `href`, form controls, and anything with a `tabindex` other than `-1`.
    pub fn focusable_within(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.is_focusable(*id))
            .collect()
    }

    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if let Some(tabindex) = node.attrs.get("tabindex") {
            return tabindex.trim() != "-1";
        }
        match &node.kind {
            NodeKind::Button => true,
            NodeKind::Link => node.attrs.contains_key("href"),
            kind => kind.is_form_control(),
        }
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn focus(&mut self, id: NodeId) {
        if self.contains(id) && self.focused != Some(id) {
            self.focused = Some(id);
            self.focus_changed = true;
        }
    }

    /// Queues a focus move for the next render pass.
    pub fn request_focus(&mut self, id: NodeId) {
        self.focus_queue.push(id);
    }

    /// Runs the work deferred to the next render pass: queued focus moves are
    /// applied in request order, skipping nodes removed in the meantime.
    pub fn run_frame(&mut self) {
        for id in std::mem::take(&mut self.focus_queue) {
            self.focus(id);
        }
    }

    /// Whether focus moved since the last call; used by the renderer to
    /// push focus into the widget tree.
    pub fn take_focus_change(&mut self) -> bool {
        std::mem::take(&mut self.focus_changed)
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    /// Location fragment without the leading `#`.
    pub fn location_hash(&self) -> &str {
        &self.location_hash
    }

    /// Setting a different fragment raises a hash-change notification.
    pub fn set_location_hash(&mut self, fragment: &str) {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if self.location_hash != fragment {
            self.location_hash = fragment.to_string();
            self.hash_changed = true;
        }
    }

    pub fn take_hash_change(&mut self) -> bool {
        std::mem::take(&mut self.hash_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let panel = doc
            .append(
                root,
                Markup::container()
                    .id("panel")
                    .child(Markup::button("one").id("one"))
                    .child(Markup::paragraph("text"))
                    .child(
                        Markup::container()
                            .child(Markup::text_input().id("field"))
                            .child(Markup::link("docs", "#docs"))
                            .child(Markup::span("skip").attr("tabindex", "-1"))
                            .child(Markup::span("custom").attr("tabindex", "0").id("custom")),
                    ),
            )
            .expect("panel");
        (doc, panel)
    }

    #[test]
    fn focusable_nodes_follow_document_order() {
        let (doc, panel) = sample();
        let focusable = doc.focusable_within(panel);
        let labels: Vec<String> = focusable.iter().map(|id| doc.text_content(*id)).collect();
        assert_eq!(labels, vec!["one", "", "docs", "custom"]);
    }

    #[test]
    fn removed_ids_do_not_alias_new_nodes() {
        let (mut doc, panel) = sample();
        let one = doc.by_dom_id("one").expect("one");
        doc.focus(one);
        doc.clear_children(panel);
        assert!(!doc.contains(one));
        assert_eq!(doc.active_element(), None);
        assert_eq!(doc.by_dom_id("one"), None);

        let fresh = doc.append(panel, Markup::button("two")).expect("two");
        assert_ne!(fresh, one);
        assert!(!doc.contains(one));
    }

    #[test]
    fn queued_focus_applies_on_next_frame_in_order() {
        let (mut doc, _) = sample();
        let one = doc.by_dom_id("one").expect("one");
        let field = doc.by_dom_id("field").expect("field");
        doc.request_focus(one);
        doc.request_focus(field);
        assert_eq!(doc.active_element(), None);
        doc.run_frame();
        assert_eq!(doc.active_element(), Some(field));
        assert!(doc.take_focus_change());
        assert!(!doc.take_focus_change());
    }

    #[test]
    fn checking_a_radio_unchecks_its_group() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc
            .append(root, Markup::radio("mode", "a").checked(true))
            .expect("a");
        let b = doc.append(root, Markup::radio("mode", "b")).expect("b");
        let other = doc
            .append(root, Markup::radio("other", "c").checked(true))
            .expect("c");
        doc.set_checked(b, true);
        assert!(!doc.is_checked(a));
        assert!(doc.is_checked(b));
        assert!(doc.is_checked(other));
    }

    #[test]
    fn visibility_accounts_for_hidden_ancestors() {
        let (mut doc, panel) = sample();
        let field = doc.by_dom_id("field").expect("field");
        assert!(doc.is_visible(field));
        doc.hide(panel);
        assert!(!doc.is_visible(field));
        assert!(!doc.is_hidden(field));
    }

    #[test]
    fn hash_change_only_fires_on_new_fragment() {
        let mut doc = Document::new();
        doc.set_location_hash("#search");
        assert_eq!(doc.location_hash(), "search");
        assert!(doc.take_hash_change());
        doc.set_location_hash("search");
        assert!(!doc.take_hash_change());
    }
}
