//! Hash-driven page navigation.

use shared::domain::PageId;

use crate::ui::{
    document::{Document, NodeId},
    layout::ACTIVE_CLASS,
    registry::ElementRegistry,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub active_page_id: PageId,
}

#[derive(Debug)]
pub struct Router {
    pages: Vec<(PageId, NodeId)>,
    nav_links: Vec<(PageId, NodeId)>,
    state: PageState,
}

impl Router {
    pub fn new(registry: &ElementRegistry) -> Self {
        Self {
            pages: registry.pages.clone(),
            nav_links: registry.nav_links.clone(),
            state: PageState {
                active_page_id: PageId::home(),
            },
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn active_page_id(&self) -> &PageId {
        &self.state.active_page_id
    }

    /// Shows the page named `id` and nothing else. An unknown id leaves every
    /// page hidden.
    pub fn navigate_to(&mut self, doc: &mut Document, id: &PageId) {
        let mut matched = false;
        for (page_id, node) in &self.pages {
            let visible = page_id == id;
            matched |= visible;
            doc.set_hidden(*node, !visible);
        }
        for (page_id, link) in &self.nav_links {
            if page_id == id {
                doc.add_class(*link, ACTIVE_CLASS);
            } else {
                doc.remove_class(*link, ACTIVE_CLASS);
            }
        }
        if !matched {
            tracing::debug!(page = %id, "no page matches navigation target");
        }
        self.state.active_page_id = id.clone();
        doc.set_location_hash(id.as_str());
    }

    /// Re-reads the location fragment, falling back to the home page.
    pub fn sync_from_location(&mut self, doc: &mut Document) {
        let target = PageId::from_fragment(doc.location_hash());
        self.navigate_to(doc, &target);
    }

    /// The page a navigation link points at.
    pub fn nav_target(&self, link: NodeId) -> Option<&PageId> {
        self.nav_links
            .iter()
            .find(|(_, node)| *node == link)
            .map(|(page_id, _)| page_id)
    }
}
