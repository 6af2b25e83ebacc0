use crate::dom::{Document, NodeId};

/// One mounted course card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardInstance {
    root: NodeId,
}

impl CardInstance {
    pub fn new(root: NodeId) -> Self {
        Self { root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Unbinds the card's controls and detaches it from its container.
    pub fn destroy(&self, document: &Document) {
        document.unbind_actions(self.root);
        document.remove(self.root);
    }
}

/// The cards currently owned by one container. Stored on the document keyed
/// by container so the next load cycle can tear them down.
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    instances: Vec<CardInstance>,
}

impl RenderState {
    pub fn new(instances: Vec<CardInstance>) -> Self {
        Self { instances }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn teardown(self, document: &Document) {
        for instance in &self.instances {
            instance.destroy(document);
        }
    }
}

/// Takes the container's render state (if any) and tears it down. The
/// container is left without a record.
pub fn teardown_container(document: &Document, container: NodeId) -> usize {
    match document.take_render_state(container) {
        Some(state) => {
            let count = state.len();
            let had_cards = !state.is_empty();
            state.teardown(document);
            if had_cards {
                tracing::debug!("Tore down {} previously rendered cards", count);
            }
            count
        }
        None => 0,
    }
}
