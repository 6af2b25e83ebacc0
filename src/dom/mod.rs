//! Headless host document.
//!
//! A small arena-backed element tree that stands in for the host page DOM:
//! enough structure for the widget to resolve its container, inject styles,
//! mount cards, bind controls and tear everything down again. `Document` is a
//! cheap cloneable handle; clones share the same tree.
//!
//! Removed subtrees are freed and their slots recycled. A [`NodeId`] carries
//! the slot generation, so a handle to a freed element never resolves to the
//! element that later reuses its slot.

pub mod html;

use crate::core::render_state::RenderState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// What activating an interactive control does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    /// Open the URL in a new browsing context without an opener reference.
    OpenInNewContext { url: String },
    /// Control stays in the layout but cannot be activated.
    Disabled,
}

impl ControlAction {
    pub fn from_url(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            Some(url) if !url.is_empty() => ControlAction::OpenInNewContext {
                url: url.to_string(),
            },
            _ => ControlAction::Disabled,
        }
    }
}

/// A browsing context opened by activating a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedContext {
    pub url: String,
    pub target: String,
    pub features: String,
}

#[derive(Debug, Default, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    styles: Vec<(String, String)>,
    disabled: bool,
    action: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

#[derive(Debug, Default)]
struct Tree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    render_states: HashMap<NodeId, RenderState>,
    opened: Vec<OpenedContext>,
}

impl Tree {
    fn get(&self, node: NodeId) -> Option<&Element> {
        self.slots
            .get(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    fn push(&mut self, tag: &str) -> NodeId {
        let element = Element {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        };
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index) {
                slot.element = Some(element);
                return NodeId {
                    index,
                    generation: slot.generation,
                };
            }
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            element: Some(element),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Frees `node` and its whole subtree. The caller unlinks it first.
    fn release(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            let Some(element) = slot.element.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
            self.render_states.remove(&current);
            stack.extend(element.children);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).and_then(|el| el.parent) else {
            return;
        };
        if let Some(parent_el) = self.get_mut(parent) {
            parent_el.children.retain(|child| *child != node);
        }
        if let Some(el) = self.get_mut(node) {
            el.parent = None;
        }
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = match self.get_mut(node) {
            Some(el) => {
                el.text.clear();
                std::mem::take(&mut el.children)
            }
            None => return,
        };
        for child in children {
            if let Some(el) = self.get_mut(child) {
                el.parent = None;
            }
            self.release(child);
        }
    }

    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(root) {
            Some(el) => el.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(el) = self.get(node) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let Some(el) = self.get(node) else {
            return false;
        };
        match selector {
            Selector::Id(id) => el.id.as_deref() == Some(id.as_str()),
            Selector::Class(class) => el.classes.iter().any(|c| c == class),
            Selector::Tag(tag) => el.tag.eq_ignore_ascii_case(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Id(String),
    Class(String),
    Tag(String),
}

impl Selector {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(id) = raw.strip_prefix('#') {
            (!id.is_empty()).then(|| Selector::Id(id.to_string()))
        } else if let Some(class) = raw.strip_prefix('.') {
            (!class.is_empty()).then(|| Selector::Class(class.to_string()))
        } else if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Some(Selector::Tag(raw.to_string()))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    inner: Arc<Mutex<Tree>>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        let root = tree.push("html");
        let head = tree.push("head");
        let body = tree.push("body");
        for child in [head, body] {
            if let Some(el) = tree.get_mut(child) {
                el.parent = Some(root);
            }
            if let Some(el) = tree.get_mut(root) {
                el.children.push(child);
            }
        }
        Self {
            inner: Arc::new(Mutex::new(tree)),
            root,
            head,
            body,
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        // A panic while holding the lock cannot leave the arena half-linked
        // in a way later reads depend on, so recover the guard.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.tree().get(node).is_some()
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree().push(tag)
    }

    pub fn set_id(&self, node: NodeId, id: &str) {
        if let Some(el) = self.tree().get_mut(node) {
            el.id = Some(id.to_string());
        }
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.tree().get_mut(node) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree()
            .get(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    /// Replaces all children with the given text, like `textContent = ..`.
    pub fn set_text(&self, node: NodeId, text: &str) {
        let mut tree = self.tree();
        tree.clear_children(node);
        if let Some(el) = tree.get_mut(node) {
            el.text = text.to_string();
        }
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.tree();
        let mut out = tree.get(node).map(|el| el.text.clone()).unwrap_or_default();
        for descendant in tree.descendants(node) {
            if let Some(el) = tree.get(descendant) {
                out.push_str(&el.text);
            }
        }
        out
    }

    pub fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.tree().get_mut(node) {
            match el.styles.iter_mut().find(|(p, _)| p == property) {
                Some(entry) => entry.1 = value.to_string(),
                None => el.styles.push((property.to_string(), value.to_string())),
            }
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree().get(node).and_then(|el| {
            el.styles
                .iter()
                .find(|(p, _)| p == property)
                .map(|(_, v)| v.clone())
        })
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.tree().get(node).is_some_and(|el| el.disabled)
    }

    pub fn bind_action(&self, node: NodeId, action: ControlAction) {
        if let Some(el) = self.tree().get_mut(node) {
            match action {
                ControlAction::OpenInNewContext { url } => {
                    el.disabled = false;
                    el.action = Some(url);
                }
                ControlAction::Disabled => {
                    el.disabled = true;
                    el.action = None;
                }
            }
        }
    }

    /// Drops every bound handler in the subtree rooted at `node`.
    pub fn unbind_actions(&self, node: NodeId) {
        let mut tree = self.tree();
        let mut targets = tree.descendants(node);
        targets.push(node);
        for target in targets {
            if let Some(el) = tree.get_mut(target) {
                el.action = None;
            }
        }
    }

    /// Simulates a user activating the control. Returns the opened context,
    /// if any.
    pub fn activate(&self, node: NodeId) -> Option<OpenedContext> {
        let mut tree = self.tree();
        let el = tree.get(node)?;
        if el.disabled {
            return None;
        }
        let opened = OpenedContext {
            url: el.action.clone()?,
            target: "_blank".to_string(),
            features: "noopener".to_string(),
        };
        tracing::debug!("Opening {} in a new browsing context", opened.url);
        tree.opened.push(opened.clone());
        Some(opened)
    }

    pub fn opened_contexts(&self) -> Vec<OpenedContext> {
        self.tree().opened.clone()
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.tree();
        if parent == child || tree.get(parent).is_none() || tree.get(child).is_none() {
            return;
        }
        tree.detach(child);
        if let Some(el) = tree.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = tree.get_mut(parent) {
            el.children.push(child);
        }
    }

    /// Detaches `node` and frees its subtree. Handles into it go stale.
    pub fn remove(&self, node: NodeId) {
        if node == self.root {
            return;
        }
        let mut tree = self.tree();
        tree.detach(node);
        tree.release(node);
    }

    /// Empties the element, like `innerHTML = ''`. The old children are freed.
    pub fn clear_children(&self, node: NodeId) {
        self.tree().clear_children(node);
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree()
            .get(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree().get(node).and_then(|el| el.parent)
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let tree = self.tree();
        let mut current = Some(node);
        while let Some(n) = current {
            if n == self.root {
                return true;
            }
            current = tree.get(n).and_then(|el| el.parent);
        }
        false
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_selector(&format!("#{}", id))
    }

    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_in(self.root, selector)
    }

    /// First descendant of `root` matching a simple `#id`, `.class` or `tag`
    /// selector.
    pub fn query_selector_in(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector)?;
        let tree = self.tree();
        tree.descendants(root)
            .into_iter()
            .find(|node| tree.matches(*node, &selector))
    }

    pub fn query_selector_all_in(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let tree = self.tree();
        tree.descendants(root)
            .into_iter()
            .filter(|node| tree.matches(*node, &selector))
            .collect()
    }

    /// Inserts a `<style>` block into `<head>` unless one with `id` exists.
    /// Returns whether a block was inserted.
    pub fn ensure_stylesheet(&self, id: &str, css: &str) -> bool {
        if self.get_element_by_id(id).is_some() {
            return false;
        }
        let style = self.create_element("style");
        self.set_id(style, id);
        self.set_text(style, css);
        self.append_child(self.head, style);
        true
    }

    pub fn take_render_state(&self, container: NodeId) -> Option<RenderState> {
        self.tree().render_states.remove(&container)
    }

    pub fn set_render_state(&self, container: NodeId, state: RenderState) {
        self.tree().render_states.insert(container, state);
    }

    pub fn render_state_len(&self, container: NodeId) -> usize {
        self.tree()
            .render_states
            .get(&container)
            .map(RenderState::len)
            .unwrap_or(0)
    }

    /// Elements currently allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.tree().live_count()
    }

    pub fn to_html(&self, node: NodeId) -> String {
        let tree = self.tree();
        let mut out = String::new();
        html::write_element(&tree, node, &mut out);
        out
    }
}
