use crate::dom::{Document, NodeId};
use crate::domain::ports::TemplateProvider;
use crate::utils::error::{Result, WidgetError};
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

pub const CARD_TEMPLATE_ID: &str = "course-card-template";
pub const STYLE_ELEMENT_ID: &str = "onbeat-course-widget-styles";

pub const INLINE_TEMPLATE: &str = include_str!("../assets/card_template.json");
pub const INLINE_STYLES: &str = include_str!("../assets/widget.css");

static EMBEDDED_TEMPLATE: OnceLock<Arc<CardTemplate>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateNode {
    pub tag: String,
    #[serde(default)]
    pub class: Vec<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

/// A reusable card structure. Each instantiation clones a fresh, detached
/// subtree into the target document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardTemplate {
    pub id: String,
    #[serde(default)]
    pub content: Option<TemplateNode>,
}

impl CardTemplate {
    pub fn parse(markup: &str) -> Result<Self> {
        let template: CardTemplate =
            serde_json::from_str(markup).map_err(|e| WidgetError::TemplateResolutionFailure {
                message: format!("template markup could not be parsed: {}", e),
            })?;
        if template.id != CARD_TEMPLATE_ID {
            return Err(WidgetError::TemplateResolutionFailure {
                message: format!("{} not found in template markup", CARD_TEMPLATE_ID),
            });
        }
        Ok(template)
    }

    /// Returns the root of the new subtree, or `None` for an empty template.
    pub fn instantiate(&self, document: &Document) -> Option<NodeId> {
        self.content
            .as_ref()
            .map(|node| build_node(document, node))
    }
}

fn build_node(document: &Document, node: &TemplateNode) -> NodeId {
    let element = document.create_element(&node.tag);
    for class in &node.class {
        document.add_class(element, class);
    }
    if !node.text.is_empty() {
        document.set_text(element, &node.text);
    }
    for child in &node.children {
        let child = build_node(document, child);
        document.append_child(element, child);
    }
    element
}

/// Template provider backed by inline markup. The parsed template is cached
/// after the first successful resolution; failures are retried next time.
#[derive(Debug, Default)]
pub struct InlineTemplateProvider {
    markup: Option<String>,
    cache: OnceLock<Arc<CardTemplate>>,
}

impl InlineTemplateProvider {
    /// Uses the markup embedded in the crate, cached process-wide.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: Some(markup.into()),
            cache: OnceLock::new(),
        }
    }

    fn cache(&self) -> &OnceLock<Arc<CardTemplate>> {
        match self.markup {
            Some(_) => &self.cache,
            None => &EMBEDDED_TEMPLATE,
        }
    }
}

impl TemplateProvider for InlineTemplateProvider {
    fn card_template(&self) -> Result<Arc<CardTemplate>> {
        let cache = self.cache();
        if let Some(template) = cache.get() {
            return Ok(Arc::clone(template));
        }
        let markup = self.markup.as_deref().unwrap_or(INLINE_TEMPLATE);
        let parsed = Arc::new(CardTemplate::parse(markup)?);
        tracing::debug!("Parsed course card template");
        Ok(Arc::clone(cache.get_or_init(|| parsed)))
    }
}

/// Injects the widget stylesheet once per document.
pub fn ensure_inline_styles(document: &Document) {
    if document.ensure_stylesheet(STYLE_ELEMENT_ID, INLINE_STYLES) {
        tracing::debug!("Injected widget styles as #{}", STYLE_ELEMENT_ID);
    }
}
