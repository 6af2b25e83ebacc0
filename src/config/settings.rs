use crate::dom::{Document, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Sentinel course type meaning "no type filter".
pub const ALL_COURSE_TYPES: &str = "all";

/// Defaults every invocation is resolved against.
pub static DEFAULT_OPTIONS: LazyLock<WidgetOptions> = LazyLock::new(|| WidgetOptions {
    container: None,
    course_id: None,
    course_type: Some(CourseType::One(ALL_COURSE_TYPES.to_string())),
    public_token: None,
    show_description: Some(true),
    show_closed: Some(false),
    card_width: None,
    card_align: Some(CardAlign::Left.as_str().to_string()),
});

/// A string or integer value from caller options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseId {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl CourseId {
    /// The identifier to query by: a scalar, or a list holding exactly one
    /// entry. Longer lists are not representable as a `course_id` filter.
    pub fn single(&self) -> Option<String> {
        let value = match self {
            CourseId::One(value) => value,
            CourseId::Many(values) if values.len() == 1 => &values[0],
            CourseId::Many(_) => return None,
        };
        let value = value.to_string();
        (!value.is_empty()).then_some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseType {
    One(String),
    Many(Vec<String>),
}

impl CourseType {
    /// Category values to filter by, or `None` when unset.
    pub fn filter_values(&self) -> Option<Vec<String>> {
        let values: Vec<String> = match self {
            CourseType::One(value) if value.trim() == ALL_COURSE_TYPES => return None,
            CourseType::One(value) => vec![value.trim().to_string()],
            CourseType::Many(values) => values.iter().map(|v| v.trim().to_string()).collect(),
        };
        let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
        (!values.is_empty()).then_some(values)
    }
}

impl<const N: usize> From<[&str; N]> for CourseType {
    fn from(values: [&str; N]) -> Self {
        CourseType::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl CardAlign {
    /// Unrecognized values fall back to `Left`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "center" => CardAlign::Center,
            "right" => CardAlign::Right,
            _ => CardAlign::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardAlign::Left => "left",
            CardAlign::Center => "center",
            CardAlign::Right => "right",
        }
    }

    /// Value for `align-self` inside the flex column container.
    pub fn align_self(&self) -> &'static str {
        match self {
            CardAlign::Left => "flex-start",
            CardAlign::Center => "center",
            CardAlign::Right => "flex-end",
        }
    }
}

/// Where the widget renders: a selector or an element already in hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContainerRef {
    Selector(String),
    Element(NodeId),
}

impl ContainerRef {
    pub fn resolve(&self, document: &Document) -> Option<NodeId> {
        match self {
            ContainerRef::Selector(selector) => document.query_selector(selector),
            ContainerRef::Element(node) => document.contains(*node).then_some(*node),
        }
    }
}

impl From<&str> for ContainerRef {
    fn from(selector: &str) -> Self {
        ContainerRef::Selector(selector.to_string())
    }
}

impl From<NodeId> for ContainerRef {
    fn from(node: NodeId) -> Self {
        ContainerRef::Element(node)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Selector(selector) => f.write_str(selector),
            ContainerRef::Element(node) => write!(f, "{:?}", node),
        }
    }
}

/// Caller-supplied partial settings. Keys are accepted in snake_case and in
/// the camelCase used by the embed snippet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    #[serde(alias = "containerRef")]
    pub container: Option<ContainerRef>,
    #[serde(alias = "courseId")]
    pub course_id: Option<CourseId>,
    #[serde(alias = "courseType")]
    pub course_type: Option<CourseType>,
    #[serde(alias = "publicToken")]
    pub public_token: Option<String>,
    #[serde(alias = "showDescription")]
    pub show_description: Option<bool>,
    #[serde(alias = "showClosed")]
    pub show_closed: Option<bool>,
    #[serde(alias = "cardWidth")]
    pub card_width: Option<Scalar>,
    #[serde(alias = "cardAlign")]
    pub card_align: Option<String>,
}

impl WidgetOptions {
    /// Shallow merge: fields set on `self` win, the rest come from `base`.
    pub fn merge_over(self, base: &WidgetOptions) -> WidgetOptions {
        WidgetOptions {
            container: self.container.or_else(|| base.container.clone()),
            course_id: self.course_id.or_else(|| base.course_id.clone()),
            course_type: self.course_type.or_else(|| base.course_type.clone()),
            public_token: self.public_token.or_else(|| base.public_token.clone()),
            show_description: self.show_description.or(base.show_description),
            show_closed: self.show_closed.or(base.show_closed),
            card_width: self.card_width.or_else(|| base.card_width.clone()),
            card_align: self.card_align.or_else(|| base.card_align.clone()),
        }
    }
}

/// Presentation hints handed to the card renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presentation {
    pub show_description: bool,
    pub card_width: Option<String>,
    pub card_align: CardAlign,
}

/// Fully resolved, immutable settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub container: Option<ContainerRef>,
    pub course_id: Option<CourseId>,
    pub course_type: CourseType,
    pub public_token: Option<String>,
    pub show_description: bool,
    pub show_closed: bool,
    pub card_width: Option<String>,
    pub card_align: CardAlign,
}

impl Settings {
    pub fn resolve(options: WidgetOptions) -> Self {
        Self::resolve_with(options, &DEFAULT_OPTIONS)
    }

    /// No cross-field validation happens here; filter precedence is decided
    /// when the request URL is built.
    pub fn resolve_with(options: WidgetOptions, defaults: &WidgetOptions) -> Self {
        let merged = options.merge_over(defaults);
        Self {
            container: merged.container,
            course_id: merged.course_id,
            course_type: merged
                .course_type
                .unwrap_or_else(|| CourseType::One(ALL_COURSE_TYPES.to_string())),
            public_token: merged.public_token,
            show_description: merged.show_description.unwrap_or(true),
            show_closed: merged.show_closed.unwrap_or(false),
            card_width: merged.card_width.map(|width| match width {
                Scalar::Integer(px) => format!("{}px", px),
                Scalar::Text(text) => text.trim().to_string(),
            }),
            card_align: merged
                .card_align
                .as_deref()
                .map(CardAlign::parse_lenient)
                .unwrap_or_default(),
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            show_description: self.show_description,
            card_width: self.card_width.clone().filter(|w| !w.is_empty()),
            card_align: self.card_align,
        }
    }
}
