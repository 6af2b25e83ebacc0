use crate::config::settings::{Settings, WidgetOptions};
use crate::core::fetcher::HttpCourseFetcher;
use crate::core::filter::filter_courses;
use crate::core::render_state::{teardown_container, RenderState};
use crate::core::renderer::CardRenderer;
use crate::core::template::{ensure_inline_styles, InlineTemplateProvider};
use crate::core::url_builder::{build_request_url, DEFAULT_BASE_URL};
use crate::dom::{Document, NodeId};
use crate::domain::ports::{CourseFetcher, TemplateProvider};
use crate::utils::error::{Result, WidgetError, MSG_LOAD_FAILED};
use chrono::Utc;
use std::fmt;

pub const WIDGET_CLASS: &str = "onbeat-widget";
pub const MESSAGE_CLASS: &str = "onbeat-widget-message";
pub const MSG_LOADING: &str = "Loading courses...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetPhase {
    Idle,
    Loading,
    Rendered,
    Failed,
}

impl fmt::Display for WidgetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetPhase::Idle => "idle",
            WidgetPhase::Loading => "loading",
            WidgetPhase::Rendered => "rendered",
            WidgetPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a completed render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub container: NodeId,
    pub request_url: String,
    pub fetched: usize,
    pub rendered: usize,
}

/// Drives one render cycle per `load` call: resolve settings and container,
/// show a loading placeholder, fetch, filter, replace any previous cards.
pub struct CourseWidget<F = HttpCourseFetcher, T = InlineTemplateProvider>
where
    F: CourseFetcher,
    T: TemplateProvider,
{
    document: Document,
    endpoint: String,
    fetcher: F,
    templates: T,
}

impl CourseWidget {
    pub fn new(document: Document) -> Self {
        Self::with_components(document, HttpCourseFetcher::new(), InlineTemplateProvider::new())
    }
}

impl<F, T> CourseWidget<F, T>
where
    F: CourseFetcher,
    T: TemplateProvider,
{
    pub fn with_components(document: Document, fetcher: F, templates: T) -> Self {
        Self {
            document,
            endpoint: DEFAULT_BASE_URL.to_string(),
            fetcher,
            templates,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a full render cycle. On fetch or template failure the container
    /// already shows a placeholder when the error is returned.
    pub async fn load(&self, options: WidgetOptions) -> Result<RenderOutcome> {
        let settings = Settings::resolve(options);
        let container = self.resolve_container(&settings)?;
        tracing::debug!("Widget phase: {} -> {}", WidgetPhase::Idle, WidgetPhase::Loading);

        ensure_inline_styles(&self.document);
        self.document.add_class(container, WIDGET_CLASS);
        self.show_message(container, MSG_LOADING);

        let request_url = build_request_url(&self.endpoint, &settings);
        tracing::info!("Loading courses from {}", request_url);

        let envelope = match self.fetcher.fetch(&request_url).await {
            Ok(envelope) => envelope,
            Err(e) => return Err(self.fail(container, e)),
        };

        let fetched = envelope.result.len();
        let courses = filter_courses(envelope.result, Utc::now(), settings.show_closed);
        tracing::debug!(
            "Fetched {} courses, {} remain after registration filter",
            fetched,
            courses.len()
        );

        // The record may have been replaced by an overlapping cycle.
        teardown_container(&self.document, container);
        self.document.clear_children(container);

        let template = match self.templates.card_template() {
            Ok(template) => template,
            Err(e) => return Err(self.fail(container, e)),
        };

        let presentation = settings.presentation();
        let renderer = CardRenderer::new(&self.document, &template, &presentation, Utc::now());
        let instances: Vec<_> = courses
            .iter()
            .filter_map(|course| renderer.render(container, course))
            .collect();
        let rendered = instances.len();
        self.document
            .set_render_state(container, RenderState::new(instances));

        tracing::info!(
            "Widget phase: {} -> {} ({} cards)",
            WidgetPhase::Loading,
            WidgetPhase::Rendered,
            rendered
        );

        Ok(RenderOutcome {
            container,
            request_url,
            fetched,
            rendered,
        })
    }

    fn resolve_container(&self, settings: &Settings) -> Result<NodeId> {
        let target = settings.container.as_ref();
        target
            .and_then(|container| container.resolve(&self.document))
            .ok_or_else(|| {
                let target = target
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "<none>".to_string());
                tracing::error!("Course container not found: {}", target);
                WidgetError::ContainerNotFound { target }
            })
    }

    /// Tears down any cards, empties the container and shows `message`.
    fn show_message(&self, container: NodeId, message: &str) {
        teardown_container(&self.document, container);
        self.document.clear_children(container);

        let paragraph = self.document.create_element("p");
        self.document.add_class(paragraph, MESSAGE_CLASS);
        self.document.set_text(paragraph, message);
        self.document.append_child(container, paragraph);
    }

    fn fail(&self, container: NodeId, error: WidgetError) -> WidgetError {
        let message = if error.is_render_cycle_failure() {
            error.user_friendly_message()
        } else {
            MSG_LOAD_FAILED
        };
        self.show_message(container, message);
        tracing::warn!(
            "Widget phase: {} -> {}: {}",
            WidgetPhase::Loading,
            WidgetPhase::Failed,
            error
        );
        error
    }
}

/// Single-call entry point: renders into `document` using the default
/// endpoint, HTTP fetcher and embedded card template.
pub async fn render_course_widget(document: &Document, options: WidgetOptions) -> Result<RenderOutcome> {
    CourseWidget::new(document.clone()).load(options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::template::CardTemplate;
    use crate::domain::model::{Course, CourseEnvelope};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct StaticFetcher {
        courses: Vec<Course>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn new(courses: Vec<Course>) -> Self {
            Self {
                courses,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl CourseFetcher for StaticFetcher {
        async fn fetch(&self, _request_url: &str) -> Result<CourseEnvelope> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CourseEnvelope {
                result: self.courses.clone(),
            })
        }
    }

    struct FailingFetcher(u16);

    #[async_trait::async_trait]
    impl CourseFetcher for FailingFetcher {
        async fn fetch(&self, _request_url: &str) -> Result<CourseEnvelope> {
            Err(WidgetError::HttpStatusFailure { status: self.0 })
        }
    }

    /// Records what the container shows while the request is in flight.
    struct ObservingFetcher {
        document: Document,
        container: NodeId,
        seen: Mutex<Vec<(String, usize, bool)>>,
    }

    #[async_trait::async_trait]
    impl CourseFetcher for ObservingFetcher {
        async fn fetch(&self, _request_url: &str) -> Result<CourseEnvelope> {
            let children = self.document.children(self.container);
            let shows_message = children
                .iter()
                .all(|child| self.document.has_class(*child, MESSAGE_CLASS));
            self.seen.lock().unwrap().push((
                self.document.text_content(self.container),
                children.len(),
                shows_message,
            ));
            Ok(CourseEnvelope {
                result: vec![named("Fresh")],
            })
        }
    }

    struct MissingTemplate;

    impl TemplateProvider for MissingTemplate {
        fn card_template(&self) -> Result<Arc<CardTemplate>> {
            Err(WidgetError::TemplateResolutionFailure {
                message: "course-card-template not found".to_string(),
            })
        }
    }

    fn document_with_container() -> (Document, NodeId) {
        let doc = Document::new();
        let container = doc.create_element("div");
        doc.set_id(container, "courses");
        doc.append_child(doc.body(), container);
        (doc, container)
    }

    fn options() -> WidgetOptions {
        WidgetOptions {
            container: Some("#courses".into()),
            public_token: Some("tok".to_string()),
            show_closed: Some(true),
            ..Default::default()
        }
    }

    fn named(name: &str) -> Course {
        Course {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_container_fails_before_fetch() {
        let (doc, container) = document_with_container();
        let fetcher = StaticFetcher::new(vec![named("A")]);
        let widget = CourseWidget::with_components(doc.clone(), fetcher, InlineTemplateProvider::new());

        let err = widget
            .load(WidgetOptions {
                container: Some("#elsewhere".into()),
                ..options()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WidgetError::ContainerNotFound { .. }));
        assert_eq!(widget.fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(doc.children(container).is_empty());
        assert!(doc.get_element_by_id("onbeat-course-widget-styles").is_none());
    }

    #[tokio::test]
    async fn test_renders_cards_in_source_order() {
        let (doc, container) = document_with_container();
        let widget = CourseWidget::with_components(
            doc.clone(),
            StaticFetcher::new(vec![named("B"), named("A"), named("C")]),
            InlineTemplateProvider::new(),
        );

        let outcome = widget.load(options()).await.unwrap();

        assert_eq!(outcome.rendered, 3);
        assert_eq!(outcome.request_url, "https://onbeat.dance/api/get_courses/tok");
        let titles: Vec<String> = doc
            .query_selector_all_in(container, ".onbeat-widget-course__title")
            .into_iter()
            .map(|node| doc.text_content(node))
            .collect();
        assert_eq!(titles, vec!["B", "A", "C"]);
        assert!(doc.has_class(container, "onbeat-widget"));
        assert!(doc.query_selector_in(container, ".onbeat-widget-message").is_none());
        assert_eq!(doc.render_state_len(container), 3);
    }

    #[tokio::test]
    async fn test_http_failure_shows_placeholder_and_propagates() {
        let (doc, container) = document_with_container();
        let widget =
            CourseWidget::with_components(doc.clone(), FailingFetcher(500), InlineTemplateProvider::new());

        let err = widget.load(options()).await.unwrap_err();

        assert!(matches!(err, WidgetError::HttpStatusFailure { status: 500 }));
        assert_eq!(doc.text_content(container), "Failed to load courses.");
        assert_eq!(doc.children(container).len(), 1);
    }

    #[tokio::test]
    async fn test_template_failure_shows_placeholder_and_propagates() {
        let (doc, container) = document_with_container();
        let widget = CourseWidget::with_components(
            doc.clone(),
            StaticFetcher::new(vec![named("A")]),
            MissingTemplate,
        );

        let err = widget.load(options()).await.unwrap_err();

        assert!(matches!(err, WidgetError::TemplateResolutionFailure { .. }));
        assert_eq!(doc.text_content(container), "Failed to load course template.");
        assert_eq!(doc.render_state_len(container), 0);
    }

    #[tokio::test]
    async fn test_failure_after_success_removes_stale_cards() {
        let (doc, container) = document_with_container();
        let ok = CourseWidget::with_components(
            doc.clone(),
            StaticFetcher::new(vec![named("A"), named("B")]),
            InlineTemplateProvider::new(),
        );
        ok.load(options()).await.unwrap();
        let first_cards = doc.children(container);

        let failing =
            CourseWidget::with_components(doc.clone(), FailingFetcher(404), InlineTemplateProvider::new());
        failing.load(options()).await.unwrap_err();

        assert!(first_cards.iter().all(|card| !doc.is_attached(*card)));
        assert_eq!(doc.children(container).len(), 1);
        assert_eq!(doc.render_state_len(container), 0);
    }

    #[tokio::test]
    async fn test_loading_placeholder_replaces_stale_cards_during_fetch() {
        let (doc, container) = document_with_container();
        let first = CourseWidget::with_components(
            doc.clone(),
            StaticFetcher::new(vec![named("A"), named("B")]),
            InlineTemplateProvider::new(),
        );
        first.load(options()).await.unwrap();
        let stale_cards = doc.children(container);
        assert_eq!(stale_cards.len(), 2);

        let fetcher = ObservingFetcher {
            document: doc.clone(),
            container,
            seen: Mutex::new(Vec::new()),
        };
        let second = CourseWidget::with_components(doc.clone(), fetcher, InlineTemplateProvider::new());
        let outcome = second.load(options()).await.unwrap();

        let seen = second.fetcher.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("Loading courses...".to_string(), 1, true)]);
        assert!(stale_cards.iter().all(|card| !doc.contains(*card)));
        assert_eq!(outcome.rendered, 1);
        let title = doc
            .query_selector_in(container, ".onbeat-widget-course__title")
            .unwrap();
        assert_eq!(doc.text_content(title), "Fresh");
    }

    #[tokio::test]
    async fn test_repeated_loads_keep_node_count_bounded() {
        let (doc, container) = document_with_container();
        let courses: Vec<Course> = (0..10).map(|i| named(&format!("Course {}", i))).collect();
        let widget = CourseWidget::with_components(
            doc.clone(),
            StaticFetcher::new(courses),
            InlineTemplateProvider::new(),
        );

        widget.load(options()).await.unwrap();
        let after_first = doc.node_count();

        for _ in 0..999 {
            widget.load(options()).await.unwrap();
        }

        assert_eq!(doc.node_count(), after_first);
        assert_eq!(doc.render_state_len(container), 10);
        assert_eq!(doc.children(container).len(), 10);
    }

    #[test]
    fn test_entry_point_requires_container() {
        let doc = Document::new();
        let err = tokio_test::block_on(render_course_widget(&doc, WidgetOptions::default()))
            .unwrap_err();
        assert!(matches!(err, WidgetError::ContainerNotFound { .. }));
        assert!(doc.children(doc.body()).is_empty());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(WidgetPhase::Loading.to_string(), "loading");
        assert_eq!(WidgetPhase::Rendered.to_string(), "rendered");
    }
}
