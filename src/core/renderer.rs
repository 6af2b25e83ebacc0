use crate::config::settings::Presentation;
use crate::core::render_state::CardInstance;
use crate::core::template::CardTemplate;
use crate::dom::{ControlAction, Document, NodeId};
use crate::domain::model::Course;
use chrono::{DateTime, Utc};

const TITLE_FALLBACK: &str = "Course";
const CLOSED_NOTICE: &str = "Registration closed";

/// Populates card templates with course data and mounts them.
pub struct CardRenderer<'a> {
    document: &'a Document,
    template: &'a CardTemplate,
    presentation: &'a Presentation,
    now: DateTime<Utc>,
}

impl<'a> CardRenderer<'a> {
    pub fn new(
        document: &'a Document,
        template: &'a CardTemplate,
        presentation: &'a Presentation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            document,
            template,
            presentation,
            now,
        }
    }

    /// Builds one card and appends it to `container`. Returns `None` when the
    /// template has no content to clone.
    pub fn render(&self, container: NodeId, course: &Course) -> Option<CardInstance> {
        let card = self.template.instantiate(self.document)?;

        if let Some(title) = self.slot(card, "title") {
            self.document
                .set_text(title, course.name.as_deref().unwrap_or(TITLE_FALLBACK));
        }

        if let Some(start) = self.slot(card, "start") {
            self.document.set_text(start, &start_text(course));
        }

        if let Some(opening) = self.slot(card, "opening") {
            match course.opening_at().filter(|at| *at > self.now) {
                Some(at) => self.document.set_text(opening, &opening_notice(at)),
                None => self.document.remove(opening),
            }
        }

        if let Some(closing) = self.slot(card, "closing") {
            match course.closing_at().filter(|at| *at < self.now) {
                Some(_) => self.document.set_text(closing, CLOSED_NOTICE),
                None => self.document.remove(closing),
            }
        }

        if let Some(description) = self.slot(card, "description") {
            if self.presentation.show_description {
                self.document
                    .set_text(description, course.description.as_deref().unwrap_or_default());
            } else {
                self.document.remove(description);
            }
        }

        if let Some(price) = self.slot(card, "price") {
            let text = course
                .price
                .as_deref()
                .map(|price| format!("Price: {}", price))
                .unwrap_or_default();
            self.document.set_text(price, &text);
        }

        if let Some(read_more) = self.slot(card, "readmore") {
            self.document
                .bind_action(read_more, ControlAction::from_url(course.link.as_deref()));
        }

        if let Some(register) = self.slot(card, "register") {
            self.document.bind_action(
                register,
                ControlAction::from_url(course.registration_url.as_deref()),
            );
        }

        self.apply_presentation(card);
        self.document.append_child(container, card);
        Some(CardInstance::new(card))
    }

    fn slot(&self, card: NodeId, name: &str) -> Option<NodeId> {
        self.document
            .query_selector_in(card, &format!(".onbeat-widget-course__{}", name))
    }

    fn apply_presentation(&self, card: NodeId) {
        if let Some(width) = &self.presentation.card_width {
            self.document.set_style(card, "width", width);
            self.document.set_style(card, "max-width", width);
        }
        self.document
            .set_style(card, "align-self", self.presentation.card_align.align_self());
    }
}

/// `Start: 3 June 2025`, with `, 18:30` appended when a start time is known.
pub fn start_text(course: &Course) -> String {
    let Some(date) = course.start_date() else {
        return String::new();
    };
    let mut text = format!("Start: {}", date.format("%-d %B %Y"));
    if let Some(time) = course.start_time_of_day() {
        text.push_str(&format!(", {}", time.format("%H:%M")));
    }
    text
}

fn opening_notice(at: DateTime<Utc>) -> String {
    format!(
        "Registration opens {}",
        at.format("%-d %B %Y, %H:%M")
    )
}
