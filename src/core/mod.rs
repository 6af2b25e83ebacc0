pub mod fetcher;
pub mod filter;
pub mod render_state;
pub mod renderer;
pub mod template;
pub mod url_builder;
pub mod widget;

pub use crate::domain::model::{Course, CourseEnvelope};
pub use crate::domain::ports::{CourseFetcher, TemplateProvider};
pub use crate::utils::error::Result;
