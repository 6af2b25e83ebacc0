pub mod config;
pub mod core;
pub mod dom;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use self::config::cli::CliConfig;

pub use self::config::settings::{Settings, WidgetOptions};
pub use self::config::toml_config::WidgetFileConfig;
pub use self::core::fetcher::HttpCourseFetcher;
pub use self::core::template::InlineTemplateProvider;
pub use self::core::widget::{render_course_widget, CourseWidget, RenderOutcome};
pub use self::dom::Document;
pub use self::utils::error::{Result, WidgetError};
