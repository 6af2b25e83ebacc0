use thiserror::Error;

pub const MSG_UNREACHABLE: &str = "Unable to show courses";
pub const MSG_LOAD_FAILED: &str = "Failed to load courses.";
pub const MSG_TEMPLATE_FAILED: &str = "Failed to load course template.";

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("course widget requires a valid container element (target: {target})")]
    ContainerNotFound { target: String },

    #[error("course request could not be completed: {0}")]
    TransportFailure(#[from] reqwest::Error),

    #[error("course request failed with status {status}")]
    HttpStatusFailure { status: u16 },

    #[error("course response could not be decoded: {message}")]
    PayloadFailure { message: String },

    #[error("course card template not available: {message}")]
    TemplateResolutionFailure { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WidgetError {
    /// Placeholder text shown in the container when this error ends a render cycle.
    pub fn user_friendly_message(&self) -> &'static str {
        match self {
            WidgetError::TransportFailure(_) => MSG_UNREACHABLE,
            WidgetError::HttpStatusFailure { .. } | WidgetError::PayloadFailure { .. } => {
                MSG_LOAD_FAILED
            }
            WidgetError::TemplateResolutionFailure { .. } => MSG_TEMPLATE_FAILED,
            WidgetError::ContainerNotFound { .. } => "Course container not found",
            WidgetError::ConfigError { .. }
            | WidgetError::InvalidConfigValueError { .. }
            | WidgetError::IoError(_) => "Invalid widget configuration",
        }
    }

    /// True when the container already shows a placeholder for this error.
    pub fn is_render_cycle_failure(&self) -> bool {
        matches!(
            self,
            WidgetError::TransportFailure(_)
                | WidgetError::HttpStatusFailure { .. }
                | WidgetError::PayloadFailure { .. }
                | WidgetError::TemplateResolutionFailure { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;
