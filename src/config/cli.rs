use crate::config::settings::{CourseId, CourseType, Scalar, WidgetOptions};
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "course-widget")]
#[command(about = "Render the course widget into a headless document and print the HTML")]
pub struct CliConfig {
    /// Path to a TOML widget configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Course endpoint (defaults to the public course API)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Public token appended to the endpoint path
    #[arg(long)]
    pub token: Option<String>,

    /// Course types to show, comma separated
    #[arg(long, value_delimiter = ',')]
    pub course_type: Vec<String>,

    /// Single course id to show (ignored when course types are given)
    #[arg(long)]
    pub course_id: Option<String>,

    /// Include courses whose registration window is not open
    #[arg(long)]
    pub show_closed: bool,

    /// Do not render course descriptions
    #[arg(long)]
    pub hide_description: bool,

    /// Card width override, e.g. 320px
    #[arg(long)]
    pub card_width: Option<String>,

    /// Card alignment: left, center or right
    #[arg(long)]
    pub card_align: Option<String>,

    /// Write the rendered HTML to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Options given on the command line. Flags that were not passed stay
    /// unset so file values and defaults show through.
    pub fn widget_options(&self) -> WidgetOptions {
        WidgetOptions {
            container: None,
            course_id: self
                .course_id
                .as_ref()
                .map(|id| CourseId::One(Scalar::Text(id.clone()))),
            course_type: (!self.course_type.is_empty())
                .then(|| CourseType::Many(self.course_type.clone())),
            public_token: self.token.clone(),
            show_description: self.hide_description.then_some(false),
            show_closed: self.show_closed.then_some(true),
            card_width: self.card_width.clone().map(Scalar::Text),
            card_align: self.card_align.clone(),
        }
    }
}
