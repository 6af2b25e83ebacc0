use clap::Parser;
use course_widget::utils::{logger, validation::Validate};
use course_widget::{CliConfig, CourseWidget, Document, WidgetFileConfig, WidgetOptions};

const CONTAINER_ID: &str = "courses";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.json_logs);

    tracing::info!("Starting course-widget CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let mut file_config = match &config.config {
        Some(path) => match WidgetFileConfig::from_file(path) {
            Ok(file_config) => file_config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => WidgetFileConfig::default(),
    };

    // 命令列參數優先於設定檔
    if let Some(endpoint) = &config.endpoint {
        file_config.endpoint = Some(endpoint.clone());
    }
    file_config.widget = config.widget_options().merge_over(&file_config.widget);

    if let Err(e) = file_config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if let Some(container) = &file_config.widget.container {
        tracing::debug!("Ignoring configured container '{}', rendering into #{}", container, CONTAINER_ID);
    }

    let document = Document::new();
    let container = document.create_element("div");
    document.set_id(container, CONTAINER_ID);
    document.append_child(document.body(), container);

    let options = WidgetOptions {
        container: Some(container.into()),
        ..file_config.widget.clone()
    };
    let widget = CourseWidget::new(document.clone()).with_endpoint(file_config.endpoint());
    let result = widget.load(options).await;

    let html = document.to_html(document.root());
    match &config.output {
        Some(path) => {
            std::fs::write(path, &html)?;
            tracing::info!("📁 Output saved to: {}", path);
        }
        None => println!("{}", html),
    }

    match result {
        Ok(outcome) => {
            tracing::info!(
                "✅ Rendered {} of {} courses from {}",
                outcome.rendered,
                outcome.fetched,
                outcome.request_url
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Course widget failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    }
}
