use crate::config::settings::WidgetOptions;
use crate::core::url_builder::DEFAULT_BASE_URL;
use crate::utils::error::{Result, WidgetError};
use crate::utils::validation::{validate_path_segment, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Widget configuration file:
///
/// ```toml
/// endpoint = "https://onbeat.dance/api/get_courses"
///
/// [widget]
/// container = "#courses"
/// public_token = "${ONBEAT_PUBLIC_TOKEN}"
/// course_type = ["beginner"]
/// show_closed = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetFileConfig {
    pub endpoint: Option<String>,
    pub widget: WidgetOptions,
}

impl WidgetFileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WidgetError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ONBEAT_PUBLIC_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WidgetError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 取得 API 端點
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

impl Validate for WidgetFileConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", self.endpoint())?;
        if let Some(token) = &self.widget.public_token {
            validate_path_segment("widget.public_token", token)?;
        }
        Ok(())
    }
}
