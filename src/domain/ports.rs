use crate::core::template::CardTemplate;
use crate::domain::model::CourseEnvelope;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Retrieves the course envelope from a fully built request URL.
#[async_trait]
pub trait CourseFetcher: Send + Sync {
    async fn fetch(&self, request_url: &str) -> Result<CourseEnvelope>;
}

/// Yields the reusable card template. Failure aborts the render cycle.
pub trait TemplateProvider: Send + Sync {
    fn card_template(&self) -> Result<Arc<CardTemplate>>;
}
