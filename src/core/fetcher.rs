use crate::domain::model::CourseEnvelope;
use crate::domain::ports::CourseFetcher;
use crate::utils::error::{Result, WidgetError};
use async_trait::async_trait;
use reqwest::Client;

/// Fetches courses over HTTP. The client keeps no cookie store, so no
/// host-page credentials ever reach the course endpoint. One attempt per
/// call and no timeout beyond the transport default.
#[derive(Debug, Clone, Default)]
pub struct HttpCourseFetcher {
    client: Client,
}

impl HttpCourseFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CourseFetcher for HttpCourseFetcher {
    async fn fetch(&self, request_url: &str) -> Result<CourseEnvelope> {
        tracing::debug!("Making course request to: {}", request_url);
        let response = self.client.get(request_url).send().await?;

        let status = response.status();
        tracing::debug!("Course response status: {}", status);
        if !status.is_success() {
            return Err(WidgetError::HttpStatusFailure {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<CourseEnvelope>(&body).map_err(|e| WidgetError::PayloadFailure {
            message: e.to_string(),
        })
    }
}
