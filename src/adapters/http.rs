use crate::domain::model::SubscriptionImportRecord;
use crate::domain::ports::SubscriptionSink;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct BulkInsertResponse {
    inserted: Option<usize>,
}

/// 透過後端 API 批次新增訂閱
#[derive(Debug, Clone)]
pub struct HttpSubscriptionSink {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSubscriptionSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        self.timeout = seconds.map(Duration::from_secs);
        self
    }

    pub fn bulk_url(&self) -> String {
        format!("{}/subscriptions/bulk", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl SubscriptionSink for HttpSubscriptionSink {
    async fn bulk_add(&self, records: &[SubscriptionImportRecord]) -> Result<usize> {
        let url = self.bulk_url();
        tracing::debug!("POST {} ({} records)", url, records.len());

        let mut request = self.client.post(&url).json(records);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Bulk insert response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PipelineError::BulkInsertFailed {
                status: status.as_u16(),
                message,
            });
        }

        // 回應內容不完整時以送出筆數為準
        let body = response.text().await?;
        let inserted = serde_json::from_str::<BulkInsertResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.inserted)
            .unwrap_or(records.len());
        Ok(inserted)
    }
}
