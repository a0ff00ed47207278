use crate::ports::{HealthProbe, ProbeError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Probes `GET {url}{health_endpoint}`; only a 200 counts as healthy.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: Client,
}

impl HttpHealthProbe {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, health_url: &str) -> Result<(), ProbeError> {
        let response = self.client.get(health_url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout
            } else {
                ProbeError::Unreachable(e.to_string())
            }
        })?;

        match response.status().as_u16() {
            200 => Ok(()),
            other => Err(ProbeError::Status(other)),
        }
    }
}
