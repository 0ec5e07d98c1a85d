use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tokio::time::sleep;

use super::Gateway;
use super::error::GatewayError;
use super::types::{BackendConfig, ImageFile, ReadingResponse};

/// Gateway backed by HTTP services, with a local stand-in for each call.
///
/// The strategy is picked per call from the [`BackendConfig`] it receives, so
/// a toggle never reaches a call that is already in flight.
pub struct HttpGateway {
    client: Client,
    mock_delay: Duration,
}

impl HttpGateway {
    pub fn new(mock_delay: Duration, request_timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client, mock_delay })
    }

    /// Stand-in for the removal service: waits, then hands the input back.
    async fn sever_mock(&self, file: &ImageFile) -> Vec<u8> {
        sleep(self.mock_delay).await;
        file.bytes.clone()
    }

    async fn sever_live(&self, file: &ImageFile, url: &str) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .client
            .post(url)
            .multipart(upload_form(file)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::remote(status));
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn describe_live(
        &self,
        file: &ImageFile,
        config: &BackendConfig,
    ) -> Result<String, GatewayError> {
        let url = config.describe_url.as_deref().ok_or_else(|| {
            GatewayError::DescriptionUnavailable("no description service configured".into())
        })?;

        let response = self
            .client
            .post(url)
            .multipart(upload_form(file)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::remote(status));
        }

        let body = response.json::<ReadingResponse>().await?;
        let reading = body.reading.trim();
        if reading.is_empty() {
            return Err(GatewayError::DescriptionUnavailable("blank reading".into()));
        }
        Ok(reading.to_string())
    }
}

impl Gateway for HttpGateway {
    async fn remove_background(
        &self,
        file: &ImageFile,
        config: &BackendConfig,
    ) -> Result<Vec<u8>, GatewayError> {
        if config.use_mock {
            tracing::debug!(file = %file.name, delay_ms = self.mock_delay.as_millis() as u64, "mock severing");
            return Ok(self.sever_mock(file).await);
        }
        tracing::debug!(file = %file.name, url = %config.server_url, "live severing");
        self.sever_live(file, &config.server_url).await
    }

    async fn describe(&self, file: &ImageFile, config: &BackendConfig) -> Option<String> {
        let result = if config.use_mock {
            Ok(mock_reading(file))
        } else {
            self.describe_live(file, config).await
        };

        match result {
            Ok(reading) => Some(reading),
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "no reading for this ritual");
                None
            }
        }
    }
}

/// Multipart body with the image under the single field `file`.
fn upload_form(file: &ImageFile) -> Result<Form, GatewayError> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.mime)?;
    Ok(Form::new().part("file", part))
}

/// Deterministic caption used when no real description service is involved.
fn mock_reading(file: &ImageFile) -> String {
    format!(
        "A presence of {} bytes stirs within {}...",
        file.bytes.len(),
        file.name
    )
}
