use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::types::map_reqwest_error;
use crate::{EngineSettings, FailureKind, RequestError, STREAM_PATH};

/// Incrementally readable response body.
pub type ByteStream = BoxStream<'static, Result<Bytes, RequestError>>;

/// Opens the long-lived event-stream request.
///
/// Dropping the returned stream releases the underlying connection.
#[async_trait::async_trait]
pub trait EventTransport: Send + Sync {
    async fn open(&self, bearer: &str) -> Result<ByteStream, RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: EngineSettings,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: EngineSettings) -> Result<Self, RequestError> {
        // No total timeout: the body stays open for the whole run.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl EventTransport for ReqwestTransport {
    async fn open(&self, bearer: &str) -> Result<ByteStream, RequestError> {
        let url = self.settings.endpoint(STREAM_PATH)?;
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error))
            .boxed())
    }
}
