use applybot_core::{LaunchParams, StatusSnapshot};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::types::map_reqwest_error;
use crate::{
    EngineSettings, FailureKind, RequestError, PROFILE_PATH, START_PATH, STATUS_PATH,
};

/// Profile fields the launch form is pre-filled from. Other profile fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ProfileSummary {
    #[serde(default, rename = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub resume_filename: Option<String>,
}

impl ProfileSummary {
    pub fn has_resume(&self) -> bool {
        self.resume_filename
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

/// Request/response calls to the job backend.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    async fn start_job(&self, bearer: &str, params: &LaunchParams) -> Result<(), RequestError>;

    /// `None` when no job has ever run.
    async fn fetch_status(&self, bearer: &str) -> Result<Option<StatusSnapshot>, RequestError>;

    async fn fetch_profile(&self, bearer: &str) -> Result<ProfileSummary, RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobApi {
    settings: EngineSettings,
    client: reqwest::Client,
}

impl ReqwestJobApi {
    pub fn new(settings: EngineSettings) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn get_body(
        &self,
        path: &str,
        bearer: &str,
    ) -> Result<(StatusCode, bytes::Bytes), RequestError> {
        let response = self
            .client
            .get(self.settings.endpoint(path)?)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok((status, body))
    }
}

fn ensure_success(status: StatusCode) -> Result<(), RequestError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RequestError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn invalid(err: serde_json::Error) -> RequestError {
    RequestError::new(FailureKind::InvalidResponse, err.to_string())
}

#[async_trait::async_trait]
impl JobApi for ReqwestJobApi {
    async fn start_job(&self, bearer: &str, params: &LaunchParams) -> Result<(), RequestError> {
        let body = serde_json::to_vec(params)
            .map_err(|err| RequestError::new(FailureKind::InvalidResponse, err.to_string()))?;
        let response = self
            .client
            .post(self.settings.endpoint(START_PATH)?)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response.status())
    }

    async fn fetch_status(&self, bearer: &str) -> Result<Option<StatusSnapshot>, RequestError> {
        let (status, body) = self.get_body(STATUS_PATH, bearer).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ensure_success(status)?;

        let text = std::str::from_utf8(&body)
            .map_err(|err| RequestError::new(FailureKind::InvalidResponse, err.to_string()))?
            .trim();
        if text.is_empty() || text == "null" {
            return Ok(None);
        }
        serde_json::from_str(text).map(Some).map_err(invalid)
    }

    async fn fetch_profile(&self, bearer: &str) -> Result<ProfileSummary, RequestError> {
        let (status, body) = self.get_body(PROFILE_PATH, bearer).await?;
        ensure_success(status)?;
        serde_json::from_slice(&body).map_err(invalid)
    }
}
