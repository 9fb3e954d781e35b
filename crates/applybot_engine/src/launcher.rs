use std::sync::Arc;

use applybot_core::LaunchParams;
use applybot_logging::applybot_info;

use crate::auth::{require_token, CredentialStore};
use crate::{JobApi, ProfileSummary, RequestError};

/// Submits validated launch parameters and reads launch prerequisites.
#[derive(Clone)]
pub struct JobLauncher {
    api: Arc<dyn JobApi>,
    credentials: Arc<dyn CredentialStore>,
    token_key: String,
}

impl JobLauncher {
    pub fn new(
        api: Arc<dyn JobApi>,
        credentials: Arc<dyn CredentialStore>,
        token_key: impl Into<String>,
    ) -> Self {
        Self {
            api,
            credentials,
            token_key: token_key.into(),
        }
    }

    pub async fn submit(&self, params: &LaunchParams) -> Result<(), RequestError> {
        let bearer = require_token(self.credentials.as_ref(), &self.token_key)?;
        applybot_info!(
            "Submitting job run: limit={} max_applications={}",
            params.results_limit,
            params.max_applications
        );
        self.api.start_job(&bearer, params).await
    }

    pub async fn profile(&self) -> Result<ProfileSummary, RequestError> {
        let bearer = require_token(self.credentials.as_ref(), &self.token_key)?;
        self.api.fetch_profile(&bearer).await
    }
}
