use std::sync::Arc;

use applybot_core::StatusSnapshot;
use applybot_logging::applybot_debug;

use crate::auth::{require_token, CredentialStore};
use crate::{JobApi, RequestError};

/// One-shot status fetch used for hydration and recovery.
#[derive(Clone)]
pub struct StatusPoller {
    api: Arc<dyn JobApi>,
    credentials: Arc<dyn CredentialStore>,
    token_key: String,
}

impl StatusPoller {
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

    /// "No job has ever run" comes back as an idle snapshot, not an error.
    pub async fn poll(&self) -> Result<StatusSnapshot, RequestError> {
        let bearer = require_token(self.credentials.as_ref(), &self.token_key)?;
        match self.api.fetch_status(&bearer).await? {
            Some(snapshot) => {
                applybot_debug!("Polled status: {}", snapshot.state.as_str());
                Ok(snapshot)
            }
            None => {
                applybot_debug!("Polled status: no job on record");
                Ok(StatusSnapshot::idle())
            }
        }
    }
}
