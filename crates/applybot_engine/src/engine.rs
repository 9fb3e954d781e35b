use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::transport::{EventTransport, ReqwestTransport};
use crate::{
    EngineSettings, JobApi, JobLauncher, RequestError, ReqwestJobApi, StatusPoller, StreamSession,
};

/// Everything a front end needs to drive one client: the single stream
/// session plus the request/response helpers sharing its credentials.
pub struct Engine {
    pub session: StreamSession,
    pub poller: StatusPoller,
    pub launcher: JobLauncher,
}

impl Engine {
    /// HTTP-backed engine.
    pub fn new(
        settings: EngineSettings,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, RequestError> {
        let transport = Arc::new(ReqwestTransport::new(settings.clone())?);
        let api = Arc::new(ReqwestJobApi::new(settings.clone())?);
        Ok(Self::from_parts(transport, api, credentials, &settings.token_key))
    }

    pub fn from_parts(
        transport: Arc<dyn EventTransport>,
        api: Arc<dyn JobApi>,
        credentials: Arc<dyn CredentialStore>,
        token_key: &str,
    ) -> Self {
        Self {
            session: StreamSession::new(transport, credentials.clone(), token_key),
            poller: StatusPoller::new(api.clone(), credentials.clone(), token_key),
            launcher: JobLauncher::new(api, credentials, token_key),
        }
    }
}
