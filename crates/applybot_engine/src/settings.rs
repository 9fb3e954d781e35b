use std::time::Duration;

use url::Url;

use crate::{FailureKind, RequestError};

pub const STREAM_PATH: &str = "api/search_stream";
pub const STATUS_PATH: &str = "api/search_status";
pub const START_PATH: &str = "api/start_search";
pub const PROFILE_PATH: &str = "api/profile";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub base_url: String,
    /// Key under which the bearer token is stored.
    pub token_key: String,
    pub connect_timeout: Duration,
    /// Total timeout for request/response calls. The stream only uses the connect timeout.
    pub request_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            token_key: "access_token".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineSettings {
    /// Resolve an endpoint path against `base_url`, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|url| url.join(path))
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let settings = EngineSettings {
            base_url: "https://api.example.com/v1".to_string(),
            ..EngineSettings::default()
        };
        assert_eq!(
            settings.endpoint(STREAM_PATH).unwrap().as_str(),
            "https://api.example.com/v1/api/search_stream"
        );
    }

    #[test]
    fn invalid_base_is_reported() {
        let settings = EngineSettings {
            base_url: "not a url".to_string(),
            ..EngineSettings::default()
        };
        let err = settings.endpoint(STATUS_PATH).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
