//! Stable error identifiers surfaced to the presentation layer.
//!
//! Every variant maps to a fixed `code()` string so front ends can localise
//! messages without matching on free text.

use thiserror::Error;

/// A launch-form rule that did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("specialization is required")]
    SpecializationRequired,
    #[error("full name is required")]
    FullNameRequired,
    #[error("a resume must be on file before launching")]
    ResumeMissing,
    #[error("results limit must be a whole number between 1 and 100")]
    ResultsLimitOutOfRange,
    #[error("max applications must be a whole number between 1 and 100")]
    MaxApplicationsOutOfRange,
    #[error("page timeout must be a whole number of seconds between 5 and 120")]
    TimeoutOutOfRange,
    #[error("captcha wait must be a whole number of seconds between 0 and 900")]
    CaptchaWaitOutOfRange,
    #[error("slow-motion delay must be a whole number of milliseconds between 0 and 2000")]
    SlowMoOutOfRange,
}

impl ValidationError {
    pub fn code(self) -> &'static str {
        match self {
            Self::SpecializationRequired => "launch.specialization_required",
            Self::FullNameRequired => "launch.full_name_required",
            Self::ResumeMissing => "launch.resume_missing",
            Self::ResultsLimitOutOfRange => "launch.results_limit_range",
            Self::MaxApplicationsOutOfRange => "launch.max_applications_range",
            Self::TimeoutOutOfRange => "launch.timeout_range",
            Self::CaptchaWaitOutOfRange => "launch.captcha_wait_range",
            Self::SlowMoOutOfRange => "launch.slow_mo_range",
        }
    }
}

/// Failure class of a request-shaped operation (stream, poll, launch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    #[error("no credential available")]
    Unauthenticated,
    #[error("server answered with status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error")]
    Network,
    #[error("unexpected response from server")]
    InvalidResponse,
}

impl RequestFailure {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "request.unauthenticated",
            Self::HttpStatus(_) => "request.http_status",
            Self::Timeout => "request.timeout",
            Self::Network => "request.network",
            Self::InvalidResponse => "request.invalid_response",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("launch form is invalid ({} rule(s) violated)", .0.len())]
    Invalid(Vec<ValidationError>),
    #[error("a run is already in progress")]
    Busy,
    #[error("launch rejected: {0}")]
    Rejected(RequestFailure),
}

impl LaunchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "launch.invalid",
            Self::Busy => "launch.busy",
            Self::Rejected(_) => "launch.rejected",
        }
    }
}
