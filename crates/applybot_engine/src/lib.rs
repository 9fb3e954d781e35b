//! Applybot engine: transport, stream session and request/response calls.
mod api;
mod auth;
mod engine;
mod launcher;
mod poller;
mod session;
mod settings;
mod transport;
mod types;

pub use api::{JobApi, ProfileSummary, ReqwestJobApi};
pub use auth::{CredentialStore, MemoryCredentials};
pub use engine::Engine;
pub use launcher::JobLauncher;
pub use poller::StatusPoller;
pub use session::{ChannelSink, StreamSession, StreamSink};
pub use settings::{EngineSettings, PROFILE_PATH, START_PATH, STATUS_PATH, STREAM_PATH};
pub use transport::{ByteStream, EventTransport, ReqwestTransport};
pub use types::{FailureKind, Flow, RequestError, SessionPhase, StartOutcome, StreamEnd};
