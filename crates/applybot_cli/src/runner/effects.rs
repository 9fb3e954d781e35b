use std::sync::Arc;

use applybot_core::{Effect, Msg, StreamOutcome};
use applybot_engine::{ChannelSink, Engine, StartOutcome};
use applybot_logging::{applybot_debug, applybot_info, applybot_warn};
use tokio::sync::mpsc;

/// Executes core effects against the engine; results come back as `Msg`s.
pub struct EffectRunner {
    engine: Engine,
    msg_tx: mpsc::UnboundedSender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: Engine, msg_tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self { engine, msg_tx }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub async fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream => self.open_stream(),
                Effect::CloseStream => {
                    applybot_debug!("Closing event stream");
                    self.engine.session.stop().await;
                }
                Effect::PollStatus => self.spawn_poll(),
                Effect::SubmitLaunch(params) => {
                    let launcher = self.engine.launcher.clone();
                    let tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let msg = match launcher.submit(&params).await {
                            Ok(()) => {
                                applybot_info!("Launch accepted");
                                Msg::LaunchAccepted
                            }
                            Err(err) => {
                                applybot_warn!("Launch rejected: {}", err);
                                Msg::LaunchRejected(err.failure())
                            }
                        };
                        let _ = tx.send(msg);
                    });
                }
            }
        }
    }

    fn open_stream(&mut self) {
        let sink = Arc::new(ChannelSink::new(self.msg_tx.clone()));
        match self.engine.session.start(sink) {
            Ok(StartOutcome::Started) => applybot_debug!("Event stream starting"),
            Ok(StartOutcome::AlreadyActive) => {
                applybot_debug!("Event stream already active; open ignored");
            }
            Err(err) => {
                applybot_warn!("Event stream could not start: {}", err);
                let _ = self
                    .msg_tx
                    .send(Msg::StreamClosed(StreamOutcome::Failed(err.failure())));
            }
        }
    }

    fn spawn_poll(&self) {
        let poller = self.engine.poller.clone();
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let msg = match poller.poll().await {
                Ok(snapshot) => Msg::PollCompleted(snapshot),
                Err(err) => {
                    applybot_warn!("Status poll failed: {}", err);
                    Msg::PollFailed(err.failure())
                }
            };
            let _ = tx.send(msg);
        });
    }
}
