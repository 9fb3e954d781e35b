use applybot_core::{update, AppState, AppViewModel, Effect, Msg};
use applybot_logging::{applybot_debug, applybot_info, applybot_warn};
use tokio::sync::mpsc;

use super::effects::EffectRunner;
use super::render::Renderer;

/// When the loop hands control back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Nothing in flight any more: no stream, no launch, no pending request.
    Settled,
    /// The launch request has been answered (or refused locally).
    LaunchDecided,
}

/// Drives the core state machine: messages in, effects out, lines rendered on change.
pub struct App {
    state: AppState,
    effects: EffectRunner,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    renderer: Renderer,
    policy: ExitPolicy,
    pending_requests: usize,
    launch_decided: bool,
}

impl App {
    pub fn new(
        effects: EffectRunner,
        msg_rx: mpsc::UnboundedReceiver<Msg>,
        policy: ExitPolicy,
    ) -> Self {
        Self {
            state: AppState::new(),
            effects,
            msg_rx,
            renderer: Renderer::new(),
            policy,
            pending_requests: 0,
            launch_decided: false,
        }
    }

    /// Direct status poll, applied before anything else is sent.
    pub async fn hydrate(&mut self) {
        let msg = match self.effects.engine().poller.poll().await {
            Ok(snapshot) => Msg::PollCompleted(snapshot),
            Err(err) => {
                applybot_warn!("Initial status poll failed: {}", err);
                Msg::PollFailed(err.failure())
            }
        };
        self.step(msg).await;
    }

    /// Applies one message and runs whatever it asks for.
    pub async fn step(&mut self, msg: Msg) {
        match &msg {
            Msg::PollCompleted(_) | Msg::PollFailed(_) | Msg::LaunchAccepted
            | Msg::LaunchRejected(_) => {
                self.pending_requests = self.pending_requests.saturating_sub(1);
            }
            _ => {}
        }
        let launch_msg = matches!(
            msg,
            Msg::LaunchRequested(_) | Msg::LaunchAccepted | Msg::LaunchRejected(_)
        );

        let (effects, dirty) = self.apply(msg);

        if launch_msg && !self.state.is_launching() {
            self.launch_decided = true;
            if self.policy == ExitPolicy::LaunchDecided {
                applybot_debug!("Launch decided; leaving follow-up effects to the next session");
                if dirty {
                    self.render();
                }
                return;
            }
        }

        self.pending_requests += effects
            .iter()
            .filter(|effect| matches!(effect, Effect::PollStatus | Effect::SubmitLaunch(_)))
            .count();
        self.effects.run(effects).await;

        if dirty {
            self.render();
        }
    }

    /// Processes messages until the exit policy is met or Ctrl-C arrives.
    pub async fn run(&mut self) -> AppViewModel {
        while !self.is_done() {
            tokio::select! {
                maybe_msg = self.msg_rx.recv() => match maybe_msg {
                    Some(msg) => self.step(msg).await,
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    applybot_info!("Interrupted; closing the stream");
                    break;
                }
            }
        }
        self.shutdown().await;
        self.state.view()
    }

    fn is_done(&self) -> bool {
        match self.policy {
            ExitPolicy::Settled => self.state.view().is_settled() && self.pending_requests == 0,
            ExitPolicy::LaunchDecided => self.launch_decided,
        }
    }

    /// Releases the stream, then folds in what the engine reported while closing.
    /// Effects raised by those late messages are dropped.
    async fn shutdown(&mut self) {
        let (effects, dirty) = self.apply(Msg::Teardown);
        self.effects.run(effects).await;
        let mut dirty = dirty;
        while let Ok(msg) = self.msg_rx.try_recv() {
            let (_, changed) = self.apply(msg);
            dirty |= changed;
        }
        if dirty {
            self.render();
        }
    }

    fn apply(&mut self, msg: Msg) -> (Vec<Effect>, bool) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        (effects, dirty)
    }

    fn render(&mut self) {
        let view = self.state.view();
        for line in self.renderer.render(&view) {
            println!("{line}");
        }
    }
}
