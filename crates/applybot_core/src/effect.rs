use crate::launch::LaunchParams;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitLaunch(LaunchParams),
    OpenStream,
    CloseStream,
    PollStatus,
}
