use super::model::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoginSucceeded,
    LoginFailed,
    ClientTornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SessionState,
    pub event: SessionEvent,
    pub to: SessionState,
}

impl StateTransition {
    pub const fn new(from: SessionState, event: SessionEvent, to: SessionState) -> Self {
        Self { from, event, to }
    }
}
