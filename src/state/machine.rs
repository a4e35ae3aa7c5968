use super::error::{StateError, StateResult};
use super::{SessionEvent, SessionState, StateTransition};

#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    transition_history: Vec<StateTransition>,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn can_transition(&self, event: SessionEvent) -> bool {
        self.next_state(event).is_some()
    }

    /// A live session must be torn down before another login can succeed.
    pub fn next_state(&self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent::*;
        match (self.state, event) {
            (SessionState::Unauthenticated, LoginSucceeded) => Some(SessionState::Authenticated),
            (SessionState::Unauthenticated, LoginFailed) => Some(SessionState::Unauthenticated),
            (_, ClientTornDown) => Some(SessionState::Unauthenticated),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: SessionEvent) -> StateResult<SessionState> {
        tracing::debug!(from = ?self.state, event = ?event, "request session transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid session transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        self.transition_history
            .push(StateTransition::new(self.state, event, next));
        self.state = next;

        Ok(self.state)
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relogin_requires_teardown_first() {
        let mut machine = SessionMachine::new();
        machine
            .transition(SessionEvent::LoginSucceeded)
            .expect("first login should authenticate");

        assert!(!machine.can_transition(SessionEvent::LoginSucceeded));
        assert!(!machine.can_transition(SessionEvent::LoginFailed));
        assert!(machine.can_transition(SessionEvent::ClientTornDown));

        machine
            .transition(SessionEvent::ClientTornDown)
            .expect("teardown should always be accepted");
        assert!(machine.can_transition(SessionEvent::LoginSucceeded));
    }

    #[test]
    fn failed_login_keeps_session_unauthenticated() {
        let mut machine = SessionMachine::new();
        let state = machine
            .transition(SessionEvent::LoginFailed)
            .expect("failed login from idle is valid");

        assert_eq!(state, SessionState::Unauthenticated);
        assert_eq!(
            machine.history(),
            &[StateTransition::new(
                SessionState::Unauthenticated,
                SessionEvent::LoginFailed,
                SessionState::Unauthenticated,
            )]
        );
    }

    #[test]
    fn transition_records_history_in_order() {
        let mut machine = SessionMachine::new();
        for event in [
            SessionEvent::LoginSucceeded,
            SessionEvent::ClientTornDown,
            SessionEvent::LoginSucceeded,
        ] {
            machine.transition(event).expect("sequence should be valid");
        }

        assert_eq!(machine.state(), SessionState::Authenticated);
        assert_eq!(machine.history().len(), 3);
        assert_eq!(
            machine.history()[1],
            StateTransition::new(
                SessionState::Authenticated,
                SessionEvent::ClientTornDown,
                SessionState::Unauthenticated,
            )
        );
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = SessionMachine::new();
        machine
            .transition(SessionEvent::LoginSucceeded)
            .expect("login should work");

        let err = machine
            .transition(SessionEvent::LoginSucceeded)
            .expect_err("second login without teardown should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: SessionState::Authenticated,
                event: SessionEvent::LoginSucceeded,
            }
        ));
        assert_eq!(machine.state(), SessionState::Authenticated);
        assert_eq!(machine.history().len(), 1);
    }
}
