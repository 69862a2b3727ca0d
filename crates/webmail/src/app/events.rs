//! Change notification for state consumers

use crate::compose::ComposeWindowState;
use crate::session::SessionStatus;

/// Which part of the application state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Session(SessionStatus),
    /// Mailbox items, loading flag or errors
    Mailbox,
    Compose(ComposeWindowState),
    /// Active collection or selection
    Navigation,
}

/// Receiver of state change notifications
///
/// Observers are called synchronously after each mutation, in subscription
/// order. They read the new state through the `AppState` they subscribed to.
pub trait StateObserver: Send + Sync {
    fn on_change(&self, change: StateChange);
}

impl<F> StateObserver for F
where
    F: Fn(StateChange) + Send + Sync,
{
    fn on_change(&self, change: StateChange) {
        self(change)
    }
}

/// Handle returned by `AppState::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
