//! Application state
//!
//! This module contains:
//! - The explicit application state object passed to consumers (state.rs)
//! - Change notifications for subscribers (events.rs)

mod events;
mod state;

pub use events::{StateChange, StateObserver, SubscriptionId};
pub use state::AppState;
