//! Mailbox data
//!
//! Holds the inbox and sent collections, loads them from the backend,
//! applies optimistic sends and filters them for search.

mod reconcile;
mod search;
mod store;

pub use reconcile::{dedupe_by_id, reconcile_sent};
pub use search::{matches_query, search};
pub use store::{LoadApplied, LoadOutcome, LoadRequest, MailboxStore, SendRequest};
