//! Selection state within the authenticated mailbox

use crate::models::{Collection, MailId};

/// Active collection plus the selected mail, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    collection: Collection,
    selected: Option<MailId>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn selected(&self) -> Option<&MailId> {
        self.selected.as_ref()
    }

    /// Open a mail in the detail view
    pub fn select(&mut self, id: MailId) {
        self.selected = Some(id);
    }

    /// Leave the detail view
    pub fn back(&mut self) {
        self.selected = None;
    }

    /// Switch between inbox and sent. Always clears the selection.
    pub fn switch_collection(&mut self, collection: Collection) {
        self.collection = collection;
        self.selected = None;
    }

    /// Return to the inbox list
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
