//! Derivation of the top-level route and mailbox sub-view

use serde::Serialize;

use super::Navigation;
use crate::compose::ComposeController;
use crate::mailbox::MailboxStore;
use crate::models::{Collection, MailId};
use crate::session::SessionStatus;

/// Sub-view inside the authenticated area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MailboxView {
    List,
    Detail(MailId),
}

/// Top-level route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Route {
    /// Neutral loading screen; no navigation decision yet
    Restoring,
    Unauthenticated,
    Authenticated(MailboxView),
}

/// Everything a renderer needs to pick what to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub route: Route,
    pub collection: Collection,
    /// Compose overlay, independent of list or detail
    pub compose_visible: bool,
    pub mailbox_loading: bool,
}

impl ViewState {
    pub fn is_detail(&self) -> bool {
        matches!(self.route, Route::Authenticated(MailboxView::Detail(_)))
    }
}

/// Compute the current view
///
/// Detail is shown only while the selected mail exists in the active
/// collection; a selection that vanished (e.g. after a reload) falls back
/// to the list.
pub fn derive_view(
    status: SessionStatus,
    navigation: &Navigation,
    mailbox: &MailboxStore,
    compose: &ComposeController,
) -> ViewState {
    let route = match status {
        SessionStatus::Restoring => Route::Restoring,
        SessionStatus::Unauthenticated => Route::Unauthenticated,
        SessionStatus::Authenticated => {
            let sub_view = navigation
                .selected()
                .filter(|id| mailbox.find(navigation.collection(), id).is_some())
                .map(|id| MailboxView::Detail(id.clone()))
                .unwrap_or(MailboxView::List);
            Route::Authenticated(sub_view)
        }
    };

    let authenticated = status == SessionStatus::Authenticated;

    ViewState {
        route,
        collection: navigation.collection(),
        compose_visible: authenticated && compose.is_visible(),
        mailbox_loading: authenticated && mailbox.is_loading(),
    }
}
