//! Protocol Engine command handlers: one module per command group, a
//! shared `HandlerContext` carrying the capability seams, and the
//! `engine` dispatch loop that ties the group together.

pub mod article;
pub mod auth;
pub mod group;
pub mod ihave;
pub mod info;
pub mod post;
pub mod utils;

use crate::capabilities::{IdentityService, PersistenceService, PolicyService};

/// The capability seams every handler needs, borrowed for the duration of
/// one command dispatch. Carries no session state of its own — `Session`
/// is passed alongside by exclusive reference, per the "no handler
/// retains state across its own invocation" design note.
pub struct HandlerContext<'a> {
    pub persistence: &'a dyn PersistenceService,
    pub identity: &'a dyn IdentityService,
    pub policy: &'a dyn PolicyService,
}

impl<'a> HandlerContext<'a> {
    #[must_use]
    pub fn new(
        persistence: &'a dyn PersistenceService,
        identity: &'a dyn IdentityService,
        policy: &'a dyn PolicyService,
    ) -> Self {
        Self {
            persistence,
            identity,
            policy,
        }
    }
}

pub use utils::Disposition;
