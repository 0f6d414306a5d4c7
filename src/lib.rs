pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;

use crate::app::identity::IdentityService;
use crate::domain::{tip::Tip, user::UserProfile};
use crate::infra::store::{DocumentStore, MemoryDocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub tips: Arc<dyn DocumentStore<Tip>>,
    pub users: Arc<dyn DocumentStore<UserProfile>>,
    pub identity: IdentityService,
    pub admin_token: Option<String>,
}

impl AppState {
    /// State backed by fresh in-process collections.
    pub fn in_memory(identity: IdentityService, admin_token: Option<String>) -> Self {
        Self {
            tips: Arc::new(MemoryDocumentStore::<Tip>::new()),
            users: Arc::new(MemoryDocumentStore::<UserProfile>::new()),
            identity,
            admin_token,
        }
    }
}
