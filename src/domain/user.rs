use serde::{Deserialize, Serialize};

use crate::infra::store::Document;

/// Account record owned by the external account system. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
}

impl Document for UserProfile {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}
