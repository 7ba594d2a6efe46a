//! Job read-access rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::Job;

/// Identity of whoever is asking. Both fields optional: an anonymous
/// caller carries neither.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            tenant_id: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }
}

/// Pure access decision. Jobs submitted without any identity are public;
/// otherwise the caller must match the owner or share the tenant.
pub fn can_access(caller: &Caller, job: &Job) -> bool {
    if job.owner_id.is_none() && job.tenant_id.is_none() {
        return true;
    }
    if let (Some(user), Some(owner)) = (caller.user_id, job.owner_id) {
        if user == owner {
            return true;
        }
    }
    if let (Some(tenant), Some(job_tenant)) = (caller.tenant_id, job.tenant_id) {
        if tenant == job_tenant {
            return true;
        }
    }
    false
}
