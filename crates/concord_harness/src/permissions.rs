//! Deny-list permission double.

use std::collections::HashSet;

use concord_model::{Iid, Thing};
use concord_session::PermissionService;

/// Grants everything except writes to an explicit deny list.
#[derive(Debug, Default, Clone)]
pub struct StubPermissions {
    denied_writes: HashSet<Iid>,
}

impl StubPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_write(mut self, iid: Iid) -> Self {
        self.denied_writes.insert(iid);
        self
    }
}

impl PermissionService for StubPermissions {
    fn can_read(&self, _thing: &Thing) -> bool {
        true
    }

    fn can_write(&self, thing: &Thing) -> bool {
        !self.denied_writes.contains(&thing.iid())
    }
}
