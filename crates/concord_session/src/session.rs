//! Loaded-thing cache and write endpoint.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use concord_model::{ClassKind, Iid, Thing};

use crate::error::SessionError;
use crate::permission::{OpenAccess, PermissionService};
use crate::transaction::{OperationContainer, OperationKind};

/// Handle to an active row subscription; released via
/// [`Session::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The client-side cache of every thing currently loaded from the server,
/// plus the permission port and the row-subscription registry.
///
/// Catalog queries sort by label so candidate lists and default selections
/// are deterministic regardless of load order.
pub struct Session {
    cache: HashMap<Iid, Thing>,
    permissions: Box<dyn PermissionService>,
    next_subscription: u64,
    subscriptions: HashMap<SubscriptionId, Iid>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_permissions(Box::new(OpenAccess))
    }

    pub fn with_permissions(permissions: Box<dyn PermissionService>) -> Self {
        Self {
            cache: HashMap::new(),
            permissions,
            next_subscription: 0,
            subscriptions: HashMap::new(),
        }
    }

    // ── cache ─────────────────────────────────────────────────────

    /// Load (or replace) a thing in the cache.
    pub fn insert(&mut self, thing: Thing) {
        self.cache.insert(thing.iid(), thing);
    }

    pub fn get(&self, iid: Iid) -> Option<&Thing> {
        self.cache.get(&iid)
    }

    pub fn require(&self, iid: Iid) -> Result<&Thing, SessionError> {
        self.get(iid).ok_or(SessionError::NotFound(iid))
    }

    pub fn contains(&self, iid: Iid) -> bool {
        self.cache.contains_key(&iid)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    // ── catalog queries ───────────────────────────────────────────

    /// All loaded things of `kind`, label-sorted (ties broken by iid).
    pub fn things_of_class(&self, kind: ClassKind) -> Vec<&Thing> {
        let mut things: Vec<&Thing> =
            self.cache.values().filter(|t| t.class() == kind).collect();
        things.sort_by(|a, b| a.label().cmp(&b.label()).then(a.iid().cmp(&b.iid())));
        things
    }

    /// All loaded reference libraries (classes carrying a library chain).
    pub fn open_reference_libraries(&self) -> Vec<&Thing> {
        let mut things: Vec<&Thing> = self
            .cache
            .values()
            .filter(|t| t.class().def().library_chain)
            .collect();
        things.sort_by(|a, b| a.label().cmp(&b.label()).then(a.iid().cmp(&b.iid())));
        things
    }

    /// Transitive closure of the `required_library` reference starting from
    /// (and excluding) `start`. Cycle-safe.
    pub fn required_library_chain(&self, start: Iid) -> Vec<Iid> {
        let mut chain = Vec::new();
        let mut visited: HashSet<Iid> = HashSet::from([start]);
        let mut current = start;
        while let Some(thing) = self.get(current) {
            if !thing.class().def().library_chain {
                break;
            }
            let Ok(Some(next)) = thing.reference("required_library") else {
                break;
            };
            if !visited.insert(next) {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    // ── permissions ───────────────────────────────────────────────

    pub fn can_read(&self, thing: &Thing) -> bool {
        self.permissions.can_read(thing)
    }

    pub fn can_write(&self, thing: &Thing) -> bool {
        self.permissions.can_write(thing)
    }

    // ── row subscriptions ─────────────────────────────────────────

    /// Register interest in change notifications for `iid`. Row view-models
    /// hold the returned id and must release it on dispose.
    pub fn subscribe(&mut self, iid: Iid) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscriptions.insert(id, iid);
        id
    }

    /// Release a subscription. Returns whether it was still active.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    // ── write endpoint ────────────────────────────────────────────

    /// Apply a finalized transaction to the cache.
    ///
    /// Creates insert at revision 1; updates replace the cached thing and
    /// bump its revision; deletes remove the thing and its contained subtree.
    /// The container is applied in operation order and is not atomic: a
    /// failed operation leaves earlier ones applied, mirroring the server's
    /// per-operation processing.
    pub fn write(&mut self, container: OperationContainer) -> Result<(), SessionError> {
        debug!(
            context = %container.context,
            operations = container.operations.len(),
            "applying operation container"
        );
        for op in container.operations {
            let iid = op.thing.iid();
            match op.kind {
                OperationKind::Create => {
                    if self.cache.contains_key(&iid) {
                        return Err(SessionError::Conflict {
                            iid,
                            reason: "create of an already-loaded thing".into(),
                        });
                    }
                    let mut thing = op.thing;
                    thing.bump_revision();
                    self.cache.insert(iid, thing);
                }
                OperationKind::Update => {
                    let existing = self.cache.get(&iid).ok_or(SessionError::NotFound(iid))?;
                    let revision = existing.revision_number();
                    let mut thing = op.thing;
                    while thing.revision_number() <= revision {
                        thing.bump_revision();
                    }
                    self.cache.insert(iid, thing);
                }
                OperationKind::Delete => {
                    let container = op.thing.container();
                    self.remove_subtree(iid)?;
                    // detach the dangling iid from the cached container
                    if let Some(parent) = container.and_then(|c| self.cache.get_mut(&c)) {
                        for def in parent.class().def().containments {
                            parent.containment_mut(def.key)?.retain(|x| *x != iid);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn remove_subtree(&mut self, iid: Iid) -> Result<(), SessionError> {
        let thing = self.cache.remove(&iid).ok_or(SessionError::NotFound(iid))?;
        let children: Vec<Iid> = thing.contained_iids().collect();
        for child in children {
            // Children created in the same transaction may never have been
            // loaded; missing ones are already gone.
            if self.cache.contains_key(&child) {
                self.remove_subtree(child)?;
            }
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cached", &self.cache.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_model::ClassKind;
    use pretty_assertions::assert_eq;

    fn named(class: ClassKind, name: &str) -> Thing {
        let mut thing = Thing::new(class);
        thing.set_text("name", name).unwrap();
        thing.set_text("short_name", name).unwrap();
        thing
    }

    // ── catalog queries ───────────────────────────────────────────

    #[test]
    fn things_of_class_sorts_by_label() {
        let mut session = Session::new();
        for name in ["zulu", "alpha", "mike"] {
            session.insert(named(ClassKind::Glossary, name));
        }
        session.insert(named(ClassKind::Term, "stray"));

        let labels: Vec<String> = session
            .things_of_class(ClassKind::Glossary)
            .iter()
            .map(|t| t.label())
            .collect();
        assert_eq!(labels, vec!["alpha", "mike", "zulu"]);
    }

    #[test]
    fn required_library_chain_walks_transitively_and_stops_on_cycles() {
        let mut session = Session::new();
        let mut a = named(ClassKind::SiteReferenceDataLibrary, "a");
        let mut b = named(ClassKind::SiteReferenceDataLibrary, "b");
        let c = named(ClassKind::SiteReferenceDataLibrary, "c");
        let (ia, ib, ic) = (a.iid(), b.iid(), c.iid());
        a.set_reference("required_library", Some(ib)).unwrap();
        b.set_reference("required_library", Some(ic)).unwrap();
        session.insert(a);
        session.insert(b);
        session.insert(c);

        assert_eq!(session.required_library_chain(ia), vec![ib, ic]);

        // close the loop: c -> a
        let mut c2 = session.get(ic).unwrap().clone();
        c2.set_reference("required_library", Some(ia)).unwrap();
        session.insert(c2);
        assert_eq!(session.required_library_chain(ia), vec![ib, ic]);
    }

    // ── subscriptions ─────────────────────────────────────────────

    #[test]
    fn unsubscribe_is_single_shot() {
        let mut session = Session::new();
        let id = session.subscribe(Iid::new());
        assert_eq!(session.subscription_count(), 1);
        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        assert_eq!(session.subscription_count(), 0);
    }

    // ── write endpoint ────────────────────────────────────────────

    #[test]
    fn write_bumps_revisions() {
        use crate::transaction::{Operation, OperationContainer, OperationKind};

        let mut session = Session::new();
        let glossary = named(ClassKind::Glossary, "g");
        let iid = glossary.iid();

        session
            .write(OperationContainer {
                context: iid,
                operations: vec![Operation { kind: OperationKind::Create, thing: glossary.clone() }],
            })
            .unwrap();
        assert_eq!(session.get(iid).unwrap().revision_number(), 1);

        let mut edited = session.get(iid).unwrap().clone();
        edited.set_text("name", "renamed").unwrap();
        session
            .write(OperationContainer {
                context: iid,
                operations: vec![Operation { kind: OperationKind::Update, thing: edited }],
            })
            .unwrap();
        let after = session.get(iid).unwrap();
        assert_eq!(after.revision_number(), 2);
        assert_eq!(after.text("name").unwrap(), "renamed");
    }

    #[test]
    fn delete_removes_contained_subtree() {
        use crate::transaction::{Operation, OperationContainer, OperationKind};

        let mut session = Session::new();
        let mut glossary = named(ClassKind::Glossary, "g");
        let term = named(ClassKind::Term, "t");
        glossary.containment_mut("term").unwrap().push(term.iid());
        let (gi, ti) = (glossary.iid(), term.iid());
        session.insert(glossary.clone());
        session.insert(term);

        session
            .write(OperationContainer {
                context: gi,
                operations: vec![Operation { kind: OperationKind::Delete, thing: glossary }],
            })
            .unwrap();
        assert!(!session.contains(gi));
        assert!(!session.contains(ti));
    }
}
