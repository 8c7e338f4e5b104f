//! Optimistic mutations over a locally held list.
//!
//! Every mutation applies its change to the local entries first, then awaits
//! the remote call. A successful call commits the server's version of the
//! item; a failed one undoes only what that mutation changed, so mutations on
//! other ids that resolved in the meantime keep their results. A refresh that
//! lands while a mutation is in flight is server truth and is never undone.
//!
//! The engine is single-threaded: state lives in `RefCell`s and no borrow is
//! held across an `.await`.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;

use crate::client::errors::{MutationError, Operation, SyncError};

/// Remote side of an optimistic list.
#[async_trait(?Send)]
pub trait RemoteCollection {
    type Id: Clone + Debug + Eq + Hash;
    type Item: Clone;
    /// Payload of a create call.
    type Draft;
    /// Payload of an update call.
    type Patch;

    async fn create(&self, draft: &Self::Draft) -> Result<Self::Item, SyncError>;
    async fn update(&self, id: &Self::Id, patch: &Self::Patch) -> Result<Self::Item, SyncError>;
    async fn delete(&self, id: &Self::Id) -> Result<(), SyncError>;

    fn id_of(&self, item: &Self::Item) -> Self::Id;
    /// Local stand-in shown while a create is in flight.
    fn placeholder(&self, draft: &Self::Draft) -> Self::Item;
    /// Applies a patch to a local copy of an item.
    fn merge(&self, item: &mut Self::Item, patch: &Self::Patch);
}

/// Key of an entry that has not been confirmed by the server yet.
pub type TempId = u64;

/// Identity of a list entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryKey<Id> {
    Persisted(Id),
    Temporary(TempId),
}

impl<Id> EntryKey<Id> {
    pub fn is_temporary(&self) -> bool {
        matches!(self, EntryKey::Temporary(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry<T, Id> {
    pub key: EntryKey<Id>,
    pub item: T,
    /// Set while the entry reflects a change the server has not confirmed.
    pub optimistic: bool,
}

type EntriesOf<R> = Vec<Entry<<R as RemoteCollection>::Item, <R as RemoteCollection>::Id>>;

/// Releases the pending slot of a mutation when it finishes or is dropped.
struct PendingGuard<'a, Id: Eq + Hash> {
    ids: &'a RefCell<HashSet<Id>>,
    in_flight: &'a Cell<usize>,
    id: Option<Id>,
}

impl<Id: Eq + Hash> Drop for PendingGuard<'_, Id> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.ids.borrow_mut().remove(&id);
        }
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
    }
}

pub struct OptimisticList<R: RemoteCollection> {
    remote: R,
    entries: RefCell<EntriesOf<R>>,
    pending: RefCell<HashSet<R::Id>>,
    in_flight: Cell<usize>,
    next_temp: Cell<TempId>,
    /// Bumped by every `replace`.
    revision: Cell<u64>,
}

impl<R: RemoteCollection> OptimisticList<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            entries: RefCell::new(Vec::new()),
            pending: RefCell::new(HashSet::new()),
            in_flight: Cell::new(0),
            next_temp: Cell::new(1),
            revision: Cell::new(0),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Replaces every entry with confirmed server items.
    pub fn replace(&self, items: Vec<R::Item>) {
        let entries = items
            .into_iter()
            .map(|item| Entry {
                key: EntryKey::Persisted(self.remote.id_of(&item)),
                item,
                optimistic: false,
            })
            .collect();
        *self.entries.borrow_mut() = entries;
        self.revision.set(self.revision.get() + 1);
    }

    pub fn items(&self) -> Vec<R::Item> {
        self.entries.borrow().iter().map(|e| e.item.clone()).collect()
    }

    pub fn entries(&self) -> EntriesOf<R> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of mutations awaiting the server.
    pub fn pending_count(&self) -> usize {
        self.in_flight.get()
    }

    /// Whether an update or delete of `id` is awaiting the server.
    pub fn is_pending(&self, id: &R::Id) -> bool {
        self.pending.borrow().contains(id)
    }

    /// Appends a placeholder for `draft` and creates it remotely.
    pub async fn add(&self, draft: R::Draft) -> Result<R::Item, MutationError> {
        let _guard = self.claim(None);
        let temp = self.next_temp.get();
        self.next_temp.set(temp + 1);
        let key = EntryKey::Temporary(temp);

        self.entries.borrow_mut().push(Entry {
            key: key.clone(),
            item: self.remote.placeholder(&draft),
            optimistic: true,
        });

        match self.remote.create(&draft).await {
            Ok(item) => {
                let confirmed = Entry {
                    key: EntryKey::Persisted(self.remote.id_of(&item)),
                    item: item.clone(),
                    optimistic: false,
                };
                let mut entries = self.entries.borrow_mut();
                match entries.iter_mut().find(|e| e.key == key) {
                    Some(entry) => *entry = confirmed,
                    None => log::debug!("Placeholder {temp} was replaced before create finished"),
                }
                Ok(item)
            }
            Err(source) => {
                self.entries.borrow_mut().retain(|e| e.key != key);
                Err(self.failed(Operation::Create, source))
            }
        }
    }

    /// Merges `patch` into the entry for `id` and updates it remotely.
    pub async fn update(&self, id: R::Id, patch: R::Patch) -> Result<R::Item, MutationError> {
        let _guard = self.claim_id(&id, Operation::Update)?;
        let revision = self.revision.get();
        let key = EntryKey::Persisted(id.clone());

        let previous = {
            let mut entries = self.entries.borrow_mut();
            entries.iter_mut().find(|e| e.key == key).map(|entry| {
                let previous = (entry.item.clone(), entry.optimistic);
                self.remote.merge(&mut entry.item, &patch);
                entry.optimistic = true;
                previous
            })
        };

        match self.remote.update(&id, &patch).await {
            Ok(item) => {
                if let Some(entry) = self.entries.borrow_mut().iter_mut().find(|e| e.key == key) {
                    entry.item = item.clone();
                    entry.optimistic = false;
                }
                Ok(item)
            }
            Err(source) => {
                if let Some((item, optimistic)) = previous {
                    if self.revision.get() == revision {
                        let mut entries = self.entries.borrow_mut();
                        if let Some(entry) = entries.iter_mut().find(|e| e.key == key) {
                            entry.item = item;
                            entry.optimistic = optimistic;
                        }
                    }
                }
                Err(self.failed(Operation::Update, source))
            }
        }
    }

    /// Removes the entry for `id` and deletes it remotely.
    pub async fn remove(&self, id: R::Id) -> Result<(), MutationError> {
        let _guard = self.claim_id(&id, Operation::Delete)?;
        let revision = self.revision.get();
        let key = EntryKey::Persisted(id.clone());

        let removed = {
            let mut entries = self.entries.borrow_mut();
            entries.iter().position(|e| e.key == key).map(|index| {
                let before = index.checked_sub(1).map(|i| entries[i].key.clone());
                (index, before, entries.remove(index))
            })
        };

        match self.remote.delete(&id).await {
            Ok(()) => Ok(()),
            Err(source) => {
                if let Some((index, before, entry)) = removed {
                    if self.revision.get() == revision {
                        self.reinsert(index, before, entry);
                    }
                }
                Err(self.failed(Operation::Delete, source))
            }
        }
    }

    fn claim(&self, id: Option<R::Id>) -> PendingGuard<'_, R::Id> {
        self.in_flight.set(self.in_flight.get() + 1);
        PendingGuard {
            ids: &self.pending,
            in_flight: &self.in_flight,
            id,
        }
    }

    fn claim_id(
        &self,
        id: &R::Id,
        operation: Operation,
    ) -> Result<PendingGuard<'_, R::Id>, MutationError> {
        if !self.pending.borrow_mut().insert(id.clone()) {
            log::debug!("Rejected {operation} of {id:?}: a change is already pending");
            return Err(MutationError::new(operation, SyncError::MutationPending));
        }
        Ok(self.claim(Some(id.clone())))
    }

    /// Puts a removed entry back after its former predecessor, or at its old
    /// position when the predecessor is gone too.
    fn reinsert(
        &self,
        index: usize,
        before: Option<EntryKey<R::Id>>,
        entry: Entry<R::Item, R::Id>,
    ) {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|e| e.key == entry.key) {
            return;
        }
        let at = match before {
            None => 0,
            Some(key) => entries
                .iter()
                .position(|e| e.key == key)
                .map_or(index.min(entries.len()), |i| i + 1),
        };
        entries.insert(at, entry);
    }

    fn failed(&self, operation: Operation, source: SyncError) -> MutationError {
        log::warn!("Failed to {operation} item, rolling back: {source}");
        MutationError::new(operation, source)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::{HashSet, VecDeque};

    use tokio::sync::oneshot;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: u32,
        text: String,
    }

    fn note(id: u32, text: &str) -> Note {
        Note {
            id,
            text: text.to_string(),
        }
    }

    #[derive(Default)]
    struct FakeNotes {
        next_id: Cell<u32>,
        fail_with: RefCell<Option<SyncError>>,
        failing_ids: RefCell<HashSet<u32>>,
        gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
        calls: Cell<usize>,
    }

    impl FakeNotes {
        fn failing(error: SyncError) -> Self {
            let fake = Self::default();
            *fake.fail_with.borrow_mut() = Some(error);
            fake
        }

        /// Holds the next call until the returned sender fires.
        fn hold(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().push_back(rx);
            tx
        }

        fn fail_on(&self, id: u32) {
            self.failing_ids.borrow_mut().insert(id);
        }

        async fn respond<T>(&self, id: u32, value: T) -> Result<T, SyncError> {
            self.calls.set(self.calls.get() + 1);
            let gate = self.gates.borrow_mut().pop_front();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            if self.failing_ids.borrow().contains(&id) {
                return Err(SyncError::Server("rejected".into()));
            }
            match self.fail_with.borrow().clone() {
                Some(error) => Err(error),
                None => Ok(value),
            }
        }
    }

    #[async_trait(?Send)]
    impl RemoteCollection for FakeNotes {
        type Id = u32;
        type Item = Note;
        type Draft = String;
        type Patch = String;

        async fn create(&self, draft: &String) -> Result<Note, SyncError> {
            let id = self.next_id.get() + 100;
            self.next_id.set(id);
            self.respond(id, note(id, draft)).await
        }

        async fn update(&self, id: &u32, patch: &String) -> Result<Note, SyncError> {
            self.respond(*id, note(*id, &format!("{patch} (saved)")))
                .await
        }

        async fn delete(&self, id: &u32) -> Result<(), SyncError> {
            self.respond(*id, ()).await
        }

        fn id_of(&self, item: &Note) -> u32 {
            item.id
        }

        fn placeholder(&self, draft: &String) -> Note {
            note(0, draft)
        }

        fn merge(&self, item: &mut Note, patch: &String) {
            item.text = patch.clone();
        }
    }

    fn seeded(remote: FakeNotes) -> OptimisticList<FakeNotes> {
        let list = OptimisticList::new(remote);
        list.replace(vec![note(1, "one"), note(2, "two")]);
        list
    }

    #[tokio::test]
    async fn add_shows_placeholder_then_commits_server_item() {
        let list = seeded(FakeNotes::default());
        let release = list.remote().hold();

        let observe = async {
            tokio::task::yield_now().await;
            let entries = list.entries();
            assert_eq!(entries.len(), 3);
            assert!(entries[2].key.is_temporary());
            assert!(entries[2].optimistic);
            assert_eq!(entries[2].item.text, "three");
            assert_eq!(list.pending_count(), 1);
            release.send(()).unwrap();
        };
        let (created, ()) = tokio::join!(list.add("three".to_string()), observe);

        let created = created.unwrap();
        let entries = list.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].key, EntryKey::Persisted(created.id));
        assert!(!entries[2].optimistic);
        assert_eq!(list.pending_count(), 0);
    }

    #[tokio::test]
    async fn failed_add_restores_previous_entries() {
        let list = seeded(FakeNotes::failing(SyncError::Conflict("duplicate".into())));
        let before = list.entries();

        let err = list.add("three".to_string()).await.unwrap_err();

        assert_eq!(err.operation, Operation::Create);
        assert_eq!(err.source, SyncError::Conflict("duplicate".into()));
        assert_eq!(list.entries(), before);
        assert!(list.entries().iter().all(|e| !e.key.is_temporary()));
    }

    #[tokio::test]
    async fn remove_commits_and_rolls_back() {
        let list = seeded(FakeNotes::default());
        list.remove(1).await.unwrap();
        assert_eq!(list.items(), vec![note(2, "two")]);

        let list = seeded(FakeNotes::failing(SyncError::NotFound));
        let before = list.entries();
        let err = list.remove(1).await.unwrap_err();
        assert_eq!(err.source, SyncError::NotFound);
        assert_eq!(list.entries(), before);
    }

    #[tokio::test]
    async fn update_merges_locally_then_takes_server_item() {
        let list = seeded(FakeNotes::default());
        let release = list.remote().hold();

        let observe = async {
            tokio::task::yield_now().await;
            let entries = list.entries();
            assert_eq!(entries[1].item.text, "deux");
            assert!(entries[1].optimistic);
            assert!(list.is_pending(&2));
            release.send(()).unwrap();
        };
        let (updated, ()) = tokio::join!(list.update(2, "deux".to_string()), observe);

        assert_eq!(updated.unwrap().text, "deux (saved)");
        assert_eq!(list.items()[1], note(2, "deux (saved)"));
        assert!(!list.is_pending(&2));
    }

    #[tokio::test]
    async fn failed_update_restores_previous_item() {
        let list = seeded(FakeNotes::failing(SyncError::Timeout));
        let before = list.entries();

        let err = list.update(1, "uno".to_string()).await.unwrap_err();

        assert_eq!(err.operation, Operation::Update);
        assert_eq!(list.entries(), before);
        assert_eq!(list.pending_count(), 0);
    }

    #[tokio::test]
    async fn overlapping_mutation_on_same_id_is_rejected() {
        let list = seeded(FakeNotes::default());
        let release = list.remote().hold();

        let second = async {
            tokio::task::yield_now().await;
            let before = list.entries();
            let err = list.remove(1).await.unwrap_err();
            assert_eq!(err.source, SyncError::MutationPending);
            assert_eq!(list.entries(), before);
            release.send(()).unwrap();
        };
        let (first, ()) = tokio::join!(list.update(1, "uno".to_string()), second);

        assert!(first.is_ok());
        assert_eq!(list.remote().calls.get(), 1);
        assert_eq!(list.items()[0], note(1, "uno (saved)"));
    }

    #[tokio::test]
    async fn mutations_on_different_ids_may_overlap() {
        let list = seeded(FakeNotes::default());
        let release = list.remote().hold();

        let second = async {
            tokio::task::yield_now().await;
            list.remove(2).await
        };
        let first = list.update(1, "uno".to_string());
        let releaser = async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            release.send(()).unwrap();
        };
        let (first, second, ()) = tokio::join!(first, second, releaser);

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(list.items(), vec![note(1, "uno (saved)")]);
    }

    /// Runs `first` until it is parked on the remote, then `second` to
    /// completion, then lets `first` resolve.
    async fn interleave<A, B>(
        release: oneshot::Sender<()>,
        first: A,
        second: B,
    ) -> (A::Output, B::Output)
    where
        A: std::future::Future,
        B: std::future::Future,
    {
        let second = async {
            tokio::task::yield_now().await;
            let out = second.await;
            release.send(()).unwrap();
            out
        };
        tokio::join!(first, second)
    }

    #[tokio::test]
    async fn failed_update_keeps_a_delete_that_committed_meanwhile() {
        let list = seeded(FakeNotes::default());
        list.remote().fail_on(1);
        let release = list.remote().hold();

        let (updated, removed) = interleave(
            release,
            list.update(1, "uno".to_string()),
            list.remove(2),
        )
        .await;

        assert_eq!(updated.unwrap_err().operation, Operation::Update);
        assert!(removed.is_ok());
        assert_eq!(list.items(), vec![note(1, "one")]);
        assert!(list.entries().iter().all(|e| !e.optimistic));
    }

    #[tokio::test]
    async fn failed_remove_keeps_an_update_that_committed_meanwhile() {
        let list = seeded(FakeNotes::default());
        list.remote().fail_on(1);
        let release = list.remote().hold();

        let (removed, updated) = interleave(
            release,
            list.remove(1),
            list.update(2, "deux".to_string()),
        )
        .await;

        assert_eq!(removed.unwrap_err().operation, Operation::Delete);
        assert!(updated.is_ok());
        assert_eq!(
            list.items(),
            vec![note(1, "one"), note(2, "deux (saved)")]
        );
        assert_eq!(list.pending_count(), 0);
    }

    #[tokio::test]
    async fn failed_add_keeps_a_delete_that_committed_meanwhile() {
        let list = seeded(FakeNotes::default());
        // The first create is assigned id 100.
        list.remote().fail_on(100);
        let release = list.remote().hold();

        let (added, removed) =
            interleave(release, list.add("three".to_string()), list.remove(1)).await;

        assert_eq!(added.unwrap_err().operation, Operation::Create);
        assert!(removed.is_ok());
        assert_eq!(list.items(), vec![note(2, "two")]);
    }

    #[tokio::test]
    async fn refresh_during_a_failing_remove_wins() {
        let list = seeded(FakeNotes::default());
        list.remote().fail_on(1);
        let release = list.remote().hold();

        let refresh = async {
            list.replace(vec![note(2, "two"), note(3, "three")]);
        };
        let (removed, ()) = interleave(release, list.remove(1), refresh).await;

        assert!(removed.is_err());
        assert_eq!(list.items(), vec![note(2, "two"), note(3, "three")]);
    }
}
