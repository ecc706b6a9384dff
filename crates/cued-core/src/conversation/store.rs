//! In-memory conversation state store.
//!
//! Maps each `UserId` to at most one `ConversationState`. The store starts
//! empty, is owned by whoever constructs it (no globals) and never persists
//! across process restarts. Abandoned conversations stay until the process
//! exits or the user cancels them.
//!
//! Every mutating operation goes through a `DashMap` entry, which holds the
//! shard lock for the duration of the closure. Two events for the same user
//! therefore never interleave, even when delivered concurrently.

use cued_types::chat::UserId;
use cued_types::flow::ConversationState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Default bound on concurrently active conversations.
const DEFAULT_MAX_ACTIVE: usize = 1_000;

/// Why `begin` did not store the new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginRefused {
    /// The store is full and the user has no entry yet.
    Capacity { limit: usize },
    /// The existing entry was kept; carries a snapshot of it.
    Occupied(ConversationState),
}

/// Process-local mapping from user to conversation progress.
pub struct ConversationStore {
    states: DashMap<UserId, ConversationState>,
    max_active: usize,
}

impl ConversationStore {
    /// Create an empty store admitting at most `max_active` conversations.
    pub fn new(max_active: usize) -> Self {
        Self {
            states: DashMap::new(),
            max_active,
        }
    }

    /// Snapshot of the user's state, if any.
    pub fn get(&self, user: UserId) -> Option<ConversationState> {
        self.states.get(&user).map(|s| s.value().clone())
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.states.contains_key(&user)
    }

    /// Insert or replace the user's state.
    ///
    /// Replacing an existing entry always succeeds; admitting a new user
    /// fails once `max_active` conversations are in progress.
    pub fn put(&self, state: ConversationState) -> Result<(), BeginRefused> {
        self.begin(state, |_| true)
    }

    /// Insert `state`, replacing the user's existing state only if
    /// `can_replace` approves it. The check and the write happen under
    /// the same entry lock.
    pub fn begin(
        &self,
        state: ConversationState,
        can_replace: impl FnOnce(&ConversationState) -> bool,
    ) -> Result<(), BeginRefused> {
        // Checked before taking the entry lock; the map may briefly exceed
        // the bound by the number of racing first-time inserts.
        let at_capacity = self.states.len() >= self.max_active;
        match self.states.entry(state.user) {
            Entry::Occupied(mut occupied) => {
                if !can_replace(occupied.get()) {
                    return Err(BeginRefused::Occupied(occupied.get().clone()));
                }
                occupied.insert(state);
                Ok(())
            }
            Entry::Vacant(_) if at_capacity => Err(BeginRefused::Capacity {
                limit: self.max_active,
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(state);
                Ok(())
            }
        }
    }

    /// Run `f` against the user's state while holding its entry lock.
    ///
    /// Returns `None` (without calling `f`) when the user has no state.
    /// When `f` returns `Removal::Remove`, the entry is removed under the
    /// same lock and the final state is handed back with the result.
    pub fn update<R>(
        &self,
        user: UserId,
        f: impl FnOnce(&mut ConversationState) -> Removal<R>,
    ) -> Option<Updated<R>> {
        match self.states.entry(user) {
            Entry::Vacant(_) => None,
            Entry::Occupied(mut occupied) => match f(occupied.get_mut()) {
                Removal::Keep(result) => Some(Updated::Kept(result)),
                Removal::Remove(result) => Some(Updated::Removed(occupied.remove(), result)),
            },
        }
    }

    /// Remove and return the user's state.
    pub fn remove(&self, user: UserId) -> Option<ConversationState> {
        self.states.remove(&user).map(|(_, state)| state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIVE)
    }
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("active", &self.states.len())
            .field("max_active", &self.max_active)
            .finish()
    }
}

/// Decision returned from an `update` closure.
pub enum Removal<R> {
    Keep(R),
    Remove(R),
}

/// Outcome of `ConversationStore::update`.
pub enum Updated<R> {
    Kept(R),
    /// The entry was removed; carries the final state snapshot.
    Removed(ConversationState, R),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cued_types::flow::FlowKind;

    #[test]
    fn test_new_store_is_empty() {
        let store = ConversationStore::default();
        assert!(store.is_empty());
        assert_eq!(store.max_active(), DEFAULT_MAX_ACTIVE);
        assert!(store.get(UserId(1)).is_none());
    }

    #[test]
    fn test_put_get_remove() {
        let store = ConversationStore::new(10);
        store
            .put(ConversationState::new(UserId(1), FlowKind::Applicant))
            .unwrap();

        let state = store.get(UserId(1)).unwrap();
        assert_eq!(state.kind, FlowKind::Applicant);
        assert!(store.contains(UserId(1)));

        let removed = store.remove(UserId(1)).unwrap();
        assert_eq!(removed.user, UserId(1));
        assert!(store.is_empty());
        assert!(store.remove(UserId(1)).is_none());
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let store = ConversationStore::new(10);
        let mut first = ConversationState::new(UserId(1), FlowKind::Applicant);
        first.push_answer("Jane".to_string());
        store.put(first).unwrap();

        store
            .put(ConversationState::new(UserId(1), FlowKind::Applicant))
            .unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(UserId(1)).unwrap().answers.is_empty());
    }

    #[test]
    fn test_capacity_bound_applies_to_new_users_only() {
        let store = ConversationStore::new(2);
        store.put(ConversationState::new(UserId(1), FlowKind::Applicant)).unwrap();
        store.put(ConversationState::new(UserId(2), FlowKind::Recruiter)).unwrap();

        let err = store
            .put(ConversationState::new(UserId(3), FlowKind::JobPosting))
            .unwrap_err();
        assert_eq!(err, BeginRefused::Capacity { limit: 2 });
        assert!(!store.contains(UserId(3)));

        // Existing users may still restart.
        store.put(ConversationState::new(UserId(1), FlowKind::Applicant)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_begin_keeps_entry_when_replacement_refused() {
        let store = ConversationStore::new(10);
        let mut original = ConversationState::new(UserId(1), FlowKind::Applicant);
        original.push_answer("Jane".to_string());
        store.put(original.clone()).unwrap();

        let err = store
            .begin(ConversationState::new(UserId(1), FlowKind::Recruiter), |existing| {
                existing.kind == FlowKind::Recruiter
            })
            .unwrap_err();
        assert_eq!(err, BeginRefused::Occupied(original.clone()));
        assert_eq!(store.get(UserId(1)).unwrap(), original);
    }

    #[test]
    fn test_update_missing_user_does_not_insert() {
        let store = ConversationStore::new(10);
        let result = store.update(UserId(5), |_| Removal::Keep(()));
        assert!(result.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_keep_and_remove() {
        let store = ConversationStore::new(10);
        store.put(ConversationState::new(UserId(1), FlowKind::Applicant)).unwrap();

        let kept = store.update(UserId(1), |state| {
            state.push_answer("Jane".to_string());
            Removal::Keep(state.step_index)
        });
        assert!(matches!(kept, Some(Updated::Kept(1))));
        assert_eq!(store.get(UserId(1)).unwrap().answers, vec!["Jane"]);

        let removed = store.update(UserId(1), |state| {
            state.push_answer("29".to_string());
            Removal::Remove("done")
        });
        match removed {
            Some(Updated::Removed(state, tag)) => {
                assert_eq!(tag, "done");
                assert_eq!(state.answers, vec!["Jane", "29"]);
            }
            _ => panic!("expected removal"),
        }
        assert!(!store.contains(UserId(1)));
    }

    #[test]
    fn test_concurrent_updates_to_distinct_users() {
        let store = std::sync::Arc::new(ConversationStore::new(100));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let user = UserId(i);
                    store.put(ConversationState::new(user, FlowKind::Applicant)).unwrap();
                    for n in 0..5 {
                        store.update(user, |s| {
                            s.push_answer(format!("{i}-{n}"));
                            Removal::Keep(())
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 8);
        for i in 0..8 {
            let state = store.get(UserId(i)).unwrap();
            assert_eq!(state.step_index, 5);
            assert_eq!(state.answers[0], format!("{i}-0"));
        }
    }
}
