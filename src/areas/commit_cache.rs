//! Per-repository commit cache
//!
//! Commits are content addressed, so a parsed commit stays valid for the
//! lifetime of the process. Entries are never evicted and failed reads are
//! never stored. The map is guarded by a lock so a repository handle can be
//! shared between tasks; concurrent misses on the same id may both parse,
//! but the first insert wins and every caller sees that value.

use crate::artifacts::objects::commit::CommitData;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Default)]
pub struct CommitCache {
    entries: Arc<RwLock<HashMap<ObjectId, Arc<CommitData>>>>,
}

impl CommitCache {
    pub fn get(&self, id: &ObjectId) -> Option<Arc<CommitData>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Store `data` unless the id is already cached, returning the cached value.
    pub fn insert(&self, data: CommitData) -> Arc<CommitData> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(*data.id())
            .or_insert_with(|| Arc::new(data))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(message: &str) -> CommitData {
        let raw = format!(
            "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
             author A <a@b.c> 1 +0000\n\
             committer A <a@b.c> 1 +0000\n\n{message}"
        );
        let id = ObjectId::try_parse("d86a90f801dbe279db095437a8c7ea42c60e8d98").unwrap();
        CommitData::parse(id, raw.as_bytes()).unwrap()
    }

    #[test]
    fn first_insert_wins() {
        let cache = CommitCache::default();

        let first = cache.insert(commit("first"));
        let second = cache.insert(commit("second"));

        assert_eq!(second.message(), "first");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let cache = CommitCache::default();
        let shared = cache.clone();

        let data = cache.insert(commit("m"));

        assert!(shared.get(data.id()).is_some());
    }

    #[test]
    fn concurrent_inserts_agree() {
        let cache = CommitCache::default();

        let stored = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|i| {
                    let cache = cache.clone();
                    scope.spawn(move || cache.insert(commit(&format!("writer {i}"))))
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });

        assert!(stored.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(cache.len(), 1);
    }
}
