//! Ancestry queries over stored commits.
//!
//! Lineage is first-parent only: [`History::fill_queue`] and
//! [`History::merge_base`] never look at second or later parents. Only
//! [`History::log`] descends into every side of a merge.

use std::collections::HashSet;

use tracing::{debug, trace};
use twig_store::ObjectStore;
use twig_types::ObjectId;

use crate::error::{HistoryError, HistoryResult};
use crate::queue::AncestorQueue;

/// Read-only view of commit history backed by an object store.
pub struct History<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> History<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The underlying object store.
    pub fn store(&self) -> &'a S {
        self.store
    }

    /// Parent ids of `id` in stored order.
    pub fn parents(&self, id: &ObjectId) -> HistoryResult<Vec<ObjectId>> {
        let commit = self.store.read_commit(id)?;
        commit.parents().map_err(|e| HistoryError::MalformedField {
            id: *id,
            field: "parent",
            reason: e.to_string(),
        })
    }

    /// Push `id` and then its first-parent ancestors onto `queue`, newest
    /// first, stopping at a root commit.
    pub fn fill_queue(&self, id: ObjectId, queue: &mut AncestorQueue) -> HistoryResult<()> {
        let mut current = id;
        // An id already queued means the rest of the chain is queued too.
        while queue.push(current) {
            match self.parents(&current)?.first() {
                Some(parent) => current = *parent,
                None => break,
            }
        }
        trace!(head = %id.short_hex(), len = queue.len(), "filled ancestor queue");
        Ok(())
    }

    /// The first-parent chain of `id`, starting with `id` itself.
    pub fn ancestor_chain(&self, id: ObjectId) -> HistoryResult<AncestorQueue> {
        let mut queue = AncestorQueue::new();
        self.fill_queue(id, &mut queue)?;
        Ok(queue)
    }

    /// Lowest common ancestor of `commits` along first-parent chains.
    ///
    /// With a single input the result is that commit.
    pub fn merge_base(&self, commits: &[ObjectId]) -> HistoryResult<ObjectId> {
        let (first, rest) = commits.split_first().ok_or(HistoryError::EmptyInput)?;
        let mut reference = self.ancestor_chain(*first)?;

        for id in rest {
            let mut chain = self.ancestor_chain(*id)?;
            while chain.front().is_some_and(|front| !reference.contains(front)) {
                chain.pop_front();
            }
            if chain.is_empty() {
                return Err(HistoryError::NoCommonAncestor(commits.to_vec()));
            }
            reference = chain;
        }

        let base = reference
            .front()
            .copied()
            .ok_or_else(|| HistoryError::NoCommonAncestor(commits.to_vec()))?;
        debug!(inputs = commits.len(), base = %base.short_hex(), "resolved merge base");
        Ok(base)
    }

    /// Every commit reachable from `head`, each exactly once, newest first.
    ///
    /// At a merge both sides are listed, each down to (but excluding) the
    /// merge base of the merge's parents, before the base and its history.
    /// When the parents share no ancestor each side is listed in full, in
    /// parent order.
    pub fn log(&self, head: ObjectId) -> HistoryResult<Vec<ObjectId>> {
        let mut out = Vec::new();
        self.log_into(head, &mut out)?;
        Ok(out)
    }

    /// Like [`History::log`], appending to `out`. Commits already in `out`
    /// are treated as walked: neither they nor their ancestors are revisited.
    pub fn log_into(&self, head: ObjectId, out: &mut Vec<ObjectId>) -> HistoryResult<()> {
        let mut visited: HashSet<ObjectId> = out.iter().copied().collect();
        // Each entry carries the commit at which its walk must stop.
        let mut stack: Vec<(ObjectId, Option<ObjectId>)> = vec![(head, None)];

        while let Some((id, stop)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            out.push(id);

            let parents = self.parents(&id)?;
            match parents.as_slice() {
                [] => {}
                [parent] => {
                    if Some(*parent) != stop {
                        stack.push((*parent, stop));
                    }
                }
                _ => {
                    let pending: Vec<(ObjectId, Option<ObjectId>)> =
                        match self.merge_base(&parents) {
                            Ok(base) => {
                                let mut pending: Vec<_> = parents
                                    .iter()
                                    .filter(|p| **p != base && Some(**p) != stop)
                                    .map(|p| (*p, Some(base)))
                                    .collect();
                                if Some(base) != stop {
                                    pending.push((base, stop));
                                }
                                pending
                            }
                            // Unrelated histories: each side runs to its own root.
                            Err(HistoryError::NoCommonAncestor(_)) => {
                                debug!(merge = %id.short_hex(), "merge of unrelated histories");
                                parents
                                    .iter()
                                    .filter(|p| Some(**p) != stop)
                                    .map(|p| (*p, stop))
                                    .collect()
                            }
                            Err(e) => return Err(e),
                        };
                    stack.extend(pending.into_iter().rev());
                }
            }
        }

        debug!(head = %head.short_hex(), commits = out.len(), "walked history");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use twig_store::{Commit, InMemoryObjectStore};

    const AUTHOR: &str = "Kevin J. Dugan <dugankj@ornl.gov>";

    /// Write a commit with the given parents and return its id.
    pub(crate) fn commit(
        store: &InMemoryObjectStore,
        tree: &str,
        parents: &[ObjectId],
        time: i64,
        msg: &str,
    ) -> ObjectId {
        let mut c = Commit::new().with("tree", tree);
        for p in parents {
            c.push("parent", p.to_hex());
        }
        let sig = format!("{AUTHOR} {time} -0400");
        let c = c
            .with("author", sig.clone())
            .with("committer", sig)
            .with_message(msg, None);
        store.write(&c.to_stored_object()).unwrap()
    }

    /// A real git history: a branch off c1 adds a file over two commits and
    /// is merged back.
    ///
    /// ```text
    /// c0 - c1 - c4 - c5 - c6
    ///        \       /
    ///         c2 - c3
    /// ```
    pub(crate) fn seven_commit_history(store: &InMemoryObjectStore) -> Vec<ObjectId> {
        let c0 = commit(store, "aff72e7367c3ae1928decc25272ec334a805e618", &[], 1560083980, "Initial Commit");
        let c1 = commit(store, "18e156c8acb2081a9b300796b8672f27837e3961", &[c0], 1560084040, "Added new line");
        let c2 = commit(store, "24cc7c0ead06780c12ae9ae79fc7fb69c0f054ee", &[c1], 1560084096, "Added new file");
        let c3 = commit(store, "c8cd9c7e731de0feb53cd0f0a60ebe39d30ebfd8", &[c2], 1560084124, "Added new line");
        let c4 = commit(store, "4fdedfd76570511fb0e43153b8cfe2aba896b009", &[c1], 1560084362, "Added new lines");
        let c5 = commit(store, "24cb97583ae8ef3e046c8e7f8d78aea8a0986e20", &[c4, c3], 1560084417, "Merge branch 'new-file'");
        let c6 = commit(store, "0fef7a0dc4cd421c3645c21f878b76205f78c3b1", &[c5], 1560084474, "added new lines");
        vec![c0, c1, c2, c3, c4, c5, c6]
    }

    fn hex(ids: &[ObjectId]) -> Vec<String> {
        ids.iter().map(ObjectId::to_hex).collect()
    }

    #[test]
    fn fixture_matches_git() {
        let store = InMemoryObjectStore::new();
        let ids = seven_commit_history(&store);
        assert_eq!(
            hex(&ids),
            vec![
                "d228dfd0601080af1af564eb7a3bc6fbb7a2696f",
                "30f3cf9a5f3b33b6090f469c6f8fd8ced8aad098",
                "6ed18ac3b2d77272bf240f313901ef75076d6377",
                "17c06afad13f728e4e31ae85a534a5cf73e2bd76",
                "bbfbe5740cb7180100e86504779d38173d2247cb",
                "af54843b4fa85db56ed9140b5a39ec2df744fc4b",
                "075c7e021c0d2e4a43f01a2e848daf605ed4e65f",
            ]
        );
    }

    #[test]
    fn fill_queue_follows_first_parent() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let history = History::new(&store);

        let chain = history.ancestor_chain(c[6]).unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.into_vec(), vec![c[6], c[5], c[4], c[1], c[0]]);
    }

    #[test]
    fn fill_queue_of_root_is_itself() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let chain = History::new(&store).ancestor_chain(c[0]).unwrap();
        assert_eq!(chain.into_vec(), vec![c[0]]);
    }

    #[test]
    fn linear_chain() {
        let store = InMemoryObjectStore::new();
        let a = commit(&store, "t", &[], 0, "A");
        let b = commit(&store, "t", &[a], 1, "B");
        let c = commit(&store, "t", &[b], 2, "C");
        let history = History::new(&store);

        assert_eq!(history.ancestor_chain(c).unwrap().into_vec(), vec![c, b, a]);
        assert_eq!(history.merge_base(&[c]).unwrap(), c);
        assert_eq!(history.merge_base(&[c, a]).unwrap(), a);
        assert_eq!(history.log(c).unwrap(), vec![c, b, a]);
    }

    #[test]
    fn merge_base_of_diverged_branches() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let history = History::new(&store);

        assert_eq!(history.merge_base(&[c[3], c[4]]).unwrap(), c[1]);
        assert_eq!(history.merge_base(&[c[4], c[3]]).unwrap(), c[1]);
        assert_eq!(history.merge_base(&[c[3]]).unwrap(), c[3]);
        assert_eq!(history.merge_base(&[c[6], c[2], c[3]]).unwrap(), c[1]);
    }

    #[test]
    fn merge_base_is_first_parent_only() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        // c3 is reachable from c6 only through the second parent of c5.
        let base = History::new(&store).merge_base(&[c[6], c[3]]).unwrap();
        assert_eq!(base, c[1]);
    }

    #[test]
    fn merge_base_rejects_empty_input() {
        let store = InMemoryObjectStore::new();
        let err = History::new(&store).merge_base(&[]).unwrap_err();
        assert!(matches!(err, HistoryError::EmptyInput));
    }

    #[test]
    fn merge_base_of_unrelated_roots() {
        let store = InMemoryObjectStore::new();
        let a = commit(&store, "t", &[], 0, "A");
        let b = commit(&store, "t", &[], 1, "B");
        let err = History::new(&store).merge_base(&[a, b]).unwrap_err();
        assert!(matches!(err, HistoryError::NoCommonAncestor(ids) if ids == vec![a, b]));
    }

    #[test]
    fn log_of_simple_merge() {
        let store = InMemoryObjectStore::new();
        let x = commit(&store, "t", &[], 0, "X");
        let y = commit(&store, "t", &[x], 1, "Y");
        let z = commit(&store, "t", &[x], 2, "Z");
        let m = commit(&store, "t", &[y, z], 3, "M");
        let history = History::new(&store);

        assert_eq!(history.merge_base(&[y, z]).unwrap(), x);
        assert_eq!(history.log(m).unwrap(), vec![m, y, z, x]);
    }

    #[test]
    fn log_is_reverse_insertion_order() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let log = History::new(&store).log(c[6]).unwrap();
        let mut expected = c.clone();
        expected.reverse();
        assert_eq!(log, expected);
    }

    #[test]
    fn log_lists_each_commit_once() {
        let store = InMemoryObjectStore::new();
        let x = commit(&store, "t", &[], 0, "X");
        let y = commit(&store, "t", &[x], 1, "Y");
        let z = commit(&store, "t", &[x], 2, "Z");
        let m1 = commit(&store, "t", &[y, z], 3, "M1");
        let w = commit(&store, "t", &[z], 4, "W");
        let m2 = commit(&store, "t", &[m1, w], 5, "M2");

        let log = History::new(&store).log(m2).unwrap();
        let unique: HashSet<_> = log.iter().collect();
        assert_eq!(unique.len(), log.len());
        assert_eq!(log.len(), 6);
        assert_eq!(log[0], m2);
        assert_eq!(log.last(), Some(&x));
    }

    #[test]
    fn log_of_unrelated_histories_merge() {
        let store = InMemoryObjectStore::new();
        let a = commit(&store, "t", &[], 0, "A");
        let a1 = commit(&store, "t", &[a], 1, "A1");
        let b = commit(&store, "t", &[], 2, "B");
        let m = commit(&store, "t", &[a1, b], 3, "M");
        let top = commit(&store, "t", &[m], 4, "top");
        let history = History::new(&store);

        assert!(matches!(
            history.merge_base(&[a1, b]),
            Err(HistoryError::NoCommonAncestor(_))
        ));
        assert_eq!(history.log(top).unwrap(), vec![top, m, a1, a, b]);
    }

    #[test]
    fn log_into_skips_known_commits() {
        let store = InMemoryObjectStore::new();
        let c = seven_commit_history(&store);
        let history = History::new(&store);

        let mut out = vec![c[1]];
        history.log_into(c[3], &mut out).unwrap();
        assert_eq!(out, vec![c[1], c[3], c[2]]);
    }

    #[test]
    fn missing_parent_propagates_store_error() {
        let store = InMemoryObjectStore::new();
        let ghost = ObjectId::from_bytes(b"never written");
        let child = commit(&store, "t", &[ghost], 0, "orphan");
        let err = History::new(&store).log(child).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::Store(twig_store::StoreError::NotFound(id)) if id == ghost
        ));
    }

    #[test]
    fn malformed_parent_hash() {
        let store = InMemoryObjectStore::new();
        let c = Commit::new()
            .with("tree", "t")
            .with("parent", "not-a-hash")
            .with_message("bad", None);
        let id = store.write(&c.to_stored_object()).unwrap();
        let err = History::new(&store).parents(&id).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::MalformedField { field: "parent", .. }
        ));
    }
}
