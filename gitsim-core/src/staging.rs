//! Staging area.
//!
//! Staged entries live on a LIFO stack and a path may be staged more than once.
//! Commit time resolves each path to its topmost entry (last write wins).

use crate::containers::Stack;
use crate::error::{Error, Result};
use crate::models::StagedFile;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct StagingArea {
    stack: Stack<StagedFile>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, file: StagedFile) {
        debug!(path = %file.path, status = file.status.as_str(), "staging file");
        self.stack.push(file);
    }

    pub fn peek(&self) -> Option<&StagedFile> {
        self.stack.peek()
    }

    pub fn pop(&mut self) -> Option<StagedFile> {
        self.stack.pop()
    }

    pub fn clear(&mut self) -> usize {
        let discarded = self.stack.len();
        self.stack.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.stack.iter().any(|file| file.path == path)
    }

    /// Entries from the top of the stack down.
    pub fn entries(&self) -> impl Iterator<Item = &StagedFile> {
        self.stack.iter()
    }

    /// The effective change per path: the entry nearest the top wins.
    pub fn resolve(&self) -> BTreeMap<String, StagedFile> {
        let mut resolved = BTreeMap::new();
        for file in self.stack.iter() {
            resolved
                .entry(file.path.clone())
                .or_insert_with(|| file.clone());
        }
        resolved
    }

    /// Hands the resolved entries to `write` and empties the stack only if it
    /// succeeds. On error the stack is left exactly as it was.
    pub fn drain_for_commit<T, F>(&mut self, write: F) -> Result<T>
    where
        F: FnOnce(BTreeMap<String, StagedFile>) -> Result<T>,
    {
        if self.stack.is_empty() {
            return Err(Error::NothingStaged);
        }

        let output = write(self.resolve())?;
        self.stack.clear();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileStatus;
    use proptest::prelude::*;

    fn added(path: &str, content: &str) -> StagedFile {
        StagedFile::new(
            path.to_string(),
            content.to_string(),
            FileStatus::Added,
            None,
        )
    }

    #[test]
    fn test_last_write_wins() {
        let mut staging = StagingArea::new();
        staging.stage(added("a.txt", "one"));
        staging.stage(added("b.txt", "bee"));
        staging.stage(added("a.txt", "two"));

        let resolved = staging.resolve();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["a.txt"].content, "two");
        assert_eq!(resolved["b.txt"].content, "bee");
        assert_eq!(staging.len(), 3);
    }

    #[test]
    fn test_deletion_on_top_wins() {
        let mut staging = StagingArea::new();
        staging.stage(added("a.txt", "one"));
        staging.stage(StagedFile::deletion("a.txt".to_string(), None));

        let resolved = staging.resolve();
        assert_eq!(resolved["a.txt"].status, FileStatus::Deleted);
        assert!(resolved["a.txt"].content.is_empty());
    }

    #[test]
    fn test_drain_empty_fails() {
        let mut staging = StagingArea::new();
        let result = staging.drain_for_commit(|_| Ok(()));
        assert_eq!(result, Err(Error::NothingStaged));
    }

    #[test]
    fn test_drain_keeps_stack_on_failure() {
        let mut staging = StagingArea::new();
        staging.stage(added("a.txt", "one"));

        let result: Result<()> = staging
            .drain_for_commit(|_| Err(Error::InvalidOperation("write failed".to_string())));

        assert!(result.is_err());
        assert_eq!(staging.len(), 1);
        assert_eq!(staging.peek().map(|f| f.content.as_str()), Some("one"));
    }

    #[test]
    fn test_drain_consumes_on_success() {
        let mut staging = StagingArea::new();
        staging.stage(added("a.txt", "one"));
        staging.stage(added("a.txt", "two"));

        let count = staging
            .drain_for_commit(|resolved| Ok(resolved.len()))
            .unwrap();

        assert_eq!(count, 1);
        assert!(staging.is_empty());
    }

    #[test]
    fn test_pop_and_clear() {
        let mut staging = StagingArea::new();
        staging.stage(added("a.txt", "one"));
        staging.stage(added("b.txt", "two"));

        assert_eq!(staging.pop().map(|f| f.path), Some("b.txt".to_string()));
        assert!(staging.contains("a.txt"));
        assert!(!staging.contains("b.txt"));
        assert_eq!(staging.clear(), 1);
        assert!(staging.peek().is_none());
    }

    proptest! {
        #[test]
        fn prop_resolution_matches_latest_push(
            ops in prop::collection::vec((0usize..3, prop::option::of("[a-z]{0,6}")), 1..40)
        ) {
            let paths = ["a.txt", "b.txt", "c.txt"];
            let mut staging = StagingArea::new();
            let mut latest: BTreeMap<String, StagedFile> = BTreeMap::new();

            for (idx, content) in ops {
                let path = paths[idx].to_string();
                let file = match content {
                    Some(content) => added(&path, &content),
                    None => StagedFile::deletion(path.clone(), None),
                };
                latest.insert(path, file.clone());
                staging.stage(file);
            }

            prop_assert_eq!(staging.resolve(), latest);
        }
    }
}
