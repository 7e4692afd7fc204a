use crate::error::{Error, Result};
use crate::models::{Branch, CommitId};
use tracing::debug;

pub const DEFAULT_BRANCH: &str = "main";

/// Branch name to head commit, kept in creation order.
#[derive(Debug, Clone)]
pub struct BranchTable {
    branches: Vec<Branch>,
}

impl BranchTable {
    /// A table holding only the default branch, without a head.
    pub fn new() -> Self {
        Self {
            branches: vec![Branch {
                name: DEFAULT_BRANCH.to_string(),
                head: None,
            }],
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.branches.iter().any(|b| b.name == name)
    }

    pub fn get(&self, name: &str) -> Result<&Branch> {
        self.branches
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))
    }

    pub fn head(&self, name: &str) -> Result<Option<&CommitId>> {
        Ok(self.get(name)?.head.as_ref())
    }

    pub fn create(&mut self, name: &str, from_commit: Option<CommitId>) -> Result<&Branch> {
        if name.trim().is_empty() {
            return Err(Error::InvalidOperation(
                "branch name cannot be empty".to_string(),
            ));
        }
        if self.contains(name) {
            return Err(Error::BranchAlreadyExists(name.to_string()));
        }

        debug!(branch = name, head = ?from_commit, "creating branch");
        self.branches.push(Branch {
            name: name.to_string(),
            head: from_commit,
        });
        Ok(&self.branches[self.branches.len() - 1])
    }

    pub fn set_head(&mut self, name: &str, commit: CommitId) -> Result<()> {
        let branch = self
            .branches
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        branch.head = Some(commit);
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<Branch> {
        let position = self
            .branches
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        Ok(self.branches.remove(position))
    }

    pub fn list(&self) -> &[Branch] {
        &self.branches
    }
}

impl Default for BranchTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_default_branch() {
        let table = BranchTable::new();
        assert_eq!(table.list().len(), 1);
        assert_eq!(table.head(DEFAULT_BRANCH).unwrap(), None);
    }

    #[test]
    fn test_create_and_list_in_order() {
        let mut table = BranchTable::new();
        table.create("feature", Some("abc".to_string())).unwrap();
        table.create("hotfix", None).unwrap();

        let names: Vec<&str> = table.list().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["main", "feature", "hotfix"]);
        assert_eq!(
            table.head("feature").unwrap().map(String::as_str),
            Some("abc")
        );
    }

    #[test]
    fn test_duplicate_and_missing() {
        let mut table = BranchTable::new();
        assert_eq!(
            table.create("main", None).unwrap_err(),
            Error::BranchAlreadyExists("main".to_string())
        );
        assert_eq!(
            table.set_head("ghost", "abc".to_string()).unwrap_err(),
            Error::BranchNotFound("ghost".to_string())
        );
        assert!(matches!(
            table.create("  ", None),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_delete() {
        let mut table = BranchTable::new();
        table.create("feature", None).unwrap();
        let removed = table.delete("feature").unwrap();

        assert_eq!(removed.name, "feature");
        assert!(!table.contains("feature"));
        assert!(table.delete("feature").is_err());
    }
}
