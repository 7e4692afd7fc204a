use crate::error::{Error, Result};
use crate::repository::Repository;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub path: String,
    pub active: bool,
}

/// Repositories in creation order plus the name of the active one.
#[derive(Debug, Default)]
pub struct RepositoryManager {
    repositories: Vec<Repository>,
    active: Option<String>,
}

impl RepositoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.repositories.iter().position(|r| r.name() == name)
    }

    /// Creates a repository and makes it the active one.
    pub fn create(&mut self, name: &str, path: &str) -> Result<&mut Repository> {
        if name.trim().is_empty() {
            return Err(Error::InvalidOperation(
                "repository name cannot be empty".to_string(),
            ));
        }
        if self.position(name).is_some() {
            return Err(Error::DuplicateRepositoryName(name.to_string()));
        }

        info!(repository = name, path, "initialized repository");
        self.repositories.push(Repository::new(name, path));
        self.active = Some(name.to_string());
        let last = self.repositories.len() - 1;
        Ok(&mut self.repositories[last])
    }

    pub fn switch(&mut self, name: &str) -> Result<&Repository> {
        let position = self
            .position(name)
            .ok_or_else(|| Error::RepositoryNotFound(name.to_string()))?;
        info!(repository = name, "switched repository");
        self.active = Some(name.to_string());
        Ok(&self.repositories[position])
    }

    pub fn get(&self, name: &str) -> Result<&Repository> {
        self.repositories
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| Error::RepositoryNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Repository> {
        self.repositories
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| Error::RepositoryNotFound(name.to_string()))
    }

    pub fn active(&self) -> Result<&Repository> {
        let name = self.active.as_deref().ok_or(Error::NoActiveRepository)?;
        self.get(name)
    }

    pub fn active_mut(&mut self) -> Result<&mut Repository> {
        let name = self.active.clone().ok_or(Error::NoActiveRepository)?;
        self.get_mut(&name)
    }

    pub fn list(&self) -> Vec<RepositoryInfo> {
        self.repositories
            .iter()
            .map(|r| RepositoryInfo {
                name: r.name().to_string(),
                path: r.path().to_string(),
                active: self.active.as_deref() == Some(r.name()),
            })
            .collect()
    }

    /// Drops a repository. Removing the active one leaves no repository
    /// selected.
    pub fn remove(&mut self, name: &str) -> Result<Repository> {
        let position = self
            .position(name)
            .ok_or_else(|| Error::RepositoryNotFound(name.to_string()))?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        info!(repository = name, "removed repository");
        Ok(self.repositories.remove(position))
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sets_active() {
        let mut manager = RepositoryManager::new();
        assert_eq!(manager.active().unwrap_err(), Error::NoActiveRepository);

        manager.create("demo", "/tmp/demo").unwrap();
        manager.create("other", "/tmp/other").unwrap();

        assert_eq!(manager.active().unwrap().name(), "other");
        assert_eq!(
            manager.list(),
            vec![
                RepositoryInfo {
                    name: "demo".to_string(),
                    path: "/tmp/demo".to_string(),
                    active: false,
                },
                RepositoryInfo {
                    name: "other".to_string(),
                    path: "/tmp/other".to_string(),
                    active: true,
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut manager = RepositoryManager::new();
        manager.create("demo", "/tmp/demo").unwrap();

        assert_eq!(
            manager.create("demo", "/elsewhere").unwrap_err(),
            Error::DuplicateRepositoryName("demo".to_string())
        );
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_switch() {
        let mut manager = RepositoryManager::new();
        manager.create("demo", "/tmp/demo").unwrap();
        manager.create("other", "/tmp/other").unwrap();

        manager.switch("demo").unwrap();
        assert_eq!(manager.active().unwrap().name(), "demo");
        assert_eq!(
            manager.switch("missing").unwrap_err(),
            Error::RepositoryNotFound("missing".to_string())
        );
        assert_eq!(manager.active().unwrap().name(), "demo");
    }

    #[test]
    fn test_remove_active_clears_selection() {
        let mut manager = RepositoryManager::new();
        manager.create("demo", "/tmp/demo").unwrap();

        manager.remove("demo").unwrap();
        assert!(manager.is_empty());
        assert_eq!(manager.active_mut().unwrap_err(), Error::NoActiveRepository);
        assert!(manager.remove("demo").is_err());
    }
}
