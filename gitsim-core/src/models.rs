use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type CommitId = String;

/// Hex-encoded SHA-256 of `content`.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
}

impl FileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Deleted => "deleted",
        }
    }
}

/// What a single commit recorded for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub status: FileStatus,
    pub content: String,
}

impl Change {
    pub fn is_deletion(&self) -> bool {
        self.status == FileStatus::Deleted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub parent_id: Option<CommitId>,
    pub branch: String,
    pub changes: BTreeMap<String, Change>,
}

impl Commit {
    pub fn new(
        message: String,
        author: String,
        timestamp: DateTime<Utc>,
        parent_id: Option<CommitId>,
        branch: String,
        changes: BTreeMap<String, Change>,
    ) -> Self {
        let id = Self::compute_id(
            parent_id.as_deref(),
            &message,
            &author,
            &timestamp,
            &changes,
        );

        Self {
            id,
            message,
            author,
            timestamp,
            parent_id,
            branch,
            changes,
        }
    }

    /// Content address of a commit. Paths are visited in sorted order, so the
    /// same inputs always hash to the same id.
    pub fn compute_id(
        parent_id: Option<&str>,
        message: &str,
        author: &str,
        timestamp: &DateTime<Utc>,
        changes: &BTreeMap<String, Change>,
    ) -> CommitId {
        let mut hasher = Sha256::new();
        hasher.update(parent_id.unwrap_or("").as_bytes());
        hasher.update([0u8]);
        hasher.update(message.as_bytes());
        hasher.update([0u8]);
        hasher.update(author.as_bytes());
        hasher.update([0u8]);
        hasher.update(
            timestamp
                .to_rfc3339_opts(SecondsFormat::Nanos, true)
                .as_bytes(),
        );
        for (path, change) in changes {
            hasher.update([0u8]);
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(change.status.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(change.content.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(7)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    pub path: String,
    pub content: String,
    pub status: FileStatus,
    pub checksum: String,
    pub last_commit_id: Option<CommitId>,
}

impl StagedFile {
    pub fn new(
        path: String,
        content: String,
        status: FileStatus,
        last_commit_id: Option<CommitId>,
    ) -> Self {
        Self {
            checksum: content_hash(content.as_bytes()),
            path,
            content,
            status,
            last_commit_id,
        }
    }

    pub fn deletion(path: String, last_commit_id: Option<CommitId>) -> Self {
        Self::new(path, String::new(), FileStatus::Deleted, last_commit_id)
    }

    pub fn to_change(&self) -> Change {
        Change {
            status: self.status,
            content: self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub head: Option<CommitId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrStatus {
    Open,
    Approved,
    Rejected,
    Cancelled,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PrStatus::Open => "open",
            PrStatus::Approved => "approved",
            PrStatus::Rejected => "rejected",
            PrStatus::Cancelled => "cancelled",
            PrStatus::Merged => "merged",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PrStatus::Rejected | PrStatus::Cancelled | PrStatus::Merged
        )
    }

    pub fn can_transition_to(&self, next: PrStatus) -> bool {
        matches!(
            (self, next),
            (PrStatus::Open, PrStatus::Approved)
                | (PrStatus::Open, PrStatus::Rejected)
                | (PrStatus::Open, PrStatus::Cancelled)
                | (PrStatus::Approved, PrStatus::Merged)
                | (PrStatus::Approved, PrStatus::Cancelled)
        )
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    pub repository: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub source_branch: String,
    pub target_branch: String,
    pub commit_ids: Vec<CommitId>,
    pub modified_files: BTreeSet<String>,
    pub reviewers: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub status: PrStatus,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Everything `pr create` needs besides the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub repository: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub source_branch: String,
    pub target_branch: String,
    pub commit_ids: Vec<CommitId>,
    pub modified_files: BTreeSet<String>,
}

impl PullRequest {
    pub fn new(id: String, draft: PullRequestDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            repository: draft.repository,
            title: draft.title,
            description: draft.description,
            author: draft.author,
            created_at,
            source_branch: draft.source_branch,
            target_branch: draft.target_branch,
            commit_ids: draft.commit_ids,
            modified_files: draft.modified_files,
            reviewers: BTreeSet::new(),
            tags: BTreeSet::new(),
            status: PrStatus::Open,
            closed_at: None,
            merged_at: None,
        }
    }
}
