//! Pull request registry.
//!
//! Pull requests sit in a FIFO queue in arrival order; an id index points at
//! queue positions so status commands can update a PR in place. Nothing is
//! ever dequeued individually, which keeps positions stable until `clear`.

use crate::containers::Queue;
use crate::error::{Error, Result};
use crate::models::{PrStatus, PullRequest, PullRequestDraft};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

pub const ID_PREFIX: &str = "PR-";

#[derive(Debug, Default)]
pub struct PullRequestRegistry {
    queue: Queue<PullRequest>,
    index: HashMap<String, usize>,
    issued: u64,
}

impl PullRequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Opens a PR with the next sequential id. Ids are never reused.
    pub fn create(&mut self, draft: PullRequestDraft) -> Result<&PullRequest> {
        self.issued += 1;
        let id = format!("{ID_PREFIX}{}", self.issued);
        let pr = PullRequest::new(id.clone(), draft, Utc::now());

        info!(
            id = %pr.id,
            source = %pr.source_branch,
            target = %pr.target_branch,
            commits = pr.commit_ids.len(),
            "opened pull request"
        );
        self.index.insert(id.clone(), self.queue.len());
        self.queue.enqueue(pr);
        self.get(&id)
    }

    pub fn get(&self, id: &str) -> Result<&PullRequest> {
        self.index
            .get(id)
            .and_then(|&position| self.queue.get(position))
            .ok_or_else(|| Error::PullRequestNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut PullRequest> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| Error::PullRequestNotFound(id.to_string()))?;
        self.queue
            .get_mut(position)
            .ok_or_else(|| Error::PullRequestNotFound(id.to_string()))
    }

    /// Adds a reviewer; adding the same reviewer twice is a no-op.
    pub fn review(&mut self, id: &str, reviewer: &str) -> Result<&PullRequest> {
        let pr = self.get_mut(id)?;
        if pr.status.is_terminal() {
            return Err(Error::InvalidStatusTransition {
                id: id.to_string(),
                from: pr.status,
                to: pr.status,
            });
        }
        if pr.reviewers.insert(reviewer.to_string()) {
            debug!(id, reviewer, "added reviewer");
        }
        Ok(&*pr)
    }

    /// Fails unless `id` may move to `next` right now.
    pub fn check_transition(&self, id: &str, next: PrStatus) -> Result<&PullRequest> {
        let pr = self.get(id)?;
        if !pr.status.can_transition_to(next) {
            return Err(Error::InvalidStatusTransition {
                id: id.to_string(),
                from: pr.status,
                to: next,
            });
        }
        Ok(pr)
    }

    fn transition(&mut self, id: &str, next: PrStatus) -> Result<&PullRequest> {
        self.check_transition(id, next)?;
        let pr = self.get_mut(id)?;
        let now = Utc::now();

        info!(id, from = %pr.status, to = %next, "pull request status changed");
        pr.status = next;
        pr.closed_at = Some(now);
        if next == PrStatus::Merged {
            pr.merged_at = Some(now);
        }
        Ok(&*pr)
    }

    /// Approval does not require any prior review.
    pub fn approve(&mut self, id: &str) -> Result<&PullRequest> {
        self.transition(id, PrStatus::Approved)
    }

    pub fn reject(&mut self, id: &str) -> Result<&PullRequest> {
        self.transition(id, PrStatus::Rejected)
    }

    pub fn cancel(&mut self, id: &str) -> Result<&PullRequest> {
        self.transition(id, PrStatus::Cancelled)
    }

    /// Marks an approved PR merged. Moving branches is the caller's job.
    pub fn merge(&mut self, id: &str) -> Result<&PullRequest> {
        self.transition(id, PrStatus::Merged)
    }

    /// Labels are metadata and may be added in any status.
    pub fn tag(&mut self, id: &str, label: &str) -> Result<&PullRequest> {
        let pr = self.get_mut(id)?;
        pr.tags.insert(label.to_string());
        Ok(&*pr)
    }

    /// Oldest PR still open. Does not remove anything.
    pub fn next(&self) -> Option<&PullRequest> {
        self.queue.iter().find(|pr| pr.status == PrStatus::Open)
    }

    /// Every PR in arrival order, whatever its status.
    pub fn list(&self) -> impl Iterator<Item = &PullRequest> {
        self.queue.iter()
    }

    /// Empties the queue and the index. The id counter keeps counting.
    pub fn clear(&mut self) -> usize {
        let cleared = self.queue.len();
        self.queue.clear();
        self.index.clear();
        info!(cleared, "cleared pull requests");
        cleared
    }
}
