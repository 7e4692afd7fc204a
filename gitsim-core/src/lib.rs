//! # gitsim-core
//!
//! Core library for gitsim - an in-memory version-control simulator.
//!
//! This crate holds the data structures and operations behind the simulator:
//! staging, content-addressed commits, branches, pull requests and the
//! [`Session`] that dispatches named commands over all of them. Nothing here
//! touches the filesystem.

pub mod branch;
pub mod containers;
pub mod diff;
pub mod error;
pub mod history;
pub mod manager;
pub mod models;
pub mod operation;
pub mod outcome;
pub mod pull_request;
pub mod repository;
pub mod session;
pub mod staging;

pub use error::{Error, Result};
pub use models::{Branch, Change, Commit, CommitId, FileStatus, PrStatus, PullRequest, StagedFile};
pub use operation::{Invocation, NamedArgs, OperationSpec, OPERATIONS};
pub use outcome::{Outcome, PrAction};
pub use repository::{Head, Repository};
pub use session::{Session, DEFAULT_AUTHOR};
