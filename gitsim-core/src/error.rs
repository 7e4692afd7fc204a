use thiserror::Error;

use crate::models::PrStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Command '{0}' is disabled")]
    CommandDisabled(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Repository already exists: {0}")]
    DuplicateRepositoryName(String),

    #[error("No repository selected")]
    NoActiveRepository,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Nothing to commit")]
    NothingStaged,

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Branch already exists: {0}")]
    BranchAlreadyExists(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Pull request not found: {0}")]
    PullRequestNotFound(String),

    #[error("Pull request {id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        id: String,
        from: PrStatus,
        to: PrStatus,
    },
}

impl Error {
    /// Stable name of the failure kind, used by the command layer when rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::CommandDisabled(_) => "CommandDisabled",
            Error::UnknownCommand(_) => "UnknownCommand",
            Error::InvalidArguments(_) => "InvalidArguments",
            Error::RepositoryNotFound(_) => "RepositoryNotFound",
            Error::DuplicateRepositoryName(_) => "DuplicateRepositoryName",
            Error::NoActiveRepository => "NoActiveRepository",
            Error::FileNotFound(_) => "FileNotFound",
            Error::NothingStaged => "NothingStaged",
            Error::BranchNotFound(_) => "BranchNotFound",
            Error::BranchAlreadyExists(_) => "BranchAlreadyExists",
            Error::InvalidOperation(_) => "InvalidOperation",
            Error::CommitNotFound(_) => "CommitNotFound",
            Error::PullRequestNotFound(_) => "PullRequestNotFound",
            Error::InvalidStatusTransition { .. } => "InvalidStatusTransition",
        }
    }
}
