//! Error types for command processing
//!
//! Only `ReconcileError` and transport failures abort a handler; nothing
//! here is fatal to a batch or to the process.

use thiserror::Error;

/// The webhook payload lacks something every handler needs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("payload has no repository")]
    MissingRepository,

    #[error("payload has neither an issue nor a pull request number")]
    MissingTarget,

    #[error("payload has no acting user")]
    MissingActor,
}

/// The label catalog could not be brought in line with the repository
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("failed to list labels of {owner}/{repo}: {source}")]
    List {
        owner: String,
        repo: String,
        source: anyhow::Error,
    },

    #[error("failed to update label '{name}': {source}")]
    Update { name: String, source: anyhow::Error },

    #[error("failed to create label '{name}': {source}")]
    Create { name: String, source: anyhow::Error },

    #[error("failed to apply labels to #{number}: {source}")]
    Apply { number: u64, source: anyhow::Error },
}

/// Failure of a single command
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("invalid arguments for `{command}`: {reason}")]
    InvalidArguments { command: String, reason: String },

    #[error("`{0}` only works on pull requests")]
    NotAPullRequest(String),

    #[error("@{user} is not allowed to run `{command}`")]
    PermissionDenied { user: String, command: String },

    #[error("merge of #{number} was rejected: {message}")]
    MergeRejected { number: u64, message: String },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Api(#[from] anyhow::Error),
}

impl CommandError {
    pub(crate) fn invalid(command: &str, reason: impl Into<String>) -> Self {
        CommandError::InvalidArguments {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}
