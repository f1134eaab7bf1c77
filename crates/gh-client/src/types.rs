//! Plain data the bot reads back from GitHub
//!
//! Only the fields the command handlers and the merge gate look at are
//! kept. Octocrab models never leak past this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pull request state as seen by the merge gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,

    /// Commit the check runs are looked up for
    pub head_sha: String,

    /// Source branch, used as the default ref for `/run-workflow`
    pub head_branch: String,

    pub merged: bool,
    pub draft: bool,

    /// `None` while GitHub is still computing it
    pub mergeable: Option<bool>,

    pub updated_at: DateTime<Utc>,
}

/// One check run attached to a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: CheckRunStatus,
    /// Only present once `status` is `completed`
    pub conclusion: Option<CheckConclusion>,
}

/// Lifecycle status of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    Pending,
    Requested,
    Waiting,
    InProgress,
    Completed,
    /// Any status GitHub adds later; treated as not finished
    #[serde(other)]
    Unknown,
}

impl CheckRunStatus {
    /// Whether the run has reached its terminal state
    pub fn is_completed(&self) -> bool {
        matches!(self, CheckRunStatus::Completed)
    }
}

/// How a completed check run ended
///
/// Only `Failure` blocks a merge; the others are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    #[serde(other)]
    Unknown,
}

/// `/merge` strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    Merge,
    #[default]
    Squash,
    Rebase,
}

/// What the merge endpoint answered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResult {
    pub merged: bool,
    /// Merge commit, when one was made
    pub sha: Option<String>,
    pub message: String,
}

/// One run of a GitHub Actions workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub name: String,
    pub status: WorkflowRunStatus,
    pub conclusion: Option<WorkflowRunConclusion>,
    pub head_sha: String,
    pub head_branch: Option<String>,
    pub html_url: String,
}

/// Where a workflow run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunStatus {
    Queued,
    Waiting,
    Requested,
    InProgress,
    Completed,
    Pending,
    #[serde(other)]
    Unknown,
}

/// How a finished workflow run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

impl WorkflowRun {
    /// Whether the run ended badly enough to be worth re-running
    pub fn is_failed(&self) -> bool {
        matches!(
            self.conclusion,
            Some(
                WorkflowRunConclusion::Failure
                    | WorkflowRunConclusion::TimedOut
                    | WorkflowRunConclusion::Cancelled
                    | WorkflowRunConclusion::StartupFailure
            )
        )
    }

    /// Whether the run can still be cancelled
    pub fn is_active(&self) -> bool {
        !matches!(self.status, WorkflowRunStatus::Completed)
    }
}

/// A label as it exists on a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLabel {
    pub name: String,
    /// Six hex digits, no leading `#`
    pub color: String,
    pub description: Option<String>,
}

/// A repository milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

/// Reason attached to a conversation lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockReason {
    OffTopic,
    TooHeated,
    Resolved,
    Spam,
}

impl LockReason {
    /// Parse the user-facing spelling (`off-topic`, `too heated`, ...)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "off-topic" => Some(LockReason::OffTopic),
            "too-heated" => Some(LockReason::TooHeated),
            "resolved" => Some(LockReason::Resolved),
            "spam" => Some(LockReason::Spam),
            _ => None,
        }
    }
}
