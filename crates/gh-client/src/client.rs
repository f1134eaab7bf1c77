//! GitHub client trait
//!
//! This module defines the core `GitHubClient` trait: every platform call the
//! bot makes goes through it, so command handlers can be exercised against an
//! in-memory fake.

use crate::types::{
    CheckRun, LockReason, MergeMethod, MergeResult, Milestone, PullRequest, RepoLabel,
    WorkflowRun,
};
use async_trait::async_trait;

/// Everything the bot asks of GitHub
///
/// "Issue number" arguments accept pull request numbers as well, since
/// GitHub shares the issue endpoints between both. Errors are reported as
/// `anyhow::Error` with the failing operation in the context chain.
///
/// ```rust,ignore
/// use gh_client::GitHubClient;
///
/// async fn triage(client: &dyn GitHubClient) -> anyhow::Result<()> {
///     client.add_labels("rust-lang", "rust", 42, &["needs-triage".to_string()]).await
/// }
/// ```
#[async_trait]
pub trait GitHubClient: Send + Sync {
    // --- issues ---

    /// List the names of labels attached to an issue or pull request
    async fn list_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> anyhow::Result<Vec<String>>;

    /// Attach labels to an issue or pull request
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// Detach a single label from an issue or pull request
    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> anyhow::Result<()>;

    /// Detach every label from an issue or pull request
    async fn remove_all_labels(&self, owner: &str, repo: &str, number: u64)
        -> anyhow::Result<()>;

    async fn add_assignees(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignees: &[String],
    ) -> anyhow::Result<()>;

    async fn remove_assignees(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignees: &[String],
    ) -> anyhow::Result<()>;

    /// Lock the conversation, optionally recording a reason
    async fn lock_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        reason: Option<LockReason>,
    ) -> anyhow::Result<()>;

    async fn unlock_issue(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<()>;

    async fn set_title(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        title: &str,
    ) -> anyhow::Result<()>;

    /// Set (`Some`) or clear (`None`) the milestone of an issue
    async fn set_milestone(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        milestone: Option<u64>,
    ) -> anyhow::Result<()>;

    /// List all milestones (open and closed) of a repository
    async fn list_milestones(&self, owner: &str, repo: &str) -> anyhow::Result<Vec<Milestone>>;

    async fn pin_issue(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<()>;

    async fn unpin_issue(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<()>;

    /// Post a comment on an issue or pull request
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> anyhow::Result<()>;

    /// Open a new issue and return its number
    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> anyhow::Result<u64>;

    /// Find an open issue carrying `label` whose title equals `title`
    async fn find_open_issue(
        &self,
        owner: &str,
        repo: &str,
        label: &str,
        title: &str,
    ) -> anyhow::Result<Option<u64>>;

    // --- repository labels ---

    /// List every label defined on the repository
    async fn list_repo_labels(&self, owner: &str, repo: &str) -> anyhow::Result<Vec<RepoLabel>>;

    async fn create_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> anyhow::Result<()>;

    /// Reset an existing repository label to `name`, `color` and `description`
    ///
    /// The label is looked up case-insensitively and renamed to `name`, so a
    /// label created by hand as `Do-Not-Merge` ends up as `do-not-merge`.
    async fn update_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> anyhow::Result<()>;

    // --- pull requests ---

    /// Current state of one pull request
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest>;

    /// Paths of every file the pull request touches, after the change
    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<String>>;

    /// Merge with the given strategy; a refused merge is `Ok` with `merged == false`
    ///
    /// A `merged == false` result is not an error at this layer; callers
    /// decide what to do with the message.
    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<MergeResult>;

    async fn request_reviewers(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        reviewers: &[String],
    ) -> anyhow::Result<()>;

    /// Toggle the draft flag of a pull request
    async fn set_draft(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        draft: bool,
    ) -> anyhow::Result<()>;

    // --- checks and actions ---

    /// All check runs reported for a commit
    async fn fetch_check_runs(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<Vec<CheckRun>>;

    /// Actions runs triggered for a commit
    async fn fetch_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        head_sha: &str,
    ) -> anyhow::Result<Vec<WorkflowRun>>;

    /// Re-run every job of a workflow run
    async fn rerun_workflow(&self, owner: &str, repo: &str, run_id: u64) -> anyhow::Result<()>;

    /// Re-run a single job
    async fn rerun_job(&self, owner: &str, repo: &str, job_id: u64) -> anyhow::Result<()>;

    async fn cancel_workflow_run(&self, owner: &str, repo: &str, run_id: u64)
        -> anyhow::Result<()>;

    /// Cancel a workflow run, bypassing `always()` conditions
    async fn force_cancel_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> anyhow::Result<()>;

    /// Trigger a `workflow_dispatch` event
    ///
    /// `workflow` is either the numeric workflow id or its file name.
    async fn dispatch_workflow(
        &self,
        owner: &str,
        repo: &str,
        workflow: &str,
        git_ref: &str,
    ) -> anyhow::Result<()>;
}
