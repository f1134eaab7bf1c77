//! In-memory `GitHubClient` for handler tests
//!
//! Keeps just enough repository state for handlers to observe their own
//! effects, records every call in order and can be told to fail any operation.

use crate::context::EventContext;
use crate::handlers::default_registry;
use crate::registry::BatchReport;
use async_trait::async_trait;
use chrono::Utc;
use gh_client::{
    CheckConclusion, CheckRun, CheckRunStatus, GitHubClient, LockReason, MergeMethod, MergeResult,
    Milestone, PullRequest, RepoLabel, WorkflowRun, WorkflowRunConclusion, WorkflowRunStatus,
};
use oscar_config::{AccessConfig, BotConfig, LabelCatalog};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListIssueLabels(u64),
    AddLabels(u64, Vec<String>),
    RemoveLabel(u64, String),
    RemoveAllLabels(u64),
    AddAssignees(u64, Vec<String>),
    RemoveAssignees(u64, Vec<String>),
    Lock(u64, Option<LockReason>),
    Unlock(u64),
    SetTitle(u64, String),
    SetMilestone(u64, Option<u64>),
    ListMilestones,
    Pin(u64),
    Unpin(u64),
    Comment(u64, String),
    CreateIssue(String),
    FindOpenIssue(String, String),
    ListRepoLabels,
    CreateLabel(String, String, String),
    UpdateLabel(String, String, String),
    FetchPullRequest(u64),
    ListPullRequestFiles(u64),
    Merge(u64, MergeMethod),
    RequestReviewers(u64, Vec<String>),
    SetDraft(u64, bool),
    FetchCheckRuns(String),
    FetchWorkflowRuns(String),
    RerunWorkflow(u64),
    RerunJob(u64),
    CancelRun(u64),
    ForceCancelRun(u64),
    DispatchWorkflow(String, String),
}

#[derive(Default)]
pub(crate) struct FakeState {
    pub issue_labels: HashMap<u64, Vec<String>>,
    pub repo_labels: Vec<RepoLabel>,
    pub pull_requests: HashMap<u64, PullRequest>,
    pub pull_request_files: HashMap<u64, Vec<String>>,
    pub check_runs: HashMap<String, Vec<CheckRun>>,
    pub workflow_runs: Vec<WorkflowRun>,
    pub milestones: Vec<Milestone>,
    /// (number, label, title)
    pub open_issues: Vec<(u64, String, String)>,
    pub merge_result: Option<MergeResult>,
    failing: HashSet<&'static str>,
    calls: Vec<Call>,
}

pub(crate) struct FakeGitHub {
    state: Mutex<FakeState>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Direct access to the backing state for test setup and assertions
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_issue_labels(self, number: u64, labels: &[&str]) -> Self {
        self.state()
            .issue_labels
            .insert(number, labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_repo_label(self, name: &str, color: &str, description: &str) -> Self {
        self.state().repo_labels.push(RepoLabel {
            name: name.to_string(),
            color: color.to_string(),
            description: Some(description.to_string()),
        });
        self
    }

    pub fn with_pull_request(self, pr: PullRequest) -> Self {
        self.state().pull_requests.insert(pr.number, pr);
        self
    }

    pub fn with_changed_files(self, pr_number: u64, files: &[&str]) -> Self {
        self.state()
            .pull_request_files
            .insert(pr_number, files.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn with_check_runs(self, sha: &str, runs: Vec<CheckRun>) -> Self {
        self.state().check_runs.insert(sha.to_string(), runs);
        self
    }

    pub fn with_workflow_runs(self, runs: Vec<WorkflowRun>) -> Self {
        self.state().workflow_runs = runs;
        self
    }

    pub fn with_milestone(self, number: u64, title: &str) -> Self {
        self.state().milestones.push(Milestone {
            number,
            title: title.to_string(),
        });
        self
    }

    pub fn with_open_issue(self, number: u64, label: &str, title: &str) -> Self {
        self.state()
            .open_issues
            .push((number, label.to_string(), title.to_string()));
        self
    }

    /// Make every call of operation `op` (the trait method name) fail
    pub fn fail_on(self, op: &'static str) -> Self {
        self.state().failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn labels_on(&self, number: u64) -> Vec<String> {
        self.state()
            .issue_labels
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    pub fn comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Comment(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: &'static str, call: Call) -> anyhow::Result<MutexGuard<'_, FakeState>> {
        let mut state = self.state();
        state.calls.push(call);
        if state.failing.contains(op) {
            anyhow::bail!("{} failed", op);
        }
        Ok(state)
    }
}

/// `root` is admin, `alice` a collaborator, built-in labels only
pub(crate) fn config() -> BotConfig {
    BotConfig::new(
        AccessConfig {
            admins: vec!["root".to_string()],
            collaborators: vec!["alice".to_string()],
        },
        LabelCatalog::with_builtin(Vec::new()),
    )
}

pub(crate) fn issue_event(actor: &str, number: u64) -> EventContext {
    EventContext::new("acme", "oscar", actor, number)
}

pub(crate) fn pr_event(actor: &str, number: u64) -> EventContext {
    EventContext::new("acme", "oscar", actor, number).pull_request()
}

/// Run `text` through the default registry without the inter-command pause
pub(crate) async fn run_commands(
    client: &FakeGitHub,
    event: &EventContext,
    text: &str,
) -> BatchReport {
    default_registry()
        .with_command_delay(Duration::ZERO)
        .process(text, client, event, &config())
        .await
}

pub(crate) fn pull_request(number: u64, sha: &str) -> PullRequest {
    PullRequest {
        number,
        head_sha: sha.to_string(),
        head_branch: format!("feature-{}", number),
        merged: false,
        draft: false,
        mergeable: Some(true),
        updated_at: Utc::now(),
    }
}

pub(crate) fn check_run(
    name: &str,
    status: CheckRunStatus,
    conclusion: Option<CheckConclusion>,
) -> CheckRun {
    CheckRun {
        name: name.to_string(),
        status,
        conclusion,
    }
}

pub(crate) fn workflow_run(
    id: u64,
    sha: &str,
    status: WorkflowRunStatus,
    conclusion: Option<WorkflowRunConclusion>,
) -> WorkflowRun {
    WorkflowRun {
        id,
        name: format!("workflow-{}", id),
        status,
        conclusion,
        head_sha: sha.to_string(),
        head_branch: None,
        html_url: format!("https://github.com/acme/oscar/actions/runs/{}", id),
    }
}

#[async_trait]
impl GitHubClient for FakeGitHub {
    async fn list_issue_labels(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
    ) -> anyhow::Result<Vec<String>> {
        let state = self.record("list_issue_labels", Call::ListIssueLabels(number))?;
        Ok(state.issue_labels.get(&number).cloned().unwrap_or_default())
    }

    async fn add_labels(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        let mut state = self.record("add_labels", Call::AddLabels(number, labels.to_vec()))?;
        let current = state.issue_labels.entry(number).or_default();
        for label in labels {
            if !current.iter().any(|l| l.eq_ignore_ascii_case(label)) {
                current.push(label.clone());
            }
        }
        Ok(())
    }

    async fn remove_label(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.record("remove_label", Call::RemoveLabel(number, label.to_string()))?;
        let current = state.issue_labels.entry(number).or_default();
        let before = current.len();
        current.retain(|l| !l.eq_ignore_ascii_case(label));
        if current.len() == before {
            anyhow::bail!("Label does not exist");
        }
        Ok(())
    }

    async fn remove_all_labels(&self, _owner: &str, _repo: &str, number: u64) -> anyhow::Result<()> {
        let mut state = self.record("remove_all_labels", Call::RemoveAllLabels(number))?;
        state.issue_labels.remove(&number);
        Ok(())
    }

    async fn add_assignees(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        assignees: &[String],
    ) -> anyhow::Result<()> {
        self.record(
            "add_assignees",
            Call::AddAssignees(number, assignees.to_vec()),
        )?;
        Ok(())
    }

    async fn remove_assignees(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        assignees: &[String],
    ) -> anyhow::Result<()> {
        self.record(
            "remove_assignees",
            Call::RemoveAssignees(number, assignees.to_vec()),
        )?;
        Ok(())
    }

    async fn lock_issue(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        reason: Option<LockReason>,
    ) -> anyhow::Result<()> {
        self.record("lock_issue", Call::Lock(number, reason))?;
        Ok(())
    }

    async fn unlock_issue(&self, _owner: &str, _repo: &str, number: u64) -> anyhow::Result<()> {
        self.record("unlock_issue", Call::Unlock(number))?;
        Ok(())
    }

    async fn set_title(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        title: &str,
    ) -> anyhow::Result<()> {
        self.record("set_title", Call::SetTitle(number, title.to_string()))?;
        Ok(())
    }

    async fn set_milestone(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        milestone: Option<u64>,
    ) -> anyhow::Result<()> {
        self.record("set_milestone", Call::SetMilestone(number, milestone))?;
        Ok(())
    }

    async fn list_milestones(&self, _owner: &str, _repo: &str) -> anyhow::Result<Vec<Milestone>> {
        let state = self.record("list_milestones", Call::ListMilestones)?;
        Ok(state.milestones.clone())
    }

    async fn pin_issue(&self, _owner: &str, _repo: &str, number: u64) -> anyhow::Result<()> {
        self.record("pin_issue", Call::Pin(number))?;
        Ok(())
    }

    async fn unpin_issue(&self, _owner: &str, _repo: &str, number: u64) -> anyhow::Result<()> {
        self.record("unpin_issue", Call::Unpin(number))?;
        Ok(())
    }

    async fn create_comment(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        body: &str,
    ) -> anyhow::Result<()> {
        self.record("create_comment", Call::Comment(number, body.to_string()))?;
        Ok(())
    }

    async fn create_issue(
        &self,
        _owner: &str,
        _repo: &str,
        title: &str,
        _body: &str,
    ) -> anyhow::Result<u64> {
        let state = self.record("create_issue", Call::CreateIssue(title.to_string()))?;
        let highest = state
            .open_issues
            .iter()
            .map(|(n, _, _)| *n)
            .chain(state.pull_requests.keys().copied())
            .max()
            .unwrap_or(0);
        Ok(highest + 100)
    }

    async fn find_open_issue(
        &self,
        _owner: &str,
        _repo: &str,
        label: &str,
        title: &str,
    ) -> anyhow::Result<Option<u64>> {
        let state = self.record(
            "find_open_issue",
            Call::FindOpenIssue(label.to_string(), title.to_string()),
        )?;
        Ok(state
            .open_issues
            .iter()
            .find(|(_, l, t)| l == label && t == title)
            .map(|(n, _, _)| *n))
    }

    async fn list_repo_labels(&self, _owner: &str, _repo: &str) -> anyhow::Result<Vec<RepoLabel>> {
        let state = self.record("list_repo_labels", Call::ListRepoLabels)?;
        Ok(state.repo_labels.clone())
    }

    async fn create_label(
        &self,
        _owner: &str,
        _repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.record(
            "create_label",
            Call::CreateLabel(name.to_string(), color.to_string(), description.to_string()),
        )?;
        if state
            .repo_labels
            .iter()
            .any(|l| l.name.eq_ignore_ascii_case(name))
        {
            anyhow::bail!("Validation Failed: label '{}' already_exists", name);
        }
        state.repo_labels.push(RepoLabel {
            name: name.to_string(),
            color: color.to_string(),
            description: Some(description.to_string()),
        });
        Ok(())
    }

    async fn update_label(
        &self,
        _owner: &str,
        _repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.record(
            "update_label",
            Call::UpdateLabel(name.to_string(), color.to_string(), description.to_string()),
        )?;
        match state
            .repo_labels
            .iter_mut()
            .find(|l| l.name.eq_ignore_ascii_case(name))
        {
            Some(label) => {
                label.name = name.to_string();
                label.color = color.to_string();
                label.description = Some(description.to_string());
                Ok(())
            }
            None => anyhow::bail!("Not Found"),
        }
    }

    async fn fetch_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        let state = self.record("fetch_pull_request", Call::FetchPullRequest(pr_number))?;
        state
            .pull_requests
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Not Found"))
    }

    async fn list_pull_request_files(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<String>> {
        let state = self.record(
            "list_pull_request_files",
            Call::ListPullRequestFiles(pr_number),
        )?;
        Ok(state
            .pull_request_files
            .get(&pr_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn merge_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<MergeResult> {
        let mut state = self.record(
            "merge_pull_request",
            Call::Merge(pr_number, merge_method),
        )?;
        let result = state.merge_result.clone().unwrap_or(MergeResult {
            merged: true,
            sha: Some("merged-sha".to_string()),
            message: "Pull Request successfully merged".to_string(),
        });
        if result.merged {
            if let Some(pr) = state.pull_requests.get_mut(&pr_number) {
                pr.merged = true;
            }
        }
        Ok(result)
    }

    async fn request_reviewers(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
        reviewers: &[String],
    ) -> anyhow::Result<()> {
        self.record(
            "request_reviewers",
            Call::RequestReviewers(pr_number, reviewers.to_vec()),
        )?;
        Ok(())
    }

    async fn set_draft(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
        draft: bool,
    ) -> anyhow::Result<()> {
        let mut state = self.record("set_draft", Call::SetDraft(pr_number, draft))?;
        if let Some(pr) = state.pull_requests.get_mut(&pr_number) {
            pr.draft = draft;
        }
        Ok(())
    }

    async fn fetch_check_runs(
        &self,
        _owner: &str,
        _repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<Vec<CheckRun>> {
        let state = self.record(
            "fetch_check_runs",
            Call::FetchCheckRuns(commit_sha.to_string()),
        )?;
        Ok(state.check_runs.get(commit_sha).cloned().unwrap_or_default())
    }

    async fn fetch_workflow_runs(
        &self,
        _owner: &str,
        _repo: &str,
        head_sha: &str,
    ) -> anyhow::Result<Vec<WorkflowRun>> {
        let state = self.record(
            "fetch_workflow_runs",
            Call::FetchWorkflowRuns(head_sha.to_string()),
        )?;
        Ok(state
            .workflow_runs
            .iter()
            .filter(|r| r.head_sha == head_sha)
            .cloned()
            .collect())
    }

    async fn rerun_workflow(&self, _owner: &str, _repo: &str, run_id: u64) -> anyhow::Result<()> {
        self.record("rerun_workflow", Call::RerunWorkflow(run_id))?;
        Ok(())
    }

    async fn rerun_job(&self, _owner: &str, _repo: &str, job_id: u64) -> anyhow::Result<()> {
        self.record("rerun_job", Call::RerunJob(job_id))?;
        Ok(())
    }

    async fn cancel_workflow_run(
        &self,
        _owner: &str,
        _repo: &str,
        run_id: u64,
    ) -> anyhow::Result<()> {
        self.record("cancel_workflow_run", Call::CancelRun(run_id))?;
        Ok(())
    }

    async fn force_cancel_workflow_run(
        &self,
        _owner: &str,
        _repo: &str,
        run_id: u64,
    ) -> anyhow::Result<()> {
        self.record("force_cancel_workflow_run", Call::ForceCancelRun(run_id))?;
        Ok(())
    }

    async fn dispatch_workflow(
        &self,
        _owner: &str,
        _repo: &str,
        workflow: &str,
        git_ref: &str,
    ) -> anyhow::Result<()> {
        self.record(
            "dispatch_workflow",
            Call::DispatchWorkflow(workflow.to_string(), git_ref.to_string()),
        )?;
        Ok(())
    }
}
