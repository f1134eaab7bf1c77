//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab library.
//! Endpoints octocrab has no typed builder for go through raw routes.

use crate::client::GitHubClient;
use crate::types::{
    CheckRun, LockReason, MergeMethod, MergeResult, Milestone, PullRequest,
    RepoLabel, WorkflowRun, WorkflowRunConclusion, WorkflowRunStatus,
};
use async_trait::async_trait;
use log::debug;
use octocrab::{params, Octocrab};
use serde::Deserialize;
use std::sync::Arc;

const PER_PAGE: u8 = 100;

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// POST to an endpoint that answers with an empty body
    async fn post_no_content(
        &self,
        route: String,
        body: Option<&serde_json::Value>,
    ) -> anyhow::Result<()> {
        let response = self.octocrab._post(route, body).await?;
        octocrab::map_github_error(response).await?;
        Ok(())
    }

    /// Run a single-input GraphQL mutation against a node id
    async fn node_mutation(
        &self,
        mutation: &str,
        input_field: &str,
        node_id: &str,
    ) -> anyhow::Result<()> {
        let query = format!(
            r#"mutation {{
                {mutation}(input: {{ {input_field}: "{node_id}" }}) {{
                    clientMutationId
                }}
            }}"#
        );

        let response: serde_json::Value = self
            .octocrab
            .graphql(&serde_json::json!({ "query": query }))
            .await?;

        if let Some(errors) = response.get("errors") {
            return Err(anyhow::anyhow!("GraphQL error in {}: {}", mutation, errors));
        }

        Ok(())
    }

    async fn pull_request_node_id(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<String> {
        let pr = self.octocrab.pulls(owner, repo).get(pr_number).await?;
        pr.node_id
            .ok_or_else(|| anyhow::anyhow!("PR #{} does not have a node_id", pr_number))
    }
}

#[derive(Debug, Deserialize)]
struct CheckRunsResponse {
    total_count: u64,
    check_runs: Vec<CheckRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    workflow_runs: Vec<WorkflowRunDto>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunDto {
    id: u64,
    name: Option<String>,
    status: Option<WorkflowRunStatus>,
    conclusion: Option<WorkflowRunConclusion>,
    head_sha: String,
    head_branch: Option<String>,
    html_url: String,
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn list_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> anyhow::Result<Vec<String>> {
        debug!("Fetching labels of {}/{}#{}", owner, repo, number);

        let page = self
            .octocrab
            .issues(owner, repo)
            .list_labels_for_issue(number)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let labels = self.octocrab.all_pages(page).await?;

        Ok(labels.into_iter().map(|label| label.name).collect())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .remove_label(number, label)
            .await?;
        Ok(())
    }

    async fn remove_all_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .replace_all_labels(number, &[])
            .await?;
        Ok(())
    }

    async fn add_assignees(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignees: &[String],
    ) -> anyhow::Result<()> {
        let assignees: Vec<&str> = assignees.iter().map(String::as_str).collect();
        self.octocrab
            .issues(owner, repo)
            .add_assignees(number, &assignees)
            .await?;
        Ok(())
    }

    async fn remove_assignees(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        assignees: &[String],
    ) -> anyhow::Result<()> {
        let assignees: Vec<&str> = assignees.iter().map(String::as_str).collect();
        self.octocrab
            .issues(owner, repo)
            .remove_assignees(number, &assignees)
            .await?;
        Ok(())
    }

    async fn lock_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        reason: Option<LockReason>,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .lock(number, reason.map(convert_lock_reason))
            .await?;
        Ok(())
    }

    async fn unlock_issue(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<()> {
        self.octocrab.issues(owner, repo).unlock(number).await?;
        Ok(())
    }

    async fn set_title(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        title: &str,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .update(number)
            .title(title)
            .send()
            .await?;
        Ok(())
    }

    async fn set_milestone(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        milestone: Option<u64>,
    ) -> anyhow::Result<()> {
        // The typed update builder cannot send `null`, so clearing needs a raw PATCH
        let route = format!("/repos/{}/{}/issues/{}", owner, repo, number);
        let body = serde_json::json!({ "milestone": milestone });
        let _: serde_json::Value = self.octocrab.patch(route, Some(&body)).await?;
        Ok(())
    }

    async fn list_milestones(&self, owner: &str, repo: &str) -> anyhow::Result<Vec<Milestone>> {
        let route = format!("/repos/{}/{}/milestones", owner, repo);
        let milestones: Vec<Milestone> = self
            .octocrab
            .get(route, Some(&[("state", "all"), ("per_page", "100")]))
            .await?;
        Ok(milestones)
    }

    async fn pin_issue(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<()> {
        let issue = self.octocrab.issues(owner, repo).get(number).await?;
        self.node_mutation("pinIssue", "issueId", &issue.node_id)
            .await
    }

    async fn unpin_issue(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<()> {
        let issue = self.octocrab.issues(owner, repo).get(number).await?;
        self.node_mutation("unpinIssue", "issueId", &issue.node_id)
            .await
    }

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .create_comment(number, body)
            .await?;
        Ok(())
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> anyhow::Result<u64> {
        let issue = self
            .octocrab
            .issues(owner, repo)
            .create(title)
            .body(body)
            .send()
            .await?;
        Ok(issue.number)
    }

    async fn find_open_issue(
        &self,
        owner: &str,
        repo: &str,
        label: &str,
        title: &str,
    ) -> anyhow::Result<Option<u64>> {
        let labels = vec![label.to_string()];
        let page = self
            .octocrab
            .issues(owner, repo)
            .list()
            .state(params::State::Open)
            .labels(&labels)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let issues = self.octocrab.all_pages(page).await?;

        Ok(issues
            .into_iter()
            .find(|issue| issue.pull_request.is_none() && issue.title == title)
            .map(|issue| issue.number))
    }

    async fn list_repo_labels(&self, owner: &str, repo: &str) -> anyhow::Result<Vec<RepoLabel>> {
        debug!("Fetching labels of {}/{}", owner, repo);

        let page = self
            .octocrab
            .issues(owner, repo)
            .list_labels_for_repo()
            .per_page(PER_PAGE)
            .send()
            .await?;
        let labels = self.octocrab.all_pages(page).await?;

        Ok(labels
            .into_iter()
            .map(|label| RepoLabel {
                name: label.name,
                color: label.color,
                description: label.description,
            })
            .collect())
    }

    async fn create_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .create_label(name, color, description)
            .await?;
        Ok(())
    }

    async fn update_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        debug!("Updating label '{}' in {}/{}", name, owner, repo);
        let route = label_route(owner, repo, name);
        let body = label_update_body(name, color, description);
        let _: serde_json::Value = self.octocrab.patch(route, Some(&body)).await?;
        Ok(())
    }

    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        debug!("Fetching PR {}/{}#{}", owner, repo, pr_number);

        let pr = self.octocrab.pulls(owner, repo).get(pr_number).await?;
        Ok(convert_pull_request(&pr))
    }

    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<String>> {
        debug!("Fetching changed files of {}/{}#{}", owner, repo, pr_number);

        let page = self.octocrab.pulls(owner, repo).list_files(pr_number).await?;
        let files = self.octocrab.all_pages(page).await?;

        Ok(files.into_iter().map(|file| file.filename).collect())
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<MergeResult> {
        let merge = self
            .octocrab
            .pulls(owner, repo)
            .merge(pr_number)
            .method(convert_merge_method(merge_method))
            .send()
            .await?;

        Ok(MergeResult {
            merged: merge.merged,
            sha: merge.sha,
            message: merge.message.unwrap_or_default(),
        })
    }

    async fn request_reviewers(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        reviewers: &[String],
    ) -> anyhow::Result<()> {
        self.octocrab
            .pulls(owner, repo)
            .request_reviews(pr_number, reviewers.to_vec(), Vec::<String>::new())
            .await?;
        Ok(())
    }

    async fn set_draft(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        draft: bool,
    ) -> anyhow::Result<()> {
        let node_id = self.pull_request_node_id(owner, repo, pr_number).await?;
        let mutation = if draft {
            "convertPullRequestToDraft"
        } else {
            "markPullRequestReadyForReview"
        };
        self.node_mutation(mutation, "pullRequestId", &node_id).await
    }

    async fn fetch_check_runs(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<Vec<CheckRun>> {
        debug!(
            "Fetching check runs for {}/{} @ {}",
            owner, repo, commit_sha
        );

        // Raw route keeps the real `status` string, which the typed model drops
        let route = format!("/repos/{}/{}/commits/{}/check-runs", owner, repo, commit_sha);
        let mut runs = Vec::new();
        let mut page_num = 1u32;

        loop {
            let page = page_num.to_string();
            let response: CheckRunsResponse = self
                .octocrab
                .get(
                    &route,
                    Some(&[("per_page", "100"), ("page", page.as_str())]),
                )
                .await?;

            let received = response.check_runs.len();
            runs.extend(response.check_runs);

            if received < PER_PAGE as usize || runs.len() as u64 >= response.total_count {
                break;
            }
            page_num += 1;
        }

        debug!("Fetched {} check runs @ {}", runs.len(), commit_sha);
        Ok(runs)
    }

    async fn fetch_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        head_sha: &str,
    ) -> anyhow::Result<Vec<WorkflowRun>> {
        let route = format!("/repos/{}/{}/actions/runs", owner, repo);
        let response: WorkflowRunsResponse = self
            .octocrab
            .get(route, Some(&[("head_sha", head_sha), ("per_page", "100")]))
            .await?;

        Ok(response
            .workflow_runs
            .into_iter()
            .map(convert_workflow_run)
            .collect())
    }

    async fn rerun_workflow(&self, owner: &str, repo: &str, run_id: u64) -> anyhow::Result<()> {
        let route = format!("/repos/{}/{}/actions/runs/{}/rerun", owner, repo, run_id);
        self.post_no_content(route, None).await
    }

    async fn rerun_job(&self, owner: &str, repo: &str, job_id: u64) -> anyhow::Result<()> {
        let route = format!("/repos/{}/{}/actions/jobs/{}/rerun", owner, repo, job_id);
        self.post_no_content(route, None).await
    }

    async fn cancel_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> anyhow::Result<()> {
        let route = format!("/repos/{}/{}/actions/runs/{}/cancel", owner, repo, run_id);
        self.post_no_content(route, None).await
    }

    async fn force_cancel_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> anyhow::Result<()> {
        let route = format!(
            "/repos/{}/{}/actions/runs/{}/force-cancel",
            owner, repo, run_id
        );
        self.post_no_content(route, None).await
    }

    async fn dispatch_workflow(
        &self,
        owner: &str,
        repo: &str,
        workflow: &str,
        git_ref: &str,
    ) -> anyhow::Result<()> {
        let route = format!(
            "/repos/{}/{}/actions/workflows/{}/dispatches",
            owner,
            repo,
            urlencoding::encode(workflow)
        );
        let body = serde_json::json!({ "ref": git_ref });
        self.post_no_content(route, Some(&body)).await
    }
}

fn convert_pull_request(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        head_sha: pr.head.sha.clone(),
        head_branch: pr.head.ref_field.clone(),
        merged: pr.merged.unwrap_or(false) || pr.merged_at.is_some(),
        draft: pr.draft.unwrap_or(false),
        mergeable: pr.mergeable,
        updated_at: pr.updated_at.unwrap_or_else(chrono::Utc::now),
    }
}

fn convert_merge_method(method: MergeMethod) -> params::pulls::MergeMethod {
    match method {
        MergeMethod::Merge => params::pulls::MergeMethod::Merge,
        MergeMethod::Squash => params::pulls::MergeMethod::Squash,
        MergeMethod::Rebase => params::pulls::MergeMethod::Rebase,
    }
}

fn convert_lock_reason(reason: LockReason) -> params::LockReason {
    match reason {
        LockReason::OffTopic => params::LockReason::OffTopic,
        LockReason::TooHeated => params::LockReason::TooHeated,
        LockReason::Resolved => params::LockReason::Resolved,
        LockReason::Spam => params::LockReason::Spam,
    }
}

fn convert_workflow_run(run: WorkflowRunDto) -> WorkflowRun {
    WorkflowRun {
        id: run.id,
        name: run.name.unwrap_or_else(|| format!("run {}", run.id)),
        status: run.status.unwrap_or(WorkflowRunStatus::Unknown),
        conclusion: run.conclusion,
        head_sha: run.head_sha,
        head_branch: run.head_branch,
        html_url: run.html_url,
    }
}

/// Route of one repository label; names may contain spaces, slashes or emoji
fn label_route(owner: &str, repo: &str, name: &str) -> String {
    format!("/repos/{}/{}/labels/{}", owner, repo, urlencoding::encode(name))
}

/// PATCH body that also renames, so a label whose casing drifted takes the catalog's
fn label_update_body(name: &str, color: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "new_name": name,
        "color": color,
        "description": description,
    })
}
