//! Webhook payload model and event context derivation
//!
//! Only the fields the bot reads are modelled; everything else in the
//! delivery is ignored by serde.

use crate::error::ContextError;
use serde::Deserialize;

/// The subset of a GitHub webhook delivery the bot understands
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub repository: Option<RepositoryPayload>,
    #[serde(default)]
    pub sender: Option<UserPayload>,
    #[serde(default)]
    pub comment: Option<CommentPayload>,
    #[serde(default)]
    pub issue: Option<IssuePayload>,
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
    #[serde(default)]
    pub workflow_run: Option<WorkflowRunPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub name: String,
    pub owner: UserPayload,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl UserPayload {
    pub fn is_bot(&self) -> bool {
        self.kind.as_deref() == Some("Bot")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<UserPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePayload {
    pub number: u64,
    /// Present (with arbitrary content) when the issue is a pull request
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunPayload {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    pub html_url: String,
}

impl EventPayload {
    /// The user who acted: the comment author when there is one, else the sender
    pub fn actor(&self) -> Option<&UserPayload> {
        self.comment
            .as_ref()
            .and_then(|c| c.user.as_ref())
            .or(self.sender.as_ref())
    }
}

/// Read-only view of one event shared by every handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub owner: String,
    pub repo: String,
    /// Login of the user who triggered the event
    pub actor: String,
    /// Issue number if present, otherwise pull request number
    pub number: u64,
    pub is_pull_request: bool,
    pub default_branch: Option<String>,
}

impl EventContext {
    /// Derive the context of an event
    ///
    /// The target is the issue number when the payload has an issue (issue
    /// comments on pull requests included), otherwise the pull request number.
    /// A payload with neither is an error.
    pub fn from_payload(payload: &EventPayload) -> Result<Self, ContextError> {
        let repository = payload
            .repository
            .as_ref()
            .ok_or(ContextError::MissingRepository)?;

        let (number, is_pull_request) = match (&payload.issue, &payload.pull_request) {
            (Some(issue), _) => (issue.number, issue.pull_request.is_some()),
            (None, Some(pr)) => (pr.number, true),
            (None, None) => return Err(ContextError::MissingTarget),
        };

        let actor = payload
            .actor()
            .map(|u| u.login.clone())
            .filter(|login| !login.is_empty())
            .ok_or(ContextError::MissingActor)?;

        Ok(Self {
            owner: repository.owner.login.clone(),
            repo: repository.name.clone(),
            actor,
            number,
            is_pull_request,
            default_branch: repository.default_branch.clone(),
        })
    }

    /// Context for a call made directly rather than from a webhook
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        actor: impl Into<String>,
        number: u64,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            actor: actor.into(),
            number,
            is_pull_request: false,
            default_branch: None,
        }
    }

    pub fn pull_request(mut self) -> Self {
        self.is_pull_request = true;
        self
    }
}
