//! Webhook event routing
//!
//! | event           | action             | effect                                 |
//! |-----------------|--------------------|----------------------------------------|
//! | `issue_comment` | `created`/`edited` | run the comment's commands             |
//! | `issues`        | `opened`           | apply `needs-triage`                   |
//! | `pull_request`  | `opened`           | apply `needs-triage` and path labels   |
//! | `pull_request`  | `reopened`         | apply path labels                      |
//! | `workflow_run`  | `completed`        | report default branch failures         |
//!
//! Everything else is ignored.

use crate::context::{EventContext, EventPayload};
use crate::error::{CommandError, ContextError};
use crate::reconcile::ensure_and_apply;
use crate::registry::{BatchReport, CommandRegistry};
use gh_client::GitHubClient;
use oscar_config::{BotConfig, CI_FAILURE, NEEDS_TRIAGE};

/// What handling one delivery amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored(String),
    Commands(BatchReport),
    Triaged(Vec<String>),
    CiFailureReported { issue: u64, created: bool },
}

pub async fn handle_event(
    event_name: &str,
    payload: &EventPayload,
    client: &dyn GitHubClient,
    config: &BotConfig,
    registry: &CommandRegistry,
) -> Result<EventOutcome, CommandError> {
    let action = payload.action.as_deref().unwrap_or_default();

    match (event_name, action) {
        ("issue_comment", "created" | "edited") => {
            on_comment(payload, client, config, registry).await
        }
        ("issues", "opened") | ("pull_request", "opened" | "reopened") => {
            on_opened(payload, action, client, config).await
        }
        ("workflow_run", "completed") => on_workflow_run(payload, client, config).await,
        _ => {
            log::debug!("Ignoring {} event with action '{}'", event_name, action);
            Ok(EventOutcome::Ignored(format!(
                "unsupported event {}/{}",
                event_name, action
            )))
        }
    }
}

async fn on_comment(
    payload: &EventPayload,
    client: &dyn GitHubClient,
    config: &BotConfig,
    registry: &CommandRegistry,
) -> Result<EventOutcome, CommandError> {
    if payload.actor().is_some_and(|user| user.is_bot()) {
        return Ok(EventOutcome::Ignored("comment by a bot".to_string()));
    }

    let event = EventContext::from_payload(payload)?;
    if !config.check_permissions(&event.actor) {
        log::info!(
            "Ignoring comment by @{} on {}/{}#{}, not permitted",
            event.actor,
            event.owner,
            event.repo,
            event.number
        );
        return Ok(EventOutcome::Ignored(format!(
            "@{} may not run commands",
            event.actor
        )));
    }

    let body = payload
        .comment
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .unwrap_or_default();
    let report = registry.process(body, client, &event, config).await;
    Ok(EventOutcome::Commands(report))
}

async fn on_opened(
    payload: &EventPayload,
    action: &str,
    client: &dyn GitHubClient,
    config: &BotConfig,
) -> Result<EventOutcome, CommandError> {
    let event = EventContext::from_payload(payload)?;

    let mut wanted = Vec::new();
    if action == "opened" {
        wanted.push(NEEDS_TRIAGE.to_string());
    }
    if event.is_pull_request {
        let files = client
            .list_pull_request_files(&event.owner, &event.repo, event.number)
            .await?;
        let matched = config.labels.matching_paths(&files);
        log::debug!(
            "#{} touches {} files, path labels: [{}]",
            event.number,
            files.len(),
            matched.join(", ")
        );
        wanted.extend(matched.into_iter().map(str::to_string));
    }

    let applied = ensure_and_apply(
        client,
        &event.owner,
        &event.repo,
        event.number,
        &wanted,
        &config.labels,
    )
    .await?;
    Ok(EventOutcome::Triaged(applied))
}

async fn on_workflow_run(
    payload: &EventPayload,
    client: &dyn GitHubClient,
    config: &BotConfig,
) -> Result<EventOutcome, CommandError> {
    let Some(run) = payload.workflow_run.as_ref() else {
        return Ok(EventOutcome::Ignored("no workflow run in payload".to_string()));
    };
    let repository = payload
        .repository
        .as_ref()
        .ok_or(ContextError::MissingRepository)?;

    if run.conclusion.as_deref() != Some("failure") {
        return Ok(EventOutcome::Ignored("workflow run did not fail".to_string()));
    }
    if repository.default_branch.is_none() || run.head_branch != repository.default_branch {
        return Ok(EventOutcome::Ignored(
            "workflow run is not on the default branch".to_string(),
        ));
    }

    let (owner, repo) = (repository.owner.login.as_str(), repository.name.as_str());
    let title = format!(
        "Workflow failed: {}",
        run.name.as_deref().unwrap_or("unnamed workflow")
    );

    if let Some(issue) = client.find_open_issue(owner, repo, CI_FAILURE, &title).await? {
        client
            .create_comment(
                owner,
                repo,
                issue,
                &format!("Failed again: {}", run.html_url),
            )
            .await?;
        log::info!("Reported workflow run {} on existing issue #{}", run.id, issue);
        return Ok(EventOutcome::CiFailureReported {
            issue,
            created: false,
        });
    }

    let body = format!(
        "The workflow run {} on the default branch failed.\n\n{}",
        run.id, run.html_url
    );
    let issue = client.create_issue(owner, repo, &title, &body).await?;
    ensure_and_apply(client, owner, repo, issue, &[CI_FAILURE], &config.labels).await?;
    log::info!("Opened issue #{} for failed workflow run {}", issue, run.id);

    Ok(EventOutcome::CiFailureReported {
        issue,
        created: true,
    })
}
