//! GitHub Actions control
//!
//! Run selection defaults to the runs on the pull request's head commit when
//! no ids are given.

use super::{parse_ids, require_pull_request};
use crate::error::CommandError;
use crate::registry::{CommandArgs, CommandContext, CommandHandler};
use async_trait::async_trait;
use gh_client::WorkflowRun;

/// Workflow runs on the head commit of the event's pull request
async fn head_runs(
    args: &CommandArgs<'_>,
    cx: &CommandContext<'_>,
) -> Result<Vec<WorkflowRun>, CommandError> {
    require_pull_request(args, cx)?;
    let pr = cx
        .client
        .fetch_pull_request(cx.owner(), cx.repo(), cx.number())
        .await?;
    Ok(cx
        .client
        .fetch_workflow_runs(cx.owner(), cx.repo(), &pr.head_sha)
        .await?)
}

/// `/restart-workflow [run-id ...]`
pub struct RestartWorkflowCommand;

#[async_trait]
impl CommandHandler for RestartWorkflowCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        let ids: Vec<u64> = if args.is_empty() {
            head_runs(args, cx)
                .await?
                .into_iter()
                .filter(WorkflowRun::is_failed)
                .map(|run| run.id)
                .collect()
        } else {
            parse_ids(args)?
        };

        if ids.is_empty() {
            log::info!("No failed workflow runs to restart on #{}", cx.number());
        }
        for id in ids {
            cx.client.rerun_workflow(cx.owner(), cx.repo(), id).await?;
            log::info!("Restarted workflow run {}", id);
        }
        Ok(())
    }
}

/// `/retry-job <job-id ...>`
pub struct RetryJobCommand;

#[async_trait]
impl CommandHandler for RetryJobCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::invalid(args.command, "no job ids given"));
        }
        for id in parse_ids(args)? {
            cx.client.rerun_job(cx.owner(), cx.repo(), id).await?;
            log::info!("Retried job {}", id);
        }
        Ok(())
    }
}

/// `/cancel-workflow` and, with `force`, `/stop-workflow`
pub struct CancelWorkflowCommand {
    pub force: bool,
}

#[async_trait]
impl CommandHandler for CancelWorkflowCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        let ids: Vec<u64> = if args.is_empty() {
            head_runs(args, cx)
                .await?
                .into_iter()
                .filter(WorkflowRun::is_active)
                .map(|run| run.id)
                .collect()
        } else {
            parse_ids(args)?
        };

        for id in ids {
            if self.force {
                cx.client
                    .force_cancel_workflow_run(cx.owner(), cx.repo(), id)
                    .await?;
            } else {
                cx.client
                    .cancel_workflow_run(cx.owner(), cx.repo(), id)
                    .await?;
            }
            log::info!("Cancelled workflow run {} (force: {})", id, self.force);
        }
        Ok(())
    }
}

/// `/run-workflow <workflow> [ref]`
///
/// Without a ref the pull request's head branch is used, for issues the
/// repository default branch.
pub struct RunWorkflowCommand;

#[async_trait]
impl CommandHandler for RunWorkflowCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        let words = args.words();
        let (workflow, git_ref) = match words.as_slice() {
            [workflow] => (*workflow, None),
            [workflow, git_ref] => (*workflow, Some(git_ref.to_string())),
            _ => {
                return Err(CommandError::invalid(
                    args.command,
                    "expected a workflow and an optional ref",
                ))
            }
        };

        let git_ref = match git_ref {
            Some(git_ref) => git_ref,
            None if cx.event.is_pull_request => {
                cx.client
                    .fetch_pull_request(cx.owner(), cx.repo(), cx.number())
                    .await?
                    .head_branch
            }
            None => cx.event.default_branch.clone().ok_or_else(|| {
                CommandError::invalid(args.command, "no ref given and default branch unknown")
            })?,
        };

        cx.client
            .dispatch_workflow(cx.owner(), cx.repo(), workflow, &git_ref)
            .await?;
        log::info!("Dispatched workflow {} on {}", workflow, git_ref);
        Ok(())
    }
}
