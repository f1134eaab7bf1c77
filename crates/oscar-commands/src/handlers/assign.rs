use super::require_pull_request;
use crate::error::CommandError;
use crate::registry::{CommandArgs, CommandContext, CommandHandler};
use async_trait::async_trait;

/// Named users, or the invoking user when none are given
fn users_or_actor(args: &CommandArgs<'_>, cx: &CommandContext<'_>) -> Vec<String> {
    let users = args.users();
    if users.is_empty() {
        vec![cx.actor().to_string()]
    } else {
        users
    }
}

pub struct AssignCommand;

#[async_trait]
impl CommandHandler for AssignCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        let users = users_or_actor(args, cx);
        cx.client
            .add_assignees(cx.owner(), cx.repo(), cx.number(), &users)
            .await?;
        log::info!("Assigned {} to #{}", users.join(", "), cx.number());
        Ok(())
    }
}

pub struct UnassignCommand;

#[async_trait]
impl CommandHandler for UnassignCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        let users = users_or_actor(args, cx);
        cx.client
            .remove_assignees(cx.owner(), cx.repo(), cx.number(), &users)
            .await?;
        log::info!("Unassigned {} from #{}", users.join(", "), cx.number());
        Ok(())
    }
}

/// `/reviewers @a @b`: request reviews on the pull request
pub struct ReviewersCommand;

#[async_trait]
impl CommandHandler for ReviewersCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        require_pull_request(args, cx)?;
        let reviewers = args.users();
        if reviewers.is_empty() {
            return Err(CommandError::invalid(args.command, "no reviewers given"));
        }

        cx.client
            .request_reviewers(cx.owner(), cx.repo(), cx.number(), &reviewers)
            .await?;
        log::info!(
            "Requested review from {} on #{}",
            reviewers.join(", "),
            cx.number()
        );
        Ok(())
    }
}
