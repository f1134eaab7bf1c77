use super::{require_admin, require_pull_request};
use crate::error::CommandError;
use crate::registry::{CommandArgs, CommandContext, CommandHandler};
use async_trait::async_trait;
use gh_client::LockReason;

/// `/lock [off-topic|too-heated|resolved|spam]`, admins only
pub struct LockCommand;

#[async_trait]
impl CommandHandler for LockCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        let reason = if args.is_empty() {
            None
        } else {
            let reason = LockReason::parse(args.rest).ok_or_else(|| {
                CommandError::invalid(
                    args.command,
                    "reason must be one of off-topic, too-heated, resolved, spam",
                )
            })?;
            Some(reason)
        };
        require_admin(args, cx).await?;

        cx.client
            .lock_issue(cx.owner(), cx.repo(), cx.number(), reason)
            .await?;
        log::info!("Locked #{} ({:?})", cx.number(), reason);
        Ok(())
    }
}

pub struct UnlockCommand;

#[async_trait]
impl CommandHandler for UnlockCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        require_admin(args, cx).await?;
        cx.client
            .unlock_issue(cx.owner(), cx.repo(), cx.number())
            .await?;
        log::info!("Unlocked #{}", cx.number());
        Ok(())
    }
}

pub struct RetitleCommand;

#[async_trait]
impl CommandHandler for RetitleCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::invalid(args.command, "no title given"));
        }
        cx.client
            .set_title(cx.owner(), cx.repo(), cx.number(), args.rest)
            .await?;
        log::info!("Retitled #{} to '{}'", cx.number(), args.rest);
        Ok(())
    }
}

/// `/milestone <title>` or `/milestone clear`
///
/// An unknown title is logged and otherwise ignored.
pub struct MilestoneCommand;

#[async_trait]
impl CommandHandler for MilestoneCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::invalid(
                args.command,
                "expected a milestone title or 'clear'",
            ));
        }

        if args.rest == "clear" {
            cx.client
                .set_milestone(cx.owner(), cx.repo(), cx.number(), None)
                .await?;
            log::info!("Cleared milestone of #{}", cx.number());
            return Ok(());
        }

        let milestones = cx.client.list_milestones(cx.owner(), cx.repo()).await?;
        let Some(milestone) = milestones.iter().find(|m| m.title == args.rest) else {
            log::warn!(
                "No milestone titled '{}' in {}/{}",
                args.rest,
                cx.owner(),
                cx.repo()
            );
            return Ok(());
        };

        cx.client
            .set_milestone(cx.owner(), cx.repo(), cx.number(), Some(milestone.number))
            .await?;
        log::info!("Set milestone of #{} to '{}'", cx.number(), milestone.title);
        Ok(())
    }
}

/// `/pin` and `/unpin`
pub struct PinCommand {
    pub pin: bool,
}

#[async_trait]
impl CommandHandler for PinCommand {
    async fn handle(
        &self,
        _args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if self.pin {
            cx.client
                .pin_issue(cx.owner(), cx.repo(), cx.number())
                .await?;
        } else {
            cx.client
                .unpin_issue(cx.owner(), cx.repo(), cx.number())
                .await?;
        }
        let verb = if self.pin { "Pinned" } else { "Unpinned" };
        log::info!("{} #{}", verb, cx.number());
        Ok(())
    }
}

/// `/draft` and `/ready`
pub struct DraftCommand {
    pub draft: bool,
}

#[async_trait]
impl CommandHandler for DraftCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        require_pull_request(args, cx)?;
        cx.client
            .set_draft(cx.owner(), cx.repo(), cx.number(), self.draft)
            .await?;
        log::info!(
            "Marked #{} as {}",
            cx.number(),
            if self.draft { "draft" } else { "ready for review" }
        );
        Ok(())
    }
}
