use crate::error::CommandError;
use crate::reconcile::{ensure_and_apply, remove_if_present};
use crate::registry::{CommandArgs, CommandContext, CommandHandler};
use async_trait::async_trait;

/// `/label a b`: apply catalog labels, `/label` alone clears every label
pub struct LabelCommand;

#[async_trait]
impl CommandHandler for LabelCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            cx.client
                .remove_all_labels(cx.owner(), cx.repo(), cx.number())
                .await?;
            log::info!("Removed all labels from #{}", cx.number());
            return Ok(());
        }

        let applied = ensure_and_apply(
            cx.client,
            cx.owner(),
            cx.repo(),
            cx.number(),
            &args.words(),
            &cx.config.labels,
        )
        .await?;
        if applied.is_empty() {
            log::info!("None of '{}' are catalog labels", args.rest);
        }
        Ok(())
    }
}

/// `/label-remove a b`: detach the named labels that are attached
pub struct LabelRemoveCommand;

#[async_trait]
impl CommandHandler for LabelRemoveCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::invalid(args.command, "no labels given"));
        }

        let attached = cx
            .client
            .list_issue_labels(cx.owner(), cx.repo(), cx.number())
            .await?;
        for name in args.words() {
            match attached.iter().find(|l| l.eq_ignore_ascii_case(name)) {
                Some(label) => {
                    cx.client
                        .remove_label(cx.owner(), cx.repo(), cx.number(), label)
                        .await?;
                    log::info!("Removed label '{}' from #{}", label, cx.number());
                }
                None => log::debug!("Label '{}' is not on #{}", name, cx.number()),
            }
        }
        Ok(())
    }
}

/// Applies one fixed catalog label (`/approve`, `/hold`)
pub struct ApplyLabelCommand {
    label: &'static str,
}

impl ApplyLabelCommand {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

#[async_trait]
impl CommandHandler for ApplyLabelCommand {
    async fn handle(
        &self,
        _args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        ensure_and_apply(
            cx.client,
            cx.owner(),
            cx.repo(),
            cx.number(),
            &[self.label],
            &cx.config.labels,
        )
        .await?;
        Ok(())
    }
}

/// Removes one fixed label if present (`/triage`, `/unapprove`, `/unhold`)
pub struct RemoveLabelCommand {
    label: &'static str,
}

impl RemoveLabelCommand {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

#[async_trait]
impl CommandHandler for RemoveLabelCommand {
    async fn handle(
        &self,
        _args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if remove_if_present(cx.client, cx.owner(), cx.repo(), cx.number(), self.label).await? {
            log::info!("Removed label '{}' from #{}", self.label, cx.number());
        }
        Ok(())
    }
}
