//! Built-in command handlers
//!
//! One handler per verb. Every handler resolves its target from the event
//! context and talks to GitHub only through the client capability.

mod assign;
mod issue;
mod labels;
mod merge;
mod workflow;

pub use assign::{AssignCommand, ReviewersCommand, UnassignCommand};
pub use issue::{
    DraftCommand, LockCommand, MilestoneCommand, PinCommand, RetitleCommand, UnlockCommand,
};
pub use labels::{ApplyLabelCommand, LabelCommand, LabelRemoveCommand, RemoveLabelCommand};
pub use merge::MergeCommand;
pub use workflow::{
    CancelWorkflowCommand, RestartWorkflowCommand, RetryJobCommand, RunWorkflowCommand,
};

use crate::error::CommandError;
use crate::registry::{CommandArgs, CommandContext, CommandRegistry};
use oscar_config::{APPROVED, DO_NOT_MERGE, NEEDS_TRIAGE};
use std::sync::Arc;

/// Registry with every built-in command
pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .register("/label", LabelCommand)
        .register("/label-remove", LabelRemoveCommand)
        .register("/assign", AssignCommand)
        .register("/unassign", UnassignCommand)
        .register("/reviewers", ReviewersCommand)
        .register("/triage", RemoveLabelCommand::new(NEEDS_TRIAGE))
        .register("/approve", ApplyLabelCommand::new(APPROVED))
        .register("/unapprove", RemoveLabelCommand::new(APPROVED))
        .register("/hold", ApplyLabelCommand::new(DO_NOT_MERGE))
        .register("/unhold", RemoveLabelCommand::new(DO_NOT_MERGE))
        .register("/draft", DraftCommand { draft: true })
        .register("/ready", DraftCommand { draft: false })
        .register("/lock", LockCommand)
        .register("/unlock", UnlockCommand)
        .register("/retitle", RetitleCommand)
        .register("/milestone", MilestoneCommand)
        .register("/pin", PinCommand { pin: true })
        .register("/unpin", PinCommand { pin: false })
        .register("/merge", MergeCommand)
        .register("/retry-job", RetryJobCommand)
        .register("/cancel-workflow", CancelWorkflowCommand { force: false })
        .register("/stop-workflow", CancelWorkflowCommand { force: true })
        .register("/run-workflow", RunWorkflowCommand);

    let restart = Arc::new(RestartWorkflowCommand);
    registry
        .register_shared("/restart-workflow", restart.clone())
        // older spelling
        .register_shared("/restart-action", restart);

    registry
}

pub(crate) fn require_pull_request(
    args: &CommandArgs<'_>,
    cx: &CommandContext<'_>,
) -> Result<(), CommandError> {
    if cx.event.is_pull_request {
        Ok(())
    } else {
        Err(CommandError::NotAPullRequest(args.verb.to_string()))
    }
}

/// Fail with `PermissionDenied` (after telling the user) unless the actor is an admin
pub(crate) async fn require_admin(
    args: &CommandArgs<'_>,
    cx: &CommandContext<'_>,
) -> Result<(), CommandError> {
    if cx.config.is_admin(cx.actor()) {
        return Ok(());
    }
    cx.comment(&format!(
        "@{} `{}` is restricted to admins.",
        cx.actor(),
        args.verb
    ))
    .await?;
    Err(CommandError::PermissionDenied {
        user: cx.actor().to_string(),
        command: args.verb.to_string(),
    })
}

/// Parse every argument as a numeric id
pub(crate) fn parse_ids(args: &CommandArgs<'_>) -> Result<Vec<u64>, CommandError> {
    args.words()
        .into_iter()
        .map(|word| {
            word.trim_start_matches('#').parse::<u64>().map_err(|_| {
                CommandError::invalid(args.command, format!("'{}' is not an id", word))
            })
        })
        .collect()
}
