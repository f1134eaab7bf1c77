use crate::error::CommandError;
use crate::merge_gate::{evaluate_and_merge, MergeDecision, MergeOptions};
use crate::registry::{CommandArgs, CommandContext, CommandHandler};
use async_trait::async_trait;

/// `/merge [force] [merge|squash|rebase]`
///
/// A blocked merge is a normal outcome; the gate already explained it.
pub struct MergeCommand;

#[async_trait]
impl CommandHandler for MergeCommand {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        let options = MergeOptions::parse(&args.words())
            .map_err(|reason| CommandError::invalid(args.command, reason))?;

        match evaluate_and_merge(cx, options).await? {
            MergeDecision::Merged { forced, sha } => log::info!(
                "#{} merged{} at {}",
                cx.number(),
                if forced { " (forced)" } else { "" },
                sha.as_deref().unwrap_or("unknown sha")
            ),
            MergeDecision::Blocked(reason) => {
                log::debug!("#{} not merged: {:?}", cx.number(), reason)
            }
        }
        Ok(())
    }
}
