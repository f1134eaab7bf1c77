//! Merge gate
//!
//! An ordered chain of guards in front of the merge call. The first guard
//! that fails posts one comment explaining why and ends the invocation;
//! guards are never reordered and nothing is retried.
//!
//! ```text
//! force? ─yes─► (admin?) ─► merge
//!   │no
//!   ▼
//! do-not-merge ─► approved ─► already merged ─► check runs ─► draft ─► mergeable ─► merge
//! ```

use crate::error::CommandError;
use crate::registry::CommandContext;
use gh_client::{CheckConclusion, CheckRun, MergeMethod};
use oscar_config::{APPROVED, DO_NOT_MERGE};
use std::fmt;

/// Options accepted by `/merge`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub force: bool,
    pub method: MergeMethod,
}

impl MergeOptions {
    /// Parse `[force] [merge|squash|rebase]` in any order
    pub fn parse(words: &[&str]) -> Result<Self, String> {
        let mut options = Self::default();
        for word in words {
            match word.to_ascii_lowercase().as_str() {
                "force" => options.force = true,
                "merge" => options.method = MergeMethod::Merge,
                "squash" => options.method = MergeMethod::Squash,
                "rebase" => options.method = MergeMethod::Rebase,
                other => return Err(format!("unknown merge option '{}'", other)),
            }
        }
        Ok(options)
    }
}

/// Why the gate refused to merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    DoNotMerge,
    NotApproved,
    AlreadyMerged,
    PendingChecks { check: String },
    FailedChecks { check: String },
    Draft,
    Conflicts,
    MergeabilityUnknown,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::DoNotMerge => {
                write!(f, "Not merging: the `{}` label is set.", DO_NOT_MERGE)
            }
            BlockReason::NotApproved => {
                write!(f, "Not merging: the `{}` label is missing.", APPROVED)
            }
            BlockReason::AlreadyMerged => write!(f, "This pull request is already merged."),
            BlockReason::PendingChecks { check } => {
                write!(f, "Not merging: check `{}` is still pending.", check)
            }
            BlockReason::FailedChecks { check } => {
                write!(f, "Not merging: check `{}` failed.", check)
            }
            BlockReason::Draft => write!(f, "Not merging: the pull request is a draft."),
            BlockReason::Conflicts => write!(
                f,
                "Not merging: the pull request has conflicts with its base branch."
            ),
            BlockReason::MergeabilityUnknown => write!(
                f,
                "Not merging: mergeability is still being computed, try again shortly."
            ),
        }
    }
}

/// Terminal outcome of one gate evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDecision {
    Merged { forced: bool, sha: Option<String> },
    Blocked(BlockReason),
}

/// First check run that keeps the pull request from merging
///
/// Unfinished runs block as pending, completed runs only block on `failure`.
pub fn blocking_check(runs: &[CheckRun]) -> Option<BlockReason> {
    runs.iter().find_map(|run| {
        if !run.status.is_completed() {
            Some(BlockReason::PendingChecks {
                check: run.name.clone(),
            })
        } else if run.conclusion == Some(CheckConclusion::Failure) {
            Some(BlockReason::FailedChecks {
                check: run.name.clone(),
            })
        } else {
            None
        }
    })
}

/// Evaluate the gate for the event's pull request and merge if it passes
pub async fn evaluate_and_merge(
    cx: &CommandContext<'_>,
    options: MergeOptions,
) -> Result<MergeDecision, CommandError> {
    if !cx.event.is_pull_request {
        return Err(CommandError::NotAPullRequest("/merge".to_string()));
    }

    if options.force {
        if !cx.config.is_admin(cx.actor()) {
            cx.comment(&format!("@{} only admins may force a merge.", cx.actor()))
                .await?;
            return Err(CommandError::PermissionDenied {
                user: cx.actor().to_string(),
                command: "/merge force".to_string(),
            });
        }
        cx.comment(&format!(
            "Force merging as requested by @{}, skipping all merge checks.",
            cx.actor()
        ))
        .await?;
        let sha = merge(cx, options.method).await?;
        return Ok(MergeDecision::Merged { forced: true, sha });
    }

    if let Some(reason) = evaluate(cx).await? {
        log::info!(
            "Merge of {}/{}#{} blocked: {}",
            cx.owner(),
            cx.repo(),
            cx.number(),
            reason
        );
        cx.comment(&reason.to_string()).await?;
        return Ok(MergeDecision::Blocked(reason));
    }

    let sha = merge(cx, options.method).await?;
    Ok(MergeDecision::Merged { forced: false, sha })
}

/// Run guards 2 to 7, stopping at the first blocking one
async fn evaluate(cx: &CommandContext<'_>) -> Result<Option<BlockReason>, CommandError> {
    let (owner, repo, number) = (cx.owner(), cx.repo(), cx.number());

    // GitHub label names are case-insensitive
    let labels = cx.client.list_issue_labels(owner, repo, number).await?;
    let has = |name: &str| labels.iter().any(|l| l.eq_ignore_ascii_case(name));
    if has(DO_NOT_MERGE) {
        return Ok(Some(BlockReason::DoNotMerge));
    }
    if !has(APPROVED) {
        return Ok(Some(BlockReason::NotApproved));
    }

    let pr = cx.client.fetch_pull_request(owner, repo, number).await?;
    if pr.merged {
        return Ok(Some(BlockReason::AlreadyMerged));
    }

    let runs = cx.client.fetch_check_runs(owner, repo, &pr.head_sha).await?;
    if let Some(reason) = blocking_check(&runs) {
        return Ok(Some(reason));
    }

    if pr.draft {
        return Ok(Some(BlockReason::Draft));
    }

    match pr.mergeable {
        Some(true) => Ok(None),
        Some(false) => Ok(Some(BlockReason::Conflicts)),
        None => {
            log::debug!(
                "#{} mergeability not computed yet (last update {})",
                pr.number,
                pr.updated_at
            );
            Ok(Some(BlockReason::MergeabilityUnknown))
        }
    }
}

async fn merge(
    cx: &CommandContext<'_>,
    method: MergeMethod,
) -> Result<Option<String>, CommandError> {
    let result = cx
        .client
        .merge_pull_request(cx.owner(), cx.repo(), cx.number(), method)
        .await?;

    if !result.merged {
        return Err(CommandError::MergeRejected {
            number: cx.number(),
            message: result.message,
        });
    }

    log::info!(
        "Merged {}/{}#{} ({:?})",
        cx.owner(),
        cx.repo(),
        cx.number(),
        method
    );
    Ok(result.sha)
}
