//! Slash-command core of the oscar bot
//!
//! Control flow for one inbound event:
//!
//! ```text
//! webhook payload ──► EventContext ──► permission check
//!                                           │
//!                     comment body ──► parse_commands ──► CommandRegistry::process
//!                                                               │ (strictly sequential,
//!                                                               │  fixed delay between)
//!                                                               ▼
//!                                                        CommandHandler ──► GitHubClient
//!                                                               │
//!                                          label reconciler ◄───┴───► merge gate
//! ```
//!
//! All state a batch needs is passed in per invocation; nothing here keeps
//! process-wide mutable state.

pub mod context;
pub mod error;
pub mod events;
pub mod handlers;
pub mod merge_gate;
pub mod parser;
pub mod reconcile;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{EventContext, EventPayload};
pub use error::{CommandError, ContextError, ReconcileError};
pub use events::{handle_event, EventOutcome};
pub use handlers::default_registry;
pub use merge_gate::{BlockReason, MergeDecision, MergeOptions};
pub use parser::{parse_commands, CommandLine};
pub use reconcile::ensure_and_apply;
pub use registry::{
    process_command, BatchReport, CommandArgs, CommandContext, CommandHandler, CommandOutcome,
    CommandRegistry, CommandStatus, DEFAULT_COMMAND_DELAY,
};
