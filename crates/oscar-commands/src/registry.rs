//! Command registry and sequential dispatcher
//!
//! The registry is built once at startup and then only read. Resolution picks
//! the longest registered prefix the command text starts with; registering the
//! same prefix twice replaces the earlier handler in place.

use crate::context::EventContext;
use crate::error::CommandError;
use crate::parser::{parse_commands, CommandLine};
use async_trait::async_trait;
use gh_client::GitHubClient;
use oscar_config::BotConfig;
use std::sync::Arc;
use std::time::Duration;

/// Pause between two commands of one batch, keeps clear of secondary rate limits
pub const DEFAULT_COMMAND_DELAY: Duration = Duration::from_secs(1);

/// Everything a handler may touch while running one command
pub struct CommandContext<'a> {
    pub client: &'a dyn GitHubClient,
    pub event: &'a EventContext,
    pub config: &'a BotConfig,
}

impl CommandContext<'_> {
    pub fn owner(&self) -> &str {
        &self.event.owner
    }

    pub fn repo(&self) -> &str {
        &self.event.repo
    }

    pub fn number(&self) -> u64 {
        self.event.number
    }

    pub fn actor(&self) -> &str {
        &self.event.actor
    }

    /// Post a comment on the entity the event targets
    pub async fn comment(&self, body: &str) -> Result<(), CommandError> {
        self.client
            .create_comment(self.owner(), self.repo(), self.number(), body)
            .await?;
        Ok(())
    }
}

/// Arguments of a command whose verb matched the handler's prefix exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandArgs<'a> {
    /// The full command line
    pub command: &'a str,
    /// The prefix the command was dispatched on
    pub verb: &'a str,
    /// Trimmed text after the verb, empty when absent
    pub rest: &'a str,
}

impl<'a> CommandArgs<'a> {
    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn words(&self) -> Vec<&'a str> {
        self.rest.split_whitespace().collect()
    }

    /// Whitespace-separated user names with a leading `@` stripped
    pub fn users(&self) -> Vec<String> {
        self.rest
            .split_whitespace()
            .map(|w| w.trim_start_matches('@'))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        args: &CommandArgs<'_>,
        cx: &CommandContext<'_>,
    ) -> Result<(), CommandError>;
}

struct HandlerEntry {
    prefix: String,
    handler: Arc<dyn CommandHandler>,
}

/// Outcome of one command line of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Handled,
    /// No registered prefix matched
    Unhandled,
    /// The handler returned an error (message kept for reporting)
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: String,
    pub status: CommandStatus,
}

/// Per-command outcomes of one batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl BatchReport {
    /// Whether the body held at least one command line
    pub fn dispatched(&self) -> bool {
        !self.outcomes.is_empty()
    }

    pub fn handled(&self) -> usize {
        self.count(|s| matches!(s, CommandStatus::Handled))
    }

    pub fn unhandled(&self) -> usize {
        self.count(|s| matches!(s, CommandStatus::Unhandled))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CommandStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&CommandStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Prefix → handler table driving a strictly sequential batch
pub struct CommandRegistry {
    entries: Vec<HandlerEntry>,
    command_delay: Duration,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            command_delay: DEFAULT_COMMAND_DELAY,
        }
    }

    /// Override the pause between commands
    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }

    pub fn command_delay(&self) -> Duration {
        self.command_delay
    }

    /// Register `handler` for `prefix`; a duplicate prefix replaces the old handler
    pub fn register<H>(&mut self, prefix: impl Into<String>, handler: H) -> &mut Self
    where
        H: CommandHandler + 'static,
    {
        self.register_shared(prefix, Arc::new(handler))
    }

    /// Register one handler instance under an additional prefix
    pub fn register_shared(
        &mut self,
        prefix: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> &mut Self {
        let prefix = prefix.into();
        match self.entries.iter_mut().find(|e| e.prefix == prefix) {
            Some(entry) => {
                log::debug!("Replacing handler for {}", prefix);
                entry.handler = handler;
            }
            None => self.entries.push(HandlerEntry { prefix, handler }),
        }
        self
    }

    /// Registered prefixes in registration order
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.prefix.as_str())
    }

    /// Pairs `(shorter, longer)` where `longer` starts with `shorter`
    ///
    /// Such pairs are resolved by longest match; this lists them so a new
    /// registration that shadows an old verb is visible.
    pub fn overlapping_prefixes(&self) -> Vec<(&str, &str)> {
        let mut overlaps = Vec::new();
        for short in &self.entries {
            for long in &self.entries {
                if long.prefix.len() > short.prefix.len() && long.prefix.starts_with(&short.prefix)
                {
                    overlaps.push((short.prefix.as_str(), long.prefix.as_str()));
                }
            }
        }
        overlaps
    }

    fn resolve(&self, command: &str) -> Option<&HandlerEntry> {
        self.entries
            .iter()
            .filter(|e| command.starts_with(&e.prefix))
            .max_by_key(|e| e.prefix.len())
    }

    /// Run every command of `text` in order
    ///
    /// A failing or unknown command is logged and recorded; the rest of the
    /// batch still runs.
    pub async fn process(
        &self,
        text: &str,
        client: &dyn GitHubClient,
        event: &EventContext,
        config: &BotConfig,
    ) -> BatchReport {
        let cx = CommandContext {
            client,
            event,
            config,
        };
        let mut report = BatchReport::default();

        for (index, line) in parse_commands(text).enumerate() {
            if index > 0 && !self.command_delay.is_zero() {
                tokio::time::sleep(self.command_delay).await;
            }

            let status = self.dispatch(&line, &cx).await;
            report.outcomes.push(CommandOutcome {
                command: line.as_str().to_string(),
                status,
            });
        }

        log::info!(
            "{}/{}#{}: {} handled, {} unhandled, {} failed",
            event.owner,
            event.repo,
            event.number,
            report.handled(),
            report.unhandled(),
            report.failed()
        );
        report
    }

    async fn dispatch(&self, line: &CommandLine, cx: &CommandContext<'_>) -> CommandStatus {
        let Some(entry) = self.resolve(line.as_str()) else {
            log::info!("Unhandled command: {}", line);
            return CommandStatus::Unhandled;
        };

        let result = if line.verb() == entry.prefix {
            let args = CommandArgs {
                command: line.as_str(),
                verb: &entry.prefix,
                rest: line.rest().unwrap_or(""),
            };
            entry.handler.handle(&args, cx).await
        } else {
            Err(CommandError::invalid(
                line.as_str(),
                format!("unknown verb {}, did you mean {}?", line.verb(), entry.prefix),
            ))
        };

        match result {
            Ok(()) => {
                log::info!("Handled {}", line);
                CommandStatus::Handled
            }
            Err(err) => {
                log::error!("Command `{}` failed: {}", line, err);
                CommandStatus::Failed(err.to_string())
            }
        }
    }
}

/// Dispatch every command in `text`
///
/// Returns `true` iff the text held at least one command line. Failed and
/// unknown commands are logged inside the batch and do not change the result.
pub async fn process_command(
    registry: &CommandRegistry,
    text: &str,
    client: &dyn GitHubClient,
    event: &EventContext,
    config: &BotConfig,
) -> bool {
    registry.process(text, client, event, config).await.dispatched()
}
