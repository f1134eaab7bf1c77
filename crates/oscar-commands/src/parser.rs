//! Comment body parsing
//!
//! A comment body is split into command lines: every trimmed, non-empty line
//! that starts with `/`. Anything else is prose and silently skipped, so
//! parsing cannot fail.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A single trimmed line starting with `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    text: String,
}

/// Split a comment body into its command lines, in order
///
/// Pure function of `body`; call it again to restart the sequence.
pub fn parse_commands(body: &str) -> impl Iterator<Item = CommandLine> + '_ {
    body.split('\n').filter_map(CommandLine::parse)
}

impl CommandLine {
    /// Parse one raw line, `None` if it is not a command
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.replace('\r', "");
        let text = line.trim();
        if !text.starts_with('/') {
            return None;
        }
        Some(Self {
            text: text.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The first whitespace-delimited token, e.g. `/label`
    pub fn verb(&self) -> &str {
        self.split().0
    }

    /// Everything after the verb, `None` when there is nothing
    pub fn rest(&self) -> Option<&str> {
        self.split().1
    }

    fn split(&self) -> (&str, Option<&str>) {
        static VERB_REGEX: OnceLock<Regex> = OnceLock::new();

        let re = VERB_REGEX.get_or_init(|| {
            // /<verb> followed by optional whitespace-separated remainder
            Regex::new(r"(?s)^(\S+)(?:\s+(.*))?$").expect("verb pattern is valid")
        });

        match re.captures(&self.text) {
            Some(captures) => {
                let verb = captures.get(1).map_or(self.text.as_str(), |m| m.as_str());
                let rest = captures
                    .get(2)
                    .map(|m| m.as_str().trim())
                    .filter(|r| !r.is_empty());
                (verb, rest)
            }
            None => (self.text.as_str(), None),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
