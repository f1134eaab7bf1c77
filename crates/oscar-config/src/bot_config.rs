//! Bot configuration
//!
//! Configuration loaded from .oscar.toml: who may issue commands and which
//! labels the bot maintains.

use crate::labels::{LabelCatalog, LabelSpec};
use crate::{config_file, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Users allowed to talk to the bot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// May run every command, including privileged ones
    #[serde(default)]
    pub admins: Vec<String>,

    /// May run every non-privileged command
    #[serde(default)]
    pub collaborators: Vec<String>,
}

/// Single-admin form kept for older config files
#[derive(Debug, Deserialize)]
struct LegacyAdmin {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    admin: Option<LegacyAdmin>,
    #[serde(default)]
    access: AccessConfig,
    #[serde(default)]
    labels: Vec<LabelSpec>,
}

/// Validated configuration snapshot, immutable for one event
#[derive(Debug, Clone, Default)]
pub struct BotConfig {
    pub access: AccessConfig,
    pub labels: LabelCatalog,
}

impl BotConfig {
    pub fn new(access: AccessConfig, labels: LabelCatalog) -> Self {
        Self { access, labels }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let mut access = raw.access;
        if let Some(admin) = raw.admin {
            if !admin.name.trim().is_empty() {
                access.admins.push(admin.name.trim().to_string());
            }
        }

        let labels = raw
            .labels
            .into_iter()
            .map(|l| {
                LabelSpec::new(l.name, l.color, l.description).map(|spec| spec.with_paths(l.paths))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            access,
            labels: LabelCatalog::with_builtin(labels),
        })
    }

    /// Load config from an explicit path, or search CWD then home directory
    ///
    /// An explicit path that does not exist is an error. Without one and
    /// without a discoverable file the defaults are used, which permit nobody.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) if !p.is_file() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => match config_file::find_config_file() {
                Some(found) => found,
                None => {
                    log::warn!("No config file found, nobody is allowed to run commands");
                    return Ok(Self {
                        access: AccessConfig::default(),
                        labels: LabelCatalog::with_builtin(Vec::new()),
                    });
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded config from {} ({} admins, {} collaborators, {} labels)",
            path.display(),
            config.access.admins.len(),
            config.access.collaborators.len(),
            config.labels.len()
        );
        Ok(config)
    }

    /// Whether `user` may issue commands at all
    pub fn check_permissions(&self, user: &str) -> bool {
        self.is_admin(user) || contains_user(&self.access.collaborators, user)
    }

    /// Whether `user` may issue privileged commands
    pub fn is_admin(&self, user: &str) -> bool {
        contains_user(&self.access.admins, user)
    }
}

fn contains_user(list: &[String], user: &str) -> bool {
    let user = user.trim_start_matches('@');
    !user.is_empty()
        && list
            .iter()
            .any(|u| u.trim_start_matches('@').eq_ignore_ascii_case(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::APPROVED;

    #[test]
    fn test_legacy_admin_section() {
        let config = BotConfig::from_toml_str(
            r#"
            [admin]
            name = "John Doe"
        "#,
        )
        .unwrap();

        assert!(config.check_permissions("John Doe"));
        assert!(config.is_admin("John Doe"));
        assert!(!config.check_permissions("Jane Smith"));
    }

    #[test]
    fn test_access_lists() {
        let config = BotConfig::from_toml_str(
            r#"
            [access]
            admins = ["alice"]
            collaborators = ["@bob"]
        "#,
        )
        .unwrap();

        assert!(config.is_admin("alice"));
        assert!(config.is_admin("Alice"));
        assert!(config.check_permissions("alice"));
        assert!(config.check_permissions("bob"));
        assert!(!config.is_admin("bob"));
        assert!(!config.check_permissions("mallory"));
        assert!(!config.check_permissions(""));
    }

    #[test]
    fn test_labels_merge_with_builtin() {
        let config = BotConfig::from_toml_str(
            r##"
            [[labels]]
            name = "kind/bug"
            color = "#d73a4a"
            description = "Something is broken"

            [[labels]]
            name = "approved"
            color = "00ff00"
        "##,
        )
        .unwrap();

        let bug = config.labels.get("kind/bug").unwrap();
        assert_eq!(bug.color, "d73a4a");
        assert_eq!(config.labels.get(APPROVED).unwrap().color, "00ff00");
        assert_eq!(config.labels.get(APPROVED).unwrap().description, "");
    }

    #[test]
    fn test_label_paths_are_loaded() {
        let config = BotConfig::from_toml_str(
            r#"
            [[labels]]
            name = "area/api"
            color = "1d76db"
            paths = ["crates/api", "docs/api"]
        "#,
        )
        .unwrap();

        let api = config.labels.get("area/api").unwrap();
        assert_eq!(api.paths.len(), 2);
        assert_eq!(
            config.labels.matching_paths(&["docs/api/index.md"]),
            vec!["area/api"]
        );
        assert!(config.labels.get(APPROVED).unwrap().paths.is_empty());
    }

    #[test]
    fn test_invalid_label_color_fails_loading() {
        let err = BotConfig::from_toml_str(
            r#"
            [[labels]]
            name = "bug"
            color = "red"
        "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidColor { .. }));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = BotConfig::from_toml_str("[admin\nname = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_config_permits_nobody() {
        let config = BotConfig::from_toml_str("").unwrap();
        assert!(!config.check_permissions("anyone"));
        assert!(config.labels.contains(APPROVED));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = BotConfig::load(Some(Path::new("/definitely/not/here/.oscar.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
