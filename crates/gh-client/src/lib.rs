//! GitHub access for the oscar command bot
//!
//! Handlers never see octocrab. They talk to [`GitHubClient`], which has
//! one method per REST or GraphQL operation the bot performs.
//!
//! ```text
//!   command handlers ──► GitHubClient ──┬──► OctocrabClient ──► api.github.com
//!                                       └──► in-memory fake (tests)
//! ```
//!
//! ```rust,no_run
//! use gh_client::{GitHubClient, OctocrabClient};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let octocrab = octocrab::Octocrab::builder()
//!     .personal_token("token".to_string())
//!     .build()?;
//! let client = OctocrabClient::new(Arc::new(octocrab));
//!
//! client.create_comment("acme", "widgets", 42, "On it").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod octocrab_client;
pub mod types;

pub use client::GitHubClient;
pub use octocrab_client::OctocrabClient;
pub use types::{
    CheckConclusion, CheckRun, CheckRunStatus, LockReason, MergeMethod, MergeResult, Milestone,
    PullRequest, RepoLabel, WorkflowRun, WorkflowRunConclusion, WorkflowRunStatus,
};

// The binary builds its Octocrab through this re-export
pub use octocrab;
