//! Label reconciliation
//!
//! Makes sure catalog labels exist on the repository with the catalog's
//! color and description, then attaches them to an issue. Names outside the
//! catalog are dropped before any API call.

use crate::error::ReconcileError;
use gh_client::GitHubClient;
use oscar_config::{LabelCatalog, LabelSpec};

/// Ensure the requested catalog labels exist and apply them to `number`
///
/// Returns the names that were applied, which is empty (and no call was made)
/// when none of `requested` is in the catalog. Any failure after the
/// repository labels were read aborts and is returned.
pub async fn ensure_and_apply<S: AsRef<str>>(
    client: &dyn GitHubClient,
    owner: &str,
    repo: &str,
    number: u64,
    requested: &[S],
    catalog: &LabelCatalog,
) -> Result<Vec<String>, ReconcileError> {
    let mut wanted: Vec<&LabelSpec> = Vec::new();
    for name in requested {
        let name = name.as_ref();
        match catalog.get(name) {
            Some(spec) if !wanted.iter().any(|w| w.name == spec.name) => wanted.push(spec),
            Some(_) => {}
            None => log::info!("Ignoring label '{}', it is not in the label catalog", name),
        }
    }

    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let existing = client
        .list_repo_labels(owner, repo)
        .await
        .map_err(|source| ReconcileError::List {
            owner: owner.to_string(),
            repo: repo.to_string(),
            source,
        })?;

    let (present, missing): (Vec<&LabelSpec>, Vec<&LabelSpec>) = wanted
        .iter()
        .copied()
        .partition(|spec| existing.iter().any(|l| l.name.eq_ignore_ascii_case(&spec.name)));

    for spec in present {
        log::debug!("Updating label '{}' in {}/{}", spec.name, owner, repo);
        client
            .update_label(owner, repo, &spec.name, &spec.color, &spec.description)
            .await
            .map_err(|source| ReconcileError::Update {
                name: spec.name.clone(),
                source,
            })?;
    }

    for spec in missing {
        log::debug!("Creating label '{}' in {}/{}", spec.name, owner, repo);
        client
            .create_label(owner, repo, &spec.name, &spec.color, &spec.description)
            .await
            .map_err(|source| ReconcileError::Create {
                name: spec.name.clone(),
                source,
            })?;
    }

    let names: Vec<String> = wanted.iter().map(|spec| spec.name.clone()).collect();
    client
        .add_labels(owner, repo, number, &names)
        .await
        .map_err(|source| ReconcileError::Apply { number, source })?;

    log::info!("Applied labels [{}] to #{}", names.join(", "), number);
    Ok(names)
}

/// Remove `label` from `number` if it is attached, returns whether it was
pub(crate) async fn remove_if_present(
    client: &dyn GitHubClient,
    owner: &str,
    repo: &str,
    number: u64,
    label: &str,
) -> anyhow::Result<bool> {
    let current = client.list_issue_labels(owner, repo, number).await?;
    match current.iter().find(|l| l.eq_ignore_ascii_case(label)) {
        Some(attached) => {
            client.remove_label(owner, repo, number, attached).await?;
            Ok(true)
        }
        None => {
            log::debug!("Label '{}' is not on #{}, nothing to remove", label, number);
            Ok(false)
        }
    }
}
