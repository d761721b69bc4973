use crate::diff::{diff, ChangeSet};
use meme_catalog::{AssetName, LocalCatalog, RemoteSnapshot};
use serde::Serialize;

/// The remote tag API takes a comma-joined list, so a tag holding one can never be written
const REMOTE_TAG_SEPARATOR: char = ',';

/// Shared asset left out of the plan because its local state cannot be pushed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEntry {
    pub name: AssetName,
    pub reason: String,
}

/// Diff results for every asset present in both stores, in snapshot order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    /// Every reconciled asset, in-sync entries included
    pub entries: Vec<ChangeSet>,
    pub updated: usize,
    pub skipped: usize,
    /// In the local catalog but never seen remotely; not reconciled
    pub local_only: Vec<AssetName>,
    /// Listed remotely but unknown locally; not reconciled
    pub remote_only: Vec<AssetName>,
    /// Present in both stores but not reconcilable as written locally
    pub rejected: Vec<RejectedEntry>,
}

impl ReconciliationPlan {
    /// Change-sets that need a remote write
    pub fn body(&self) -> impl Iterator<Item = &ChangeSet> {
        self.entries.iter().filter(|change| !change.in_sync())
    }

    pub fn is_converged(&self) -> bool {
        self.updated == 0
    }

    pub fn has_drift(&self) -> bool {
        !self.local_only.is_empty() || !self.remote_only.is_empty()
    }
}

/// Build a plan over the name intersection of both catalogs.
///
/// Iterates the remote snapshot so the output order follows the listing
/// order. Reads its inputs only.
pub fn plan(local: &LocalCatalog, remote: &RemoteSnapshot) -> ReconciliationPlan {
    let mut out = ReconciliationPlan::default();

    for remote_entry in remote.entries() {
        let Some(local_entry) = local.get(&remote_entry.name) else {
            out.remote_only.push(remote_entry.name.clone());
            continue;
        };

        let unpushable: Vec<&str> = local_entry
            .tags()
            .iter()
            .filter(|tag| tag.contains(REMOTE_TAG_SEPARATOR))
            .collect();
        if !unpushable.is_empty() {
            let reason = format!(
                "tags containing '{REMOTE_TAG_SEPARATOR}' cannot be stored remotely: {}",
                unpushable.join(" | ")
            );
            log::warn!("Skipping {}: {reason}", remote_entry.name);
            out.rejected.push(RejectedEntry {
                name: remote_entry.name.clone(),
                reason,
            });
            continue;
        }

        let change = diff(local_entry, remote_entry);
        if change.in_sync() {
            out.skipped += 1;
        } else {
            out.updated += 1;
        }
        out.entries.push(change);
    }

    out.local_only = local
        .names()
        .filter(|name| !remote.contains(name))
        .map(str::to_string)
        .collect();

    log::debug!(
        "Planned {} assets: {} to update, {} in sync, {} local-only, {} remote-only, {} rejected",
        out.entries.len(),
        out.updated,
        out.skipped,
        out.local_only.len(),
        out.remote_only.len(),
        out.rejected.len()
    );
    out
}
