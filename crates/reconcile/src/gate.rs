use crate::diff::ChangeSet;
use crate::plan::ReconciliationPlan;
use async_trait::async_trait;
use meme_catalog::{AssetName, CatalogError, RemoteOperation, RemoteStore};
use serde::Serialize;

/// Applies one change-set to the remote side
#[async_trait]
pub trait ChangeApplier: Send + Sync {
    async fn apply(&self, change: &ChangeSet) -> Result<(), CatalogError>;
}

/// Production applier: tag and language writes are independent calls.
///
/// Both are attempted even when the first fails; the asset fails if either did.
pub struct RemoteApplier<'a, S: RemoteStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RemoteStore + ?Sized> RemoteApplier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RemoteStore + ?Sized> ChangeApplier for RemoteApplier<'_, S> {
    async fn apply(&self, change: &ChangeSet) -> Result<(), CatalogError> {
        let mut errors = Vec::new();

        if let Some(tags) = &change.tags_to_set {
            if let Err(err) = self.store.set_tags(&change.name, tags).await {
                errors.push(err);
            }
        }
        if let Some(language) = &change.language_to_set {
            if let Err(err) = self.store.set_language(&change.name, language).await {
                errors.push(err);
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => {
                let reason = errors
                    .iter()
                    .map(CatalogError::reason)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(CatalogError::RemoteCall {
                    operation: RemoteOperation::UpdateMetadata,
                    name: Some(change.name.clone()),
                    reason,
                })
            }
        }
    }
}

/// Proposed state of one asset, shown in dry-run mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewItem {
    pub name: AssetName,
    pub in_sync: bool,
    pub changes: Vec<String>,
    /// Tag list the remote will hold after apply
    pub proposed_tags: Option<Vec<String>>,
    pub proposed_language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanPreview {
    pub items: Vec<PreviewItem>,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyFailure {
    pub name: AssetName,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub applied: Vec<AssetName>,
    pub failures: Vec<ApplyFailure>,
    /// In-sync assets left untouched
    pub skipped: usize,
}

impl ExecutionReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Execution {
    DryRun(PlanPreview),
    Applied(ExecutionReport),
}

/// Build the dry-run view of a plan without touching any store
pub fn preview(plan: &ReconciliationPlan) -> PlanPreview {
    let items = plan
        .entries
        .iter()
        .map(|change| PreviewItem {
            name: change.name.clone(),
            in_sync: change.in_sync(),
            changes: change.describe(),
            proposed_tags: change.tags_to_set.as_ref().map(|tags| tags.to_vec()),
            proposed_language: change.language_to_set.clone(),
        })
        .collect();
    PlanPreview {
        items,
        updated: plan.updated,
        skipped: plan.skipped,
    }
}

/// Run a plan through the confirmation gate.
///
/// Without `confirm` the applier is never called. With it, every out-of-sync
/// change-set is applied in plan order and a failing asset never stops the
/// ones after it.
pub async fn execute(
    plan: &ReconciliationPlan,
    confirm: bool,
    applier: &(impl ChangeApplier + ?Sized),
) -> Execution {
    if !confirm {
        return Execution::DryRun(preview(plan));
    }

    let mut report = ExecutionReport {
        skipped: plan.skipped,
        ..Default::default()
    };
    for change in plan.body() {
        match applier.apply(change).await {
            Ok(()) => {
                log::info!("Applied {}", change.name);
                report.applied.push(change.name.clone());
            }
            Err(err) => {
                log::warn!("Failed to apply {}: {err}", change.name);
                report.failures.push(ApplyFailure {
                    name: change.name.clone(),
                    reason: err.reason(),
                });
            }
        }
    }
    Execution::Applied(report)
}
