//! # Meme Reconcile
//!
//! Brings the remote store in line with the local catalog, safely:
//!
//! ```text
//! LocalCatalog ─┐
//!               ├─> plan() ──> ReconciliationPlan ──> execute(confirm?)
//! Snapshot ─────┘    │                                   ├─ false: PlanPreview
//!                    └─ diff() per shared name           └─ true:  ExecutionReport
//! ```
//!
//! The local catalog is always the source of truth. Nothing is written
//! remotely unless `execute` is called with `confirm = true`.

mod diff;
mod gate;
mod plan;

pub use diff::{diff, ChangeSet};
pub use gate::{
    execute, preview, ApplyFailure, ChangeApplier, Execution, ExecutionReport, PlanPreview,
    PreviewItem, RemoteApplier,
};
pub use plan::{plan, ReconciliationPlan, RejectedEntry};
