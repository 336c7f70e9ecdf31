//! Chain Doctor
//!
//! Inspects a raw backend snapshot (a JSON array of records) one parent at a
//! time: the reconstructed order, what had to be repaired, and optionally the
//! link updates that would make the stored chain consistent again.

use std::io::Read;
use std::path::Path;

use classroom_core::db::{ChainStore, DatabaseError, MemoryStore};
use classroom_core::models::ChainRecord;
use classroom_core::operations::{reconstruct_order, relink, ChainDiagnostics, ReorderPlan};
use serde::Serialize;

/// Findings for one parent's chain
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub parent_id: String,
    pub order: Vec<String>,
    pub diagnostics: ChainDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair: Option<ReorderPlan>,
}

impl ChainReport {
    pub fn is_healthy(&self) -> bool {
        !self.diagnostics.is_repaired()
    }
}

/// Load a snapshot from `path`, or from stdin when `None`
pub async fn load_snapshot(
    path: Option<&Path>,
) -> Result<MemoryStore<ChainRecord>, DatabaseError> {
    match path {
        Some(path) => MemoryStore::from_json_file(path).await,
        None => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .map_err(|e| DatabaseError::snapshot_read("<stdin>".into(), e))?;
            MemoryStore::from_json(&json)
        }
    }
}

/// Reports for every parent in `store` (or only `parent`), in first-seen order
pub async fn diagnose(
    store: &MemoryStore<ChainRecord>,
    parent: Option<&str>,
    with_repair: bool,
) -> Result<Vec<ChainReport>, DatabaseError> {
    let parents = match parent {
        Some(parent) => vec![parent.to_string()],
        None => store.parent_ids().await,
    };

    let mut reports = Vec::with_capacity(parents.len());
    for parent_id in parents {
        let order = reconstruct_order(store.fetch_by_parent(&parent_id).await?);
        let repair = with_repair.then(|| relink(&order.entities));

        reports.push(ChainReport {
            order: order.ids().iter().map(|id| id.to_string()).collect(),
            diagnostics: order.diagnostics,
            parent_id,
            repair,
        });
    }
    Ok(reports)
}

/// Human-readable rendering of one report
pub fn render(report: &ChainReport) -> String {
    let status = if report.is_healthy() { "✅" } else { "⚠️ " };
    let mut out = format!(
        "{} {} ({} entities)\n   order: {}\n",
        status,
        report.parent_id,
        report.order.len(),
        report.order.join(" → ")
    );

    let diagnostics = &report.diagnostics;
    if !diagnostics.duplicate_ids.is_empty() {
        out.push_str(&format!(
            "   duplicate ids dropped: {}\n",
            diagnostics.duplicate_ids.join(", ")
        ));
    }
    if let Some(fallback) = &diagnostics.fallback {
        out.push_str(&format!("   fallback order used: {:?}\n", fallback));
    }
    if let Some(cycle) = &diagnostics.cycle {
        out.push_str(&format!("   cycle: {} → {}\n", cycle.from, cycle.to));
    }
    if let Some(broken) = &diagnostics.broken_link {
        out.push_str(&format!("   broken link: {} → {} (missing)\n", broken.from, broken.to));
    }
    if !diagnostics.orphans.is_empty() {
        out.push_str(&format!("   orphans: {}\n", diagnostics.orphans.join(", ")));
    }
    out
}
