//! Chain Reconstruction
//!
//! Rebuilds the display order of a parent's children from their
//! `previous_id` / `next_id` links. The fetched collection carries no ordering
//! of its own and the backend does not guarantee link consistency, so every
//! malformation is absorbed here and reported through [`ChainDiagnostics`]
//! instead of failing.
//!
//! # Algorithm
//!
//! 1. Deduplicate by id, keeping the first occurrence
//! 2. Find the head: the single entity whose `previous_id` is absent or does
//!    not resolve inside the collection
//! 3. Zero or several heads: fall back to `created_at` ascending, then id
//! 4. Otherwise walk `next_id` from the head, stopping at the tail, a cycle or
//!    a dangling link
//! 5. Append entities the walk never reached (orphans) in input order

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::ChainEntity;

/// Why the fallback order was used instead of walking the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FallbackReason {
    /// Every entity has a resolvable `previous_id`
    NoHead,
    /// More than one entity qualifies as head
    MultipleHeads { count: usize },
}

/// A `next_id` link that ended the forward walk early
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRef {
    pub from: String,
    pub to: String,
}

/// Data-integrity problems absorbed while reconstructing a chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDiagnostics {
    /// Ids seen more than once; later occurrences were dropped
    pub duplicate_ids: Vec<String>,

    pub fallback: Option<FallbackReason>,

    /// `next_id` pointing back at an already visited entity
    pub cycle: Option<LinkRef>,

    /// `next_id` pointing at an id missing from the collection
    pub broken_link: Option<LinkRef>,

    /// Entities not reachable from the head, appended after the chain
    pub orphans: Vec<String>,
}

impl ChainDiagnostics {
    /// True if the stored links did not describe a clean chain
    pub fn is_repaired(&self) -> bool {
        !self.duplicate_ids.is_empty()
            || self.fallback.is_some()
            || self.cycle.is_some()
            || self.broken_link.is_some()
            || !self.orphans.is_empty()
    }
}

/// Result of [`reconstruct_order`]
#[derive(Debug, Clone)]
pub struct ChainOrder<E> {
    /// Deduplicated entities, head first
    pub entities: Vec<E>,
    pub diagnostics: ChainDiagnostics,
}

impl<E: ChainEntity> ChainOrder<E> {
    pub fn ids(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.id()).collect()
    }

    pub fn is_repaired(&self) -> bool {
        self.diagnostics.is_repaired()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn position(&self, entity_id: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == entity_id)
    }

    pub fn into_entities(self) -> Vec<E> {
        self.entities
    }
}

/// Reconstruct the total order of one parent's children.
///
/// The caller filters by parent beforehand. Never fails: malformed input
/// yields a fallback order and populated diagnostics. Runs in O(n) on the
/// traversal path; the fallback path sorts.
///
/// # Examples
///
/// ```rust
/// use classroom_core::models::CourseModule;
/// use classroom_core::operations::reconstruct_order;
///
/// let modules = vec![
///     CourseModule::new_with_id("2", "c", "Second").with_links(Some("1"), None),
///     CourseModule::new_with_id("1", "c", "First").with_links(None, Some("2")),
/// ];
/// let order = reconstruct_order(modules);
/// assert_eq!(order.ids(), vec!["1", "2"]);
/// assert!(!order.is_repaired());
/// ```
pub fn reconstruct_order<E: ChainEntity>(entities: Vec<E>) -> ChainOrder<E> {
    let mut diagnostics = ChainDiagnostics::default();
    if entities.is_empty() {
        return ChainOrder {
            entities,
            diagnostics,
        };
    }

    let mut seen: HashSet<String> = HashSet::with_capacity(entities.len());
    let mut unique: Vec<E> = Vec::with_capacity(entities.len());
    for entity in entities {
        if seen.insert(entity.id().to_string()) {
            unique.push(entity);
        } else {
            diagnostics.duplicate_ids.push(entity.id().to_string());
        }
    }

    let order = compute_order(&unique, &mut diagnostics);

    if diagnostics.is_repaired() {
        tracing::warn!(
            "Repaired malformed chain of {} entities: {:?}",
            unique.len(),
            diagnostics
        );
    }

    let mut slots: Vec<Option<E>> = unique.into_iter().map(Some).collect();
    let entities = order.iter().filter_map(|&i| slots[i].take()).collect();

    ChainOrder {
        entities,
        diagnostics,
    }
}

/// Convenience wrapper returning only the reconstructed id sequence
pub fn reconstruct_ids<E: ChainEntity>(entities: &[E]) -> Vec<String> {
    reconstruct_order(entities.iter().collect())
        .ids()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Permutation of indices into `unique` describing the reconstructed order
fn compute_order<E: ChainEntity>(unique: &[E], diagnostics: &mut ChainDiagnostics) -> Vec<usize> {
    let index: HashMap<&str, usize> = unique
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id(), i))
        .collect();

    let heads: Vec<usize> = unique
        .iter()
        .enumerate()
        .filter(|(_, e)| match e.previous_id() {
            None => true,
            Some(previous) => !index.contains_key(previous),
        })
        .map(|(i, _)| i)
        .collect();

    if heads.len() != 1 {
        diagnostics.fallback = Some(if heads.is_empty() {
            FallbackReason::NoHead
        } else {
            FallbackReason::MultipleHeads { count: heads.len() }
        });
        return fallback_order(unique);
    }

    let mut visited = vec![false; unique.len()];
    let mut order = Vec::with_capacity(unique.len());
    let mut current = heads[0];

    loop {
        visited[current] = true;
        order.push(current);

        let Some(next_id) = unique[current].next_id() else {
            break;
        };

        match index.get(next_id) {
            Some(&next) if visited[next] => {
                tracing::error!(
                    "Circular chain detected at '{}' -> '{}'",
                    unique[current].id(),
                    next_id
                );
                diagnostics.cycle = Some(LinkRef {
                    from: unique[current].id().to_string(),
                    to: next_id.to_string(),
                });
                break;
            }
            Some(&next) => current = next,
            None => {
                diagnostics.broken_link = Some(LinkRef {
                    from: unique[current].id().to_string(),
                    to: next_id.to_string(),
                });
                break;
            }
        }
    }

    for (i, entity) in unique.iter().enumerate() {
        if !visited[i] {
            diagnostics.orphans.push(entity.id().to_string());
            order.push(i);
        }
    }

    order
}

/// `created_at` ascending, ties broken by id
fn fallback_order<E: ChainEntity>(unique: &[E]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..unique.len()).collect();
    order.sort_by(|&a, &b| {
        unique[a]
            .created_at()
            .cmp(&unique[b].created_at())
            .then_with(|| unique[a].id().cmp(unique[b].id()))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChainRecord;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn record(id: &str, previous: Option<&str>, next: Option<&str>, created: i64) -> ChainRecord {
        ChainRecord::new(id, "parent", t(created)).with_links(previous, next)
    }

    #[test]
    fn test_empty_input() {
        let order = reconstruct_order(Vec::<ChainRecord>::new());
        assert!(order.is_empty());
        assert!(!order.is_repaired());
    }

    #[test]
    fn test_well_formed_chain_from_shuffled_input() {
        let records = vec![
            record("c", Some("b"), None, 0),
            record("a", None, Some("b"), 2),
            record("b", Some("a"), Some("c"), 1),
        ];
        let order = reconstruct_order(records);
        assert_eq!(order.ids(), vec!["a", "b", "c"]);
        assert_eq!(order.diagnostics, ChainDiagnostics::default());
    }

    #[test]
    fn test_single_entity() {
        let order = reconstruct_order(vec![record("only", None, None, 0)]);
        assert_eq!(order.ids(), vec!["only"]);
        assert!(!order.is_repaired());
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let first = record("a", None, Some("b"), 0);
        let mut dup = record("a", None, None, 5);
        dup.payload
            .insert("title".to_string(), serde_json::json!("duplicate"));
        let records = vec![first, record("b", Some("a"), None, 1), dup];

        let order = reconstruct_order(records);
        assert_eq!(order.ids(), vec!["a", "b"]);
        assert_eq!(order.diagnostics.duplicate_ids, vec!["a".to_string()]);
        assert!(order.entities[0].payload.is_empty());
        assert!(order.is_repaired());
    }

    #[test]
    fn test_unresolved_previous_counts_as_head() {
        // "x" was deleted without relinking "a"
        let records = vec![
            record("b", Some("a"), None, 1),
            record("a", Some("x"), Some("b"), 0),
        ];
        let order = reconstruct_order(records);
        assert_eq!(order.ids(), vec!["a", "b"]);
        assert!(order.diagnostics.fallback.is_none());
    }

    #[test]
    fn test_multiple_heads_fall_back_to_creation_order() {
        let records = vec![
            record("b", None, None, 1),
            record("a", None, Some("b"), 0),
        ];
        let order = reconstruct_order(records);
        assert_eq!(order.ids(), vec!["a", "b"]);
        assert_eq!(
            order.diagnostics.fallback,
            Some(FallbackReason::MultipleHeads { count: 2 })
        );
    }

    #[test]
    fn test_no_head_falls_back_and_breaks_ties_by_id() {
        let records = vec![
            record("z", Some("y"), Some("y"), 0),
            record("y", Some("z"), Some("z"), 0),
            record("m", Some("z"), None, -1),
        ];
        let order = reconstruct_order(records);
        assert_eq!(order.ids(), vec!["m", "y", "z"]);
        assert_eq!(order.diagnostics.fallback, Some(FallbackReason::NoHead));
    }

    #[test]
    fn test_self_loop_stops_traversal() {
        let order = reconstruct_order(vec![record("a", None, Some("a"), 0)]);
        assert_eq!(order.ids(), vec!["a"]);
        assert_eq!(
            order.diagnostics.cycle,
            Some(LinkRef {
                from: "a".to_string(),
                to: "a".to_string()
            })
        );
    }

    #[test]
    fn test_cycle_after_head_is_cut() {
        let records = vec![
            record("a", None, Some("b"), 0),
            record("b", Some("a"), Some("c"), 1),
            record("c", Some("b"), Some("b"), 2),
        ];
        let order = reconstruct_order(records);
        assert_eq!(order.ids(), vec!["a", "b", "c"]);
        assert_eq!(order.diagnostics.cycle.as_ref().unwrap().from, "c");
        assert!(order.diagnostics.orphans.is_empty());
    }

    #[test]
    fn test_broken_link_and_orphans_are_appended_in_input_order() {
        let records = vec![
            record("d", Some("c"), None, 3),
            record("a", None, Some("gone"), 0),
            record("c", Some("a"), Some("d"), 2),
        ];
        let order = reconstruct_order(records);
        assert_eq!(order.ids(), vec!["a", "d", "c"]);
        assert_eq!(
            order.diagnostics.broken_link,
            Some(LinkRef {
                from: "a".to_string(),
                to: "gone".to_string()
            })
        );
        assert_eq!(order.diagnostics.orphans, vec!["d", "c"]);
    }

    #[test]
    fn test_reconstruct_ids_borrows() {
        let records = vec![
            record("b", Some("a"), None, 1),
            record("a", None, Some("b"), 0),
        ];
        assert_eq!(reconstruct_ids(&records), vec!["a", "b"]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_diagnostics_serialize_camel_case() {
        let diagnostics = ChainDiagnostics {
            fallback: Some(FallbackReason::MultipleHeads { count: 3 }),
            ..Default::default()
        };
        let value = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(value["fallback"]["kind"], "multipleHeads");
        assert_eq!(value["fallback"]["count"], 3);
        assert!(value["duplicateIds"].as_array().unwrap().is_empty());
    }
}
