//! Integration tests for ChainService over the in-memory store
//!
//! Tests cover:
//! - Module and exercise chains under separate parents
//! - Single-flight serialization of concurrent reorders
//! - Domain event emission
//! - Repairing snapshots written by racing clients
//! - Mutations on malformed chains
//! - Post-write verification

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use classroom_core::db::{ChainStore, DatabaseError, MemoryStore};
use classroom_core::models::{ChainEntity, CourseModule, Exercise};
use classroom_core::operations::{move_to_index, reconstruct_order, LinkUpdate};
use classroom_core::services::{ChainService, ChainServiceConfig};
use classroom_core::MoveDirection;
use std::sync::{Arc, Mutex};

async fn seeded_modules(
    course_id: &str,
    titles: &[&str],
) -> Result<ChainService<MemoryStore<CourseModule>>> {
    let service = ChainService::new(Arc::new(MemoryStore::new()));
    for title in titles {
        let module = CourseModule::new_with_id(title.to_lowercase(), course_id, *title);
        service.append(course_id, module).await?;
    }
    Ok(service)
}

fn titles(modules: &[CourseModule]) -> Vec<&str> {
    modules.iter().map(|m| m.title.as_str()).collect()
}

// =========================================================================
// Basic Flow Tests
// =========================================================================

#[tokio::test]
async fn test_chains_are_scoped_per_parent() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let service = ChainService::new(store.clone());

    for (module, id) in [("m1", "e1"), ("m2", "e2"), ("m1", "e3"), ("m2", "e4")] {
        service
            .append(module, Exercise::new_with_id(id, module, id.to_uppercase()))
            .await?;
    }

    let m1: Vec<String> = service
        .ordered_children("m1")
        .await?
        .iter()
        .map(|e| e.id().to_string())
        .collect();
    assert_eq!(m1, vec!["e1", "e3"]);

    // Moving in m2 leaves m1's links alone
    service.move_adjacent("m2", "e4", MoveDirection::Up).await?;
    let e3 = store.get("e3").await?.expect("stored");
    assert_eq!(e3.previous_id(), Some("e1"));
    assert_eq!(e3.next_id(), None);
    Ok(())
}

#[tokio::test]
async fn test_returned_order_matches_refetch() -> Result<()> {
    let service = seeded_modules("c1", &["Intro", "Ownership", "Traits", "Async"]).await?;

    let returned = service.move_to_index("c1", "async", 1).await?;
    let refetched = service.ordered_children("c1").await?;

    assert_eq!(titles(&returned), vec!["Intro", "Async", "Ownership", "Traits"]);
    assert_eq!(titles(&returned), titles(&refetched));
    assert_eq!(returned, refetched, "optimistic patch equals stored state");
    Ok(())
}

// =========================================================================
// Concurrency Tests
// =========================================================================

#[tokio::test]
async fn test_concurrent_reorders_keep_chain_well_formed() -> Result<()> {
    let service = seeded_modules("c1", &["A", "B", "C", "D", "E", "F"]).await?;

    let mut handles = Vec::new();
    for i in 0..24 {
        let service = service.with_client(format!("client-{}", i));
        handles.push(tokio::spawn(async move {
            let ids = ["a", "b", "c", "d", "e", "f"];
            service.move_to_index("c1", ids[i % 6], (i * 7) % 6).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let order = service.inspect("c1").await?;
    assert_eq!(order.len(), 6);
    assert!(
        !order.is_repaired(),
        "serialized reorders never leave a malformed chain: {:?}",
        order.diagnostics
    );
    Ok(())
}

#[tokio::test]
async fn test_unserialized_stale_snapshots_are_absorbed() -> Result<()> {
    // Two clients plan against the same snapshot and both persist: last writer wins
    let store = Arc::new(MemoryStore::new());
    let config = ChainServiceConfig {
        serialize_mutations: false,
        ..Default::default()
    };
    let service = ChainService::with_config(store.clone(), config);
    for id in ["a", "b", "c", "d"] {
        service
            .append("c1", CourseModule::new_with_id(id, "c1", id))
            .await?;
    }

    let snapshot = service.ordered_children("c1").await?;
    let first = move_to_index(&snapshot, "a", 3)?;
    let second = move_to_index(&snapshot, "d", 0)?;
    store.apply_link_updates(&first.updates).await?;
    store.apply_link_updates(&second.updates).await?;

    // Whatever the stored links now say, every module is still listed once
    let order = reconstruct_order(store.fetch_by_parent("c1").await?);
    let mut ids: Vec<&str> = order.ids();
    ids.sort();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);

    // And a repair makes the stored chain consistent again
    service.repair("c1").await?;
    assert!(!service.inspect("c1").await?.is_repaired());
    Ok(())
}

// =========================================================================
// Event Tests
// =========================================================================

#[tokio::test]
async fn test_events_follow_mutation_order() -> Result<()> {
    let service = ChainService::new(Arc::new(MemoryStore::new())).with_client("editor");
    let mut events = service.subscribe_to_events();

    service
        .append("c1", CourseModule::new_with_id("a", "c1", "A"))
        .await?;
    service
        .append("c1", CourseModule::new_with_id("b", "c1", "B"))
        .await?;
    service.delete("c1", "a").await?;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        assert_eq!(event.parent_id(), "c1");
        assert_eq!(event.source_client_id.as_deref(), Some("editor"));
        seen.push(event.event_type());
    }
    assert_eq!(
        seen,
        vec![
            "entity:created",
            "entity:created",
            "links:updated",
            "links:updated",
            "entity:deleted",
        ]
    );
    Ok(())
}

// =========================================================================
// Malformed Chain Tests
// =========================================================================

/// Modules stored without links, so every one is a head
fn unlinked_modules(course_id: &str, ids: &[&str]) -> Vec<CourseModule> {
    let base = Utc::now();
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            CourseModule::new_with_id(*id, course_id, id.to_uppercase())
                .with_created_at(base + Duration::seconds(i as i64))
        })
        .collect()
}

fn module_ids(modules: &[CourseModule]) -> Vec<&str> {
    modules.iter().map(|m| m.id()).collect()
}

#[tokio::test]
async fn test_mutations_on_malformed_chain_match_refetch() -> Result<()> {
    let store = Arc::new(MemoryStore::with_entities(unlinked_modules(
        "c1",
        &["a", "b", "c", "d"],
    )));
    let service = ChainService::new(store);
    assert!(service.inspect("c1").await?.is_repaired());

    let returned = service.move_adjacent("c1", "d", MoveDirection::Up).await?;
    assert_eq!(module_ids(&returned), vec!["a", "b", "d", "c"]);
    assert_eq!(returned, service.ordered_children("c1").await?);
    assert!(!service.inspect("c1").await?.is_repaired());
    Ok(())
}

#[tokio::test]
async fn test_move_to_index_on_broken_chain_matches_refetch() -> Result<()> {
    let mut modules = unlinked_modules("c1", &["a", "b", "c"]);
    modules[0].next_id = Some("deleted".to_string());
    modules[1].previous_id = Some("a".to_string());
    modules[1].next_id = Some("c".to_string());
    modules[2].previous_id = Some("b".to_string());
    let service = ChainService::new(Arc::new(MemoryStore::with_entities(modules)));

    let order = service.inspect("c1").await?;
    assert_eq!(order.diagnostics.orphans, vec!["b", "c"]);

    let returned = service.move_to_index("c1", "a", 2).await?;
    assert_eq!(module_ids(&returned), vec!["b", "c", "a"]);
    assert_eq!(returned, service.ordered_children("c1").await?);
    Ok(())
}

#[tokio::test]
async fn test_insert_at_into_unlinked_chain_matches_refetch() -> Result<()> {
    let store = Arc::new(MemoryStore::with_entities(unlinked_modules(
        "c1",
        &["a", "b", "c"],
    )));
    let service = ChainService::new(store);

    let fresh = CourseModule::new_with_id("n", "c1", "New");
    let returned = service.insert_at("c1", fresh, 1).await?;
    assert_eq!(module_ids(&returned), vec!["a", "n", "b", "c"]);
    assert_eq!(returned, service.ordered_children("c1").await?);

    let returned = service.delete("c1", "b").await?;
    assert_eq!(module_ids(&returned), vec!["a", "n", "c"]);
    assert_eq!(returned, service.ordered_children("c1").await?);
    Ok(())
}

// =========================================================================
// Verification Tests
// =========================================================================

/// Backend that acknowledges link updates without storing them
struct LossyStore {
    inner: MemoryStore<Exercise>,
}

#[async_trait]
impl ChainStore for LossyStore {
    type Entity = Exercise;

    async fn fetch_by_parent(&self, parent_id: &str) -> Result<Vec<Exercise>, DatabaseError> {
        self.inner.fetch_by_parent(parent_id).await
    }

    async fn get(&self, id: &str) -> Result<Option<Exercise>, DatabaseError> {
        self.inner.get(id).await
    }

    async fn insert(&self, entity: Exercise) -> Result<(), DatabaseError> {
        self.inner.insert(entity).await
    }

    async fn apply_link_updates(&self, _updates: &[LinkUpdate]) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), DatabaseError> {
        self.inner.delete(id).await
    }
}

/// Log sink for asserting on emitted warnings
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

async fn move_through_lossy_store(verify_after_write: bool) -> Result<String> {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let seeded: Vec<Exercise> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let previous = i.checked_sub(1).map(|p| ["a", "b", "c"][p]);
            let next = ["a", "b", "c"].get(i + 1).copied();
            Exercise::new_with_id(*id, "m1", *id).with_links(previous, next)
        })
        .collect();
    let store = Arc::new(LossyStore {
        inner: MemoryStore::with_entities(seeded),
    });
    let config = ChainServiceConfig {
        verify_after_write,
        ..Default::default()
    };
    let service = ChainService::with_config(store, config);

    let returned = service.move_adjacent("m1", "c", MoveDirection::Up).await?;
    let ids: Vec<&str> = returned.iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);

    Ok(logs.contents())
}

#[tokio::test]
async fn test_verify_after_write_warns_on_lost_writes() -> Result<()> {
    let logs = move_through_lossy_store(true).await?;
    assert!(
        logs.contains("diverged after write"),
        "expected a divergence warning, got: {}",
        logs
    );
    Ok(())
}

#[tokio::test]
async fn test_lost_writes_go_unnoticed_without_verification() -> Result<()> {
    let logs = move_through_lossy_store(false).await?;
    assert!(!logs.contains("diverged after write"));
    Ok(())
}
