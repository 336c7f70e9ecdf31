//! Snapshot-file tests for the chain doctor

use anyhow::Result;
use classroom_dev_tools::doctor;
use std::io::Write;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"[
    {"id": "m2", "parentId": "course-1", "previousId": "m1", "nextId": "m3",
     "createdAt": "2025-01-02T00:00:00Z", "title": "Ownership"},
    {"id": "m1", "parentId": "course-1", "previousId": null, "nextId": "m2",
     "createdAt": "2025-01-01T00:00:00Z", "title": "Intro"},
    {"id": "m3", "parentId": "course-1", "previousId": "m2", "nextId": "m1",
     "createdAt": "2025-01-03T00:00:00Z", "title": "Traits"},
    {"id": "e1", "parentId": "m1", "createdAt": "2025-01-01T00:00:00Z", "status": "draft"}
]"#;

fn write_snapshot(json: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(json.as_bytes())?;
    Ok(file)
}

#[tokio::test]
async fn test_snapshot_file_is_grouped_and_ordered() -> Result<()> {
    let file = write_snapshot(SNAPSHOT)?;
    let store = doctor::load_snapshot(Some(file.path())).await?;

    let reports = doctor::diagnose(&store, None, false).await?;
    assert_eq!(reports.len(), 2);

    let course = &reports[0];
    assert_eq!(course.parent_id, "course-1");
    assert_eq!(course.order, vec!["m1", "m2", "m3"]);

    // m3 -> m1 closes a cycle; the walk stops there
    assert!(!course.is_healthy());
    let cycle = course.diagnostics.cycle.as_ref().expect("cycle detected");
    assert_eq!((cycle.from.as_str(), cycle.to.as_str()), ("m3", "m1"));

    assert!(reports[1].is_healthy());
    Ok(())
}

#[tokio::test]
async fn test_repair_plan_clears_cycle() -> Result<()> {
    let file = write_snapshot(SNAPSHOT)?;
    let store = doctor::load_snapshot(Some(file.path())).await?;

    let reports = doctor::diagnose(&store, Some("course-1"), true).await?;
    let plan = reports[0].repair.as_ref().expect("repair requested");
    assert_eq!(plan.touched_entities(), vec!["m3"]);

    let json = serde_json::to_value(&plan.updates)?;
    assert_eq!(json[0]["entityId"], "m3");
    assert_eq!(json[0]["field"], "nextId");
    assert!(json[0]["value"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("absent.json");
    let result = doctor::load_snapshot(Some(missing.as_path())).await;
    assert!(result.is_err());
    Ok(())
}
