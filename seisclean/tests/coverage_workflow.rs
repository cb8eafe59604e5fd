//! Integration tests for the cleaning workflow on a file-backed store.
//!
//! These tests cover the path a vessel crew takes:
//! - project setup and activation per vessel
//! - recording cleanings across the active/tail boundary
//! - coverage and stats after reopening the store
//! - compressed snapshots of the store
//! - a failed project delete leaving the store as it was
//!
//! Run with: `cargo test --test coverage_workflow`

use std::path::Path;
use std::sync::Arc;

use seisclean::backup::{list_backups, read_backup, BackupConfig, BackupService};
use seisclean::model::{NewProject, Project};
use seisclean::section::SectionType;
use seisclean::service::{EventFilter, RecordCleaning};
use seisclean::{
    AccessScope, CleaningService, CoreError, GeometryOverrides, JsonStore, Role, Store,
};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn admin() -> AccessScope {
    AccessScope::unrestricted(Role::Admin)
}

fn operator(vessel: &str) -> AccessScope {
    AccessScope::for_vessel(Role::Operator, vessel)
}

fn open_service(path: &Path) -> (Arc<dyn Store>, CleaningService) {
    let store: Arc<dyn Store> = Arc::new(JsonStore::open(path).unwrap());
    (Arc::clone(&store), CleaningService::new(store))
}

fn create_active(
    service: &CleaningService,
    number: &str,
    vessel: &str,
    geometry: GeometryOverrides,
) -> Project {
    let project = service
        .create_project(
            &admin(),
            NewProject {
                project_number: number.to_string(),
                vessel_tag: vessel.to_string(),
                geometry,
                ..Default::default()
            },
        )
        .unwrap();
    service.activate_project(&admin(), project.id).unwrap()
}

fn cleaning(streamer: u32, start: u32, end: u32, at: &str) -> RecordCleaning {
    RecordCleaning {
        streamer_id: streamer,
        section_index_start: start,
        section_index_end: end,
        cleaning_method: "rope".to_string(),
        cleaned_at: Some(at.to_string()),
        ..Default::default()
    }
}

/// ALPHA runs a 107-section spread with a 5-section tail, BRAVO a rope-tailed
/// 90-section spread.
fn two_vessels(path: &Path) -> (Arc<dyn Store>, CleaningService) {
    let (store, service) = open_service(path);
    create_active(
        &service,
        "A-2024",
        "ALPHA",
        GeometryOverrides {
            use_rope_for_tail: Some(false),
            ..Default::default()
        },
    );
    create_active(
        &service,
        "B-2024",
        "BRAVO",
        GeometryOverrides {
            sections_per_cable: Some(90),
            ..Default::default()
        },
    );
    (store, service)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_active_and_tail_coverage_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    {
        let (_, service) = two_vessels(&path);
        let alpha = operator("ALPHA");
        service
            .record_cleaning(&alpha, cleaning(1, 0, 3, "2024-03-01T08:00:00Z"))
            .unwrap();
        let stored = service
            .record_cleaning(&alpha, cleaning(1, 107, 108, "2024-03-02T08:00:00Z"))
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].event.section_type, SectionType::Tail);
        assert_eq!(stored[0].event.section_index_start, 0);
        assert_eq!(stored[0].event.section_index_end, 1);
    }

    let (_, service) = open_service(&path);
    let filter = EventFilter::default().with_vessel("ALPHA");
    let (geometry, report) = service.coverage(&admin(), &filter).unwrap();
    assert_eq!(geometry.active_project_number.as_deref(), Some("A-2024"));

    let row = &report.last_cleaned[&1];
    assert_eq!(row.len(), 112);
    for (index, slot) in row.iter().enumerate() {
        let expected = matches!(index, 0..=3 | 107 | 108);
        assert_eq!(slot.is_some(), expected, "slot {}", index);
    }
    assert_eq!(row[107].as_deref(), Some("2024-03-02T08:00:00Z"));

    assert_eq!(report.stats.total_events, 2);
    assert_eq!(report.stats.unique_cleaned_sections, 6);
    assert_eq!(report.stats.active_cleaned_sections, 4);
    assert_eq!(report.stats.tail_cleaned_sections, 2);
    assert_eq!(report.stats.total_distance, 6.0 * 75.0);
}

#[test]
fn test_crossing_range_is_stored_as_two_events() {
    let temp = TempDir::new().unwrap();
    let (_, service) = two_vessels(&temp.path().join("store.json"));

    let stored = service
        .record_cleaning(&operator("ALPHA"), cleaning(4, 100, 110, "2024-03-01T10:00:00Z"))
        .unwrap();
    let labels: Vec<(&str, &str)> = stored
        .iter()
        .map(|e| (e.event.section_type.as_str(), e.eb_range.as_str()))
        .collect();
    assert_eq!(labels, vec![("active", "EB27 - EB26"), ("tail", "N/A")]);

    let events = service
        .list_events(&admin(), &EventFilter::for_project("A-2024"))
        .unwrap();
    assert_eq!(events.len(), 2);
}

#[test]
fn test_vessels_do_not_see_each_other() {
    let temp = TempDir::new().unwrap();
    let (_, service) = two_vessels(&temp.path().join("store.json"));

    service
        .record_cleaning(&operator("ALPHA"), cleaning(2, 10, 20, "2024-03-01T08:00:00Z"))
        .unwrap();

    let bravo = AccessScope::for_vessel(Role::Viewer, "BRAVO");
    let (geometry, report) = service.coverage(&bravo, &EventFilter::default()).unwrap();
    assert_eq!(geometry.sections_per_cable, 90);
    assert_eq!(geometry.tail_sections(), 0);
    assert_eq!(report.stats.total_events, 0);
    assert!(report.last_cleaned.values().all(|row| row.len() == 90));

    // Naming another vessel's project is refused.
    let err = service
        .list_events(&bravo, &EventFilter::for_project("A-2024"))
        .unwrap_err();
    assert!(matches!(err, CoreError::ScopeViolation(_)));

    // Re-activating ALPHA's project leaves BRAVO untouched.
    let alpha_project = service.active_project(&admin(), Some("ALPHA")).unwrap().unwrap();
    service.activate_project(&admin(), alpha_project.id).unwrap();
    let bravo_active = service.active_project(&bravo, None).unwrap().unwrap();
    assert_eq!(bravo_active.project_number, "B-2024");
}

#[test]
fn test_backup_snapshot_matches_store() {
    let temp = TempDir::new().unwrap();
    let (store, service) = two_vessels(&temp.path().join("store.json"));
    service
        .record_cleaning(&operator("BRAVO"), cleaning(1, 0, 89, "2024-03-01T08:00:00Z"))
        .unwrap();

    let backups = temp.path().join("backups");
    let backup = BackupService::new(store, BackupConfig::new(&backups));
    let written = backup.run_once().unwrap();

    assert_eq!(list_backups(&backups).unwrap(), vec![written.clone()]);
    let snapshot = read_backup(&written).unwrap();
    assert_eq!(snapshot.projects.len(), 2);
    assert_eq!(snapshot.pointers.len(), 2);
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].vessel_tag.as_deref(), Some("BRAVO"));
}

#[test]
fn test_failed_cascade_delete_keeps_project_intact() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    let (_, service) = two_vessels(&path);
    service
        .record_cleaning(&operator("ALPHA"), cleaning(1, 0, 3, "2024-03-01T08:00:00Z"))
        .unwrap();
    let project = service.active_project(&admin(), Some("ALPHA")).unwrap().unwrap();

    let blocker = path.with_extension("json.tmp");
    std::fs::create_dir(&blocker).unwrap();
    let err = service.delete_project(&admin(), project.id, true).unwrap_err();
    assert!(matches!(err, CoreError::Store(_)));

    let (_, reopened) = open_service(&path);
    let active = reopened.active_project(&admin(), Some("ALPHA")).unwrap();
    assert_eq!(active.map(|p| p.id), Some(project.id));
    let events = reopened
        .list_events(&admin(), &EventFilter::for_project("A-2024"))
        .unwrap();
    assert_eq!(events.len(), 1);
}
