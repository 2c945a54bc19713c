use anyhow::Result;
use chrono::{TimeZone, Utc};
use route_log_lib::{
    by_category, by_field, storage, AppService, CategoryFilter, Config, InvalidField,
    SortDirection, SortField, Store, ValidationError, Workout, WorkoutDraft, WorkoutKind,
};
use tempfile::TempDir;

// Helper function to create a test service backed by a temp directory.
// The TempDir must stay alive for the duration of the test.
fn create_test_service() -> Result<(AppService, TempDir)> {
    let dir = tempfile::tempdir()?;
    let service = AppService {
        config: Config::default(),
        store: Store::default(),
        storage_path: dir.path().join("workouts.json"),
        config_path: dir.path().join("config.toml"),
    };
    Ok((service, dir))
}

fn running_draft(distance: f64, duration: f64, cadence: f64) -> WorkoutDraft {
    WorkoutDraft::Running {
        distance,
        duration,
        cadence,
    }
}

fn cycling_draft(distance: f64, duration: f64, elevation: f64) -> WorkoutDraft {
    WorkoutDraft::Cycling {
        distance,
        duration,
        elevation,
    }
}

#[test]
fn test_add_running_computes_pace_exactly() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let workout = service.add_workout([10.0, 20.0], running_draft(5.0, 30.0, 150.0))?;

    assert_eq!(workout.kind(), WorkoutKind::Running);
    assert_eq!(workout.pace(), Some(6.0)); // duration / distance, no rounding
    assert_eq!(workout.speed(), None);
    assert_eq!(workout.distance, 5.0);
    assert_eq!(workout.duration, 30.0);
    assert_eq!(workout.coords, [10.0, 20.0]);
    assert!(workout.label().starts_with("Running"));

    Ok(())
}

#[test]
fn test_add_cycling_computes_speed_exactly() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let workout = service.add_workout([10.0, 20.0], cycling_draft(20.0, 60.0, 200.0))?;

    assert_eq!(workout.kind(), WorkoutKind::Cycling);
    assert_eq!(workout.speed(), Some(20.0)); // distance / (duration / 60)
    assert_eq!(workout.pace(), None);
    assert_eq!(workout.secondary_metric(), 200.0);

    Ok(())
}

#[test]
fn test_validation_lists_single_offending_field() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let err = service
        .add_workout([10.0, 20.0], running_draft(-1.0, 30.0, 150.0))
        .unwrap_err();
    let validation = err
        .downcast_ref::<ValidationError>()
        .expect("expected a ValidationError");

    assert_eq!(validation.fields, vec![InvalidField::Distance]);
    assert_eq!(validation.to_string(), "Incorrect inputs for: distance");
    // Nothing reached the store or the slot
    assert!(service.workouts().is_empty());
    assert!(!service.get_storage_path().exists());

    Ok(())
}

#[test]
fn test_validation_collects_every_offending_field() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let err = service
        .add_workout([0.0, 0.0], running_draft(f64::NAN, 0.0, -5.0))
        .unwrap_err();
    let validation = err.downcast_ref::<ValidationError>().unwrap();
    assert_eq!(
        validation.fields,
        vec![
            InvalidField::Distance,
            InvalidField::Duration,
            InvalidField::Cadence
        ]
    );
    assert_eq!(
        validation.to_string(),
        "Incorrect inputs for: distance, duration and cadence!"
    );

    let err = service
        .add_workout([0.0, 0.0], cycling_draft(-1.0, -1.0, 100.0))
        .unwrap_err();
    let validation = err.downcast_ref::<ValidationError>().unwrap();
    assert_eq!(
        validation.to_string(),
        "Incorrect inputs for: distance and duration!"
    );

    Ok(())
}

#[test]
fn test_cycling_rejects_non_positive_elevation() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let err = service
        .add_workout([0.0, 0.0], cycling_draft(10.0, 40.0, 0.0))
        .unwrap_err();
    let validation = err.downcast_ref::<ValidationError>().unwrap();
    assert_eq!(validation.fields, vec![InvalidField::Elevation]);

    Ok(())
}

#[test]
fn test_filter_all_is_identity() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?;
    service.add_workout([2.0, 2.0], cycling_draft(20.0, 60.0, 200.0))?;
    service.add_workout([3.0, 3.0], running_draft(8.0, 45.0, 160.0))?;

    let store_ids: Vec<&str> = service.workouts().iter().map(|w| w.id.as_str()).collect();
    let all_ids: Vec<&str> = by_category(service.workouts(), CategoryFilter::All)
        .iter()
        .map(|w| w.id.as_str())
        .collect();
    assert_eq!(all_ids, store_ids);

    // A single category keeps only matches, preserving relative order
    let running = by_category(service.workouts(), CategoryFilter::Running);
    assert_eq!(running.len(), 2);
    assert_eq!(running[0].id, store_ids[0]);
    assert_eq!(running[1].id, store_ids[2]);

    Ok(())
}

#[test]
fn test_sorter_returns_new_sequence_without_mutating_input() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    service.add_workout([1.0, 1.0], running_draft(10.0, 50.0, 150.0))?;
    service.add_workout([2.0, 2.0], running_draft(5.0, 30.0, 150.0))?;

    let input = by_category(service.workouts(), CategoryFilter::All);
    let input_ids: Vec<String> = input.iter().map(|w| w.id.clone()).collect();

    let sorted = by_field(&input, Some(SortField::Distance), SortDirection::Descending);

    let after_ids: Vec<String> = input.iter().map(|w| w.id.clone()).collect();
    assert_eq!(input_ids, after_ids); // input order untouched
    assert_ne!(
        sorted.iter().map(|w| w.id.clone()).collect::<Vec<_>>(),
        input_ids
    );

    Ok(())
}

// The direction labels are inverted in the sorter: "descending" produces
// ascending values and vice versa.
#[test]
fn test_sort_descending_label_yields_ascending_values() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    service.add_workout([1.0, 1.0], running_draft(10.0, 50.0, 150.0))?;
    service.add_workout([2.0, 2.0], running_draft(5.0, 30.0, 150.0))?;

    let refs = by_category(service.workouts(), CategoryFilter::All);

    let sorted = by_field(&refs, Some(SortField::Distance), SortDirection::Descending);
    let distances: Vec<f64> = sorted.iter().map(|w| w.distance).collect();
    assert_eq!(distances, vec![5.0, 10.0]);

    let sorted = by_field(&refs, Some(SortField::Distance), SortDirection::Ascending);
    let distances: Vec<f64> = sorted.iter().map(|w| w.distance).collect();
    assert_eq!(distances, vec![10.0, 5.0]);

    Ok(())
}

#[test]
fn test_no_direction_falls_back_to_date_order() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let later = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let w1 = Workout::new_running([1.0, 1.0], 5.0, 30.0, 150.0)
        .unwrap()
        .with_identity("1111111111", later);
    let w2 = Workout::new_running([2.0, 2.0], 8.0, 45.0, 160.0)
        .unwrap()
        .with_identity("2222222222", earlier);

    // Inserted newest-first; the default view re-orders chronologically
    service.store.add(w1);
    service.store.add(w2);

    let view = service.current_view();
    let ids: Vec<&str> = view.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["2222222222", "1111111111"]);

    Ok(())
}

#[test]
fn test_save_load_round_trip_preserves_insertion_order() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?;
    service.add_workout([2.0, 2.0], cycling_draft(20.0, 60.0, 200.0))?;

    let loaded = storage::load(service.get_storage_path());
    assert_eq!(loaded.len(), 2);
    for (stored, reloaded) in service.workouts().iter().zip(&loaded) {
        assert_eq!(stored.id, reloaded.id);
        assert_eq!(stored.distance, reloaded.distance);
        assert_eq!(stored.duration, reloaded.duration);
        assert_eq!(stored.kind(), reloaded.kind());
    }

    Ok(())
}

#[test]
fn test_unreadable_slot_loads_empty() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("workouts.json");
    std::fs::write(&path, "{ not json")?;

    let loaded = storage::load(&path);
    assert!(loaded.is_empty());

    Ok(())
}

#[test]
fn test_cycle_category_three_times_is_identity() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    assert_eq!(service.selection().category(), CategoryFilter::All);
    assert_eq!(service.cycle_category()?, CategoryFilter::Running);
    assert_eq!(service.cycle_category()?, CategoryFilter::Cycling);
    assert_eq!(service.cycle_category()?, CategoryFilter::All);

    Ok(())
}

#[test]
fn test_returning_to_all_clears_category_specific_sort() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    service.cycle_category()?; // running
    service.cycle_sort(SortField::Primary)?;
    assert_eq!(service.selection().sort_field(), Some(SortField::Primary));

    service.cycle_category()?; // cycling
    assert_eq!(service.selection().sort_field(), Some(SortField::Primary));
    service.cycle_category()?; // all -> primary/secondary no longer resolvable
    assert_eq!(service.selection().sort_field(), None);
    assert_eq!(service.selection().direction(), SortDirection::None);

    // A plain field survives the trip back to "all"
    service.cycle_sort(SortField::Distance)?;
    service.cycle_category()?; // running
    service.cycle_category()?; // cycling
    service.cycle_category()?; // all
    assert_eq!(service.selection().sort_field(), Some(SortField::Distance));

    Ok(())
}

#[test]
fn test_category_specific_sort_is_inert_while_filter_is_all() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?; // pace 6.0
    service.add_workout([2.0, 2.0], cycling_draft(20.0, 60.0, 200.0))?; // speed 20.0

    // Pace/speed does not resolve across a mixed list; the control is inert
    assert_eq!(service.selection().category(), CategoryFilter::All);
    assert_eq!(service.cycle_sort(SortField::Primary)?, SortDirection::None);
    assert_eq!(service.selection().sort_field(), None);
    assert_eq!(service.cycle_sort(SortField::Secondary)?, SortDirection::None);
    assert_eq!(service.selection().sort_field(), None);

    // The mixed view stays in date order, not pace-vs-speed order
    let ids: Vec<&str> = service.current_view().iter().map(|w| w.id.as_str()).collect();
    let store_ids: Vec<&str> = service.workouts().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, store_ids);

    // An active plain-field sort survives the ignored activation
    service.cycle_sort(SortField::Distance)?;
    assert_eq!(
        service.cycle_sort(SortField::Primary)?,
        SortDirection::Descending
    );
    assert_eq!(service.selection().sort_field(), Some(SortField::Distance));

    // With a single category filtered the field activates normally
    service.cycle_category()?; // running
    assert_eq!(
        service.cycle_sort(SortField::Primary)?,
        SortDirection::Descending
    );
    assert_eq!(service.selection().sort_field(), Some(SortField::Primary));

    Ok(())
}

#[test]
fn test_sort_direction_cycles_and_field_switch_resets() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    assert_eq!(
        service.cycle_sort(SortField::Distance)?,
        SortDirection::Descending
    );
    assert_eq!(
        service.cycle_sort(SortField::Distance)?,
        SortDirection::Ascending
    );
    assert_eq!(service.cycle_sort(SortField::Distance)?, SortDirection::None);
    // Direction back at none drops the field selection
    assert_eq!(service.selection().sort_field(), None);

    // Switching fields restarts the cycle rather than continuing it
    service.cycle_sort(SortField::Distance)?;
    assert_eq!(
        service.cycle_sort(SortField::Duration)?,
        SortDirection::Descending
    );

    Ok(())
}

#[test]
fn test_edit_preserves_identity_and_moves_to_end() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let original = service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?;
    service.add_workout([2.0, 2.0], cycling_draft(20.0, 60.0, 200.0))?;

    let edited = service.edit_workout(&original.id, cycling_draft(12.0, 36.0, 80.0))?;

    // Identity and creation time carried over, everything else rebuilt
    assert_eq!(edited.id, original.id);
    assert_eq!(edited.date, original.date);
    assert_eq!(edited.coords, original.coords);
    assert_eq!(edited.kind(), WorkoutKind::Cycling);
    assert_eq!(edited.speed(), Some(20.0)); // 12 / (36 / 60)

    // Replacement lands at the end of insertion order
    let ids: Vec<&str> = service.workouts().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[1], original.id.as_str());
    assert_eq!(service.workouts()[1].kind(), WorkoutKind::Cycling);

    Ok(())
}

#[test]
fn test_edit_with_invalid_input_leaves_store_untouched() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let original = service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?;

    let err = service
        .edit_workout(&original.id, running_draft(-3.0, 30.0, 150.0))
        .unwrap_err();
    assert!(err.downcast_ref::<ValidationError>().is_some());

    assert_eq!(service.workouts().len(), 1);
    assert_eq!(service.workouts()[0], original);

    Ok(())
}

#[test]
fn test_delete_workout_and_delete_all() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let first = service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?;
    service.add_workout([2.0, 2.0], cycling_draft(20.0, 60.0, 200.0))?;

    let removed = service.delete_workout(&first.id)?;
    assert_eq!(removed.id, first.id);
    assert_eq!(service.workouts().len(), 1);
    // The slot reflects the deletion immediately
    assert_eq!(storage::load(service.get_storage_path()).len(), 1);

    // Deleting an id that no longer exists is a caller bug, surfaced as an error
    assert!(service.delete_workout(&first.id).is_err());

    service.delete_all_workouts()?;
    assert!(service.workouts().is_empty());
    assert!(!service.get_storage_path().exists());

    Ok(())
}

#[test]
fn test_label_month_is_shifted_by_one() -> Result<()> {
    let january = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    let december = Utc.with_ymd_and_hms(2024, 12, 15, 12, 0, 0).unwrap();

    let workout = Workout::new_running([1.0, 1.0], 5.0, 30.0, 150.0).unwrap();
    assert_eq!(
        workout.with_identity("0000000001", january).label(),
        "Running on February 15"
    );
    // December runs off the month table, as the original did
    assert_eq!(
        workout.with_identity("0000000002", december).label(),
        "Running on undefined 15"
    );

    Ok(())
}

#[test]
fn test_markers_expose_position_label_and_identity() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let workout = service.add_workout([48.85, 2.35], cycling_draft(20.0, 60.0, 200.0))?;

    let markers = service.markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].id, workout.id);
    assert_eq!(markers[0].coords, [48.85, 2.35]);
    assert_eq!(markers[0].label, workout.label());
    assert_eq!(markers[0].kind, WorkoutKind::Cycling);

    Ok(())
}

#[test]
fn test_ids_are_unique_even_within_one_millisecond() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let a = service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?;
    let b = service.add_workout([2.0, 2.0], running_draft(6.0, 35.0, 150.0))?;
    let c = service.add_workout([3.0, 3.0], running_draft(7.0, 40.0, 150.0))?;

    assert_ne!(a.id, b.id);
    assert_ne!(b.id, c.id);
    assert_ne!(a.id, c.id);

    Ok(())
}

#[test]
fn test_current_view_composes_filter_and_sort() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    service.add_workout([1.0, 1.0], running_draft(10.0, 50.0, 150.0))?;
    service.add_workout([2.0, 2.0], cycling_draft(30.0, 90.0, 500.0))?;
    service.add_workout([3.0, 3.0], running_draft(5.0, 30.0, 160.0))?;

    service.cycle_category()?; // running only
    service.cycle_sort(SortField::Distance)?; // "descending" = low-to-high

    let view = service.current_view();
    let distances: Vec<f64> = view.iter().map(|w| w.distance).collect();
    assert_eq!(distances, vec![5.0, 10.0]);
    assert!(view.iter().all(|w| w.kind() == WorkoutKind::Running));

    // Store order is unaffected by the projected view
    assert_eq!(service.workouts()[0].distance, 10.0);

    Ok(())
}

#[test]
fn test_record_click_increments_counter() -> Result<()> {
    let (mut service, _dir) = create_test_service()?;

    let workout = service.add_workout([1.0, 1.0], running_draft(5.0, 30.0, 150.0))?;
    assert_eq!(workout.clicks, 0);

    assert_eq!(service.record_click(&workout.id)?, 1);
    assert_eq!(service.record_click(&workout.id)?, 2);
    assert!(service.record_click("no-such-id").is_err());

    Ok(())
}
