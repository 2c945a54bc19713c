// src/lib.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

// --- Declare modules ---
mod config;
pub mod storage;
pub mod store;
pub mod view;
pub mod workout;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util,
    load as load_config_util,
    parse_color,
    save as save_config_util,
    Config,
    Error as ConfigError,
    StandardColor,
    Theme,
};
pub use storage::{get_storage_path as get_storage_path_util, StorageError};
pub use store::{Store, StoreError};
pub use view::{by_category, by_field, CategoryFilter, Selection, SortDirection, SortField};
pub use workout::{InvalidField, ValidationError, Workout, WorkoutDetails, WorkoutKind};

/// Unvalidated workout inputs as they come off a form: the selected
/// category plus the three numbers. Validation happens on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutDraft {
    Running {
        distance: f64,
        duration: f64,
        cadence: f64,
    },
    Cycling {
        distance: f64,
        duration: f64,
        elevation: f64,
    },
}

/// Everything a map frontend needs to place one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub coords: [f64; 2],
    pub label: String,
    pub kind: WorkoutKind,
}

pub struct AppService {
    pub config: Config,
    pub store: Store,
    pub storage_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Initializes the application service.
    ///
    /// An absent or unreadable workout slot starts the store empty; config
    /// problems are real errors.
    /// # Errors
    /// Returns `anyhow::Error` if config/storage path determination or
    /// config loading fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .context(format!("Failed to load config from {config_path:?}"))?;

        let storage_path =
            storage::get_storage_path().context("Failed to determine workout store path")?;
        let store = Store::from_records(storage::load(&storage_path));

        Ok(Self {
            config,
            store,
            storage_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets the map zoom level the frontend opens at.
    /// # Errors
    /// - `ConfigError::InvalidZoomLevel` if out of range.
    /// - `ConfigError` variants if saving fails.
    pub fn set_map_zoom_level(&mut self, level: u8) -> Result<(), ConfigError> {
        self.config.set_map_zoom_level(level)?;
        self.save_config()
    }

    /// Adds a workout at the clicked map position.
    /// # Errors
    /// Returns `ValidationError` (via `anyhow::Error`) listing every invalid
    /// input field, or a storage error if the save fails.
    pub fn add_workout(&mut self, coords: [f64; 2], draft: WorkoutDraft) -> Result<Workout> {
        let workout = self.ensure_unique_id(build_workout(coords, draft)?);
        self.store.add(workout.clone());
        self.persist()?;
        Ok(workout)
    }

    /// Replaces the workout with `id` by a freshly validated record built
    /// from `draft`, keeping the original id, creation date, and map
    /// position. The replacement lands at the end of insertion order.
    /// # Errors
    /// `StoreError::WorkoutNotFound`, `ValidationError`, or a storage error.
    pub fn edit_workout(&mut self, id: &str, draft: WorkoutDraft) -> Result<Workout> {
        let original = self
            .store
            .get(id)
            .ok_or_else(|| StoreError::WorkoutNotFound(id.to_string()))?;
        let (coords, date) = (original.coords, original.date);

        // Validate before touching the store; the old record survives a bad edit.
        let rebuilt = build_workout(coords, draft)?.with_identity(id, date);
        self.store.replace(id, rebuilt.clone())?;
        self.persist()?;
        Ok(rebuilt)
    }

    /// Deletes one workout. Returns the removed record so the frontend can
    /// drop its marker.
    /// # Errors
    /// `StoreError::WorkoutNotFound` or a storage error.
    pub fn delete_workout(&mut self, id: &str) -> Result<Workout> {
        let removed = self.store.remove_by_id(id)?;
        self.persist()?;
        Ok(removed)
    }

    /// Deletes every workout and removes the storage slot.
    /// # Errors
    /// Returns a storage error if removing the slot fails.
    pub fn delete_all_workouts(&mut self) -> Result<()> {
        self.store.clear();
        storage::clear(&self.storage_path)
            .with_context(|| format!("Failed to clear workout store {:?}", self.storage_path))
    }

    /// Bumps the interaction counter of one workout. Not persisted until
    /// the next data mutation, same as the original.
    /// # Errors
    /// `StoreError::WorkoutNotFound` if the id is absent.
    pub fn record_click(&mut self, id: &str) -> Result<u32, StoreError> {
        let workout = self
            .store
            .get_mut(id)
            .ok_or_else(|| StoreError::WorkoutNotFound(id.to_string()))?;
        workout.register_click();
        Ok(workout.clicks)
    }

    /// Advances the category filter and persists the selection.
    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn cycle_category(&mut self) -> Result<CategoryFilter, ConfigError> {
        let category = self.config.selection.cycle_category();
        self.save_config()?;
        Ok(category)
    }

    /// Cycles the sort direction for `field` and persists the selection.
    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn cycle_sort(&mut self, field: SortField) -> Result<SortDirection, ConfigError> {
        let direction = self.config.selection.cycle_sort_field(field);
        self.save_config()?;
        Ok(direction)
    }

    pub const fn selection(&self) -> &Selection {
        &self.config.selection
    }

    /// The filtered, sorted list the rendering layer consumes. Recomputed
    /// in full on every call; store order is untouched.
    pub fn current_view(&self) -> Vec<&Workout> {
        let selection = &self.config.selection;
        let filtered = view::by_category(self.store.all(), selection.category());
        view::by_field(&filtered, selection.sort_field(), selection.direction())
    }

    /// All workouts in insertion order (the order the slot persists).
    pub fn workouts(&self) -> &[Workout] {
        self.store.all()
    }

    /// Marker data for the map collaborator, one per workout.
    pub fn markers(&self) -> Vec<Marker> {
        self.store
            .all()
            .iter()
            .map(|w| Marker {
                id: w.id.clone(),
                coords: w.coords,
                label: w.label(),
                kind: w.kind(),
            })
            .collect()
    }

    fn persist(&self) -> Result<()> {
        storage::save(&self.storage_path, self.store.all())
            .with_context(|| format!("Failed to save workouts to {:?}", self.storage_path))
    }

    // Ids are millisecond-derived; adds within the same millisecond would
    // collide, so bump until the id is free. The bump wraps modulo 10^10 so
    // ids stay at the 10-digit width the slot already holds.
    fn ensure_unique_id(&self, mut workout: Workout) -> Workout {
        while self.store.contains_id(&workout.id) {
            let next = workout.id.parse::<u64>().map_or(0, |n| (n + 1) % 10_000_000_000);
            let id = format!("{next:010}");
            workout = workout.with_identity(&id, workout.date);
        }
        workout
    }
}

fn build_workout(coords: [f64; 2], draft: WorkoutDraft) -> Result<Workout, ValidationError> {
    match draft {
        WorkoutDraft::Running {
            distance,
            duration,
            cadence,
        } => Workout::new_running(coords, distance, duration, cadence),
        WorkoutDraft::Cycling {
            distance,
            duration,
            elevation,
        } => Workout::new_cycling(coords, distance, duration, elevation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn service_with_ids(ids: &[&str]) -> AppService {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut store = Store::default();
        for id in ids {
            let workout = Workout::new_running([1.0, 1.0], 5.0, 30.0, 150.0)
                .unwrap()
                .with_identity(id, date);
            store.add(workout);
        }
        AppService {
            config: Config::default(),
            store,
            storage_path: PathBuf::from("unused"),
            config_path: PathBuf::from("unused"),
        }
    }

    #[test]
    fn test_id_bump_wraps_at_ten_digits() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let service = service_with_ids(&["9999999999"]);

        let colliding = Workout::new_running([1.0, 1.0], 5.0, 30.0, 150.0)
            .unwrap()
            .with_identity("9999999999", date);
        let unique = service.ensure_unique_id(colliding);

        assert_eq!(unique.id, "0000000000");
        assert_eq!(unique.id.len(), 10);
    }

    #[test]
    fn test_id_bump_skips_a_run_of_taken_ids() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let service = service_with_ids(&["9999999998", "9999999999", "0000000000"]);

        let colliding = Workout::new_running([1.0, 1.0], 5.0, 30.0, 150.0)
            .unwrap()
            .with_identity("9999999998", date);
        let unique = service.ensure_unique_id(colliding);

        assert_eq!(unique.id, "0000000001");
    }
}
