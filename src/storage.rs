//src/storage.rs
use crate::workout::Workout;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const STORAGE_FILE_NAME: &str = "workouts.json";
const APP_DATA_DIR: &str = "route-log";
const DATA_ENV_VAR: &str = "ROUTE_LOG_DATA_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not determine application data directory.")]
    CannotDetermineDataDir,
    #[error("I/O error accessing workout store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize workout data (JSON): {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Determines the path to the workout store file.
/// Exposed at crate root as `get_storage_path_util`
pub fn get_storage_path() -> Result<PathBuf, StorageError> {
    let data_dir_override = std::env::var(DATA_ENV_VAR).ok();

    let data_dir_path = if let Some(path_str) = data_dir_override {
        let path = PathBuf::from(path_str);
        if !path.is_dir() {
            log::warn!(
                "Environment variable {} points to '{}', which is not a directory. Trying to create it.",
                DATA_ENV_VAR,
                path.display()
            );
            fs::create_dir_all(&path)?;
        }
        path
    } else {
        let base_data_dir = dirs::data_dir().ok_or(StorageError::CannotDetermineDataDir)?;
        base_data_dir.join(APP_DATA_DIR)
    };

    if !data_dir_path.exists() {
        fs::create_dir_all(&data_dir_path)?;
    }

    Ok(data_dir_path.join(STORAGE_FILE_NAME))
}

/// Loads the stored workout list. An absent or unreadable slot yields an
/// empty list rather than an error; the store simply starts fresh.
pub fn load(path: &Path) -> Vec<Workout> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&contents) {
        Ok(workouts) => workouts,
        Err(e) => {
            log::warn!(
                "Ignoring unreadable workout store at {}: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Writes the full workout list (insertion order) to the slot.
/// # Errors
/// Returns `StorageError` if serialization or the file write fails.
pub fn save(path: &Path, workouts: &[Workout]) -> Result<(), StorageError> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let contents = serde_json::to_string(workouts)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Removes the slot entirely. A missing file is not an error.
/// # Errors
/// Returns `StorageError::Io` for any other I/O failure.
pub fn clear(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Io(e)),
    }
}
