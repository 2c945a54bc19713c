//src/workout.rs
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use strum_macros::Display;
use thiserror::Error;

// Month names for the derived label. The original frontend indexed this
// table at `month + 1`, so every label names the month *after* the workout
// and December lands past the end. Stored labels depend on that, so the
// shift is kept. Likely an upstream defect.
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Input field that failed the finite-positive check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum InvalidField {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

/// One or more workout inputs failed validation. Lists every offending
/// field so a form can highlight all of them at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Incorrect inputs for: {}", field_list(.fields))]
pub struct ValidationError {
    pub fields: Vec<InvalidField>,
}

// Joins field names the way the original error banner did:
// "distance", "distance and duration!", "distance, duration and cadence!".
fn field_list(fields: &[InvalidField]) -> String {
    if let [only] = fields {
        return only.to_string();
    }
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i + 2 < fields.len() {
            let _ = write!(out, "{field}, ");
        } else if i + 2 == fields.len() {
            let _ = write!(out, "{field} and ");
        } else {
            let _ = write!(out, "{field}!");
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Capitalized name as shown in labels and list headers.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }
}

/// Category-specific payload. Derived metrics (pace, speed) are computed at
/// construction and only ever replaced wholesale together with their inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutDetails {
    Running {
        /// Steps per minute.
        cadence: f64,
        /// min/km, always `duration / distance`.
        pace: f64,
    },
    Cycling {
        /// Elevation gain in meters.
        elevation: f64,
        /// km/h, always `distance / (duration / 60)`.
        speed: f64,
    },
}

/// One logged workout entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub date: DateTime<Utc>,
    /// `[lat, lng]`
    pub coords: [f64; 2],
    /// km
    pub distance: f64,
    /// min
    pub duration: f64,
    #[serde(default)]
    pub clicks: u32,
    #[serde(flatten)]
    pub details: WorkoutDetails,
}

impl Workout {
    /// Creates a running entry, validating every input.
    /// # Errors
    /// Returns `ValidationError` naming each field that is not a finite
    /// positive number (among distance, duration, cadence).
    pub fn new_running(
        coords: [f64; 2],
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Result<Self, ValidationError> {
        let mut fields = base_field_errors(distance, duration);
        if !is_valid(cadence) {
            fields.push(InvalidField::Cadence);
        }
        if !fields.is_empty() {
            return Err(ValidationError { fields });
        }
        let date = Utc::now();
        Ok(Self {
            id: generate_id(date),
            date,
            coords,
            distance,
            duration,
            clicks: 0,
            details: WorkoutDetails::Running {
                cadence,
                pace: duration / distance,
            },
        })
    }

    /// Creates a cycling entry, validating every input.
    /// # Errors
    /// Returns `ValidationError` naming each field that is not a finite
    /// positive number (among distance, duration, elevation).
    pub fn new_cycling(
        coords: [f64; 2],
        distance: f64,
        duration: f64,
        elevation: f64,
    ) -> Result<Self, ValidationError> {
        let mut fields = base_field_errors(distance, duration);
        if !is_valid(elevation) {
            fields.push(InvalidField::Elevation);
        }
        if !fields.is_empty() {
            return Err(ValidationError { fields });
        }
        let date = Utc::now();
        Ok(Self {
            id: generate_id(date),
            date,
            coords,
            distance,
            duration,
            clicks: 0,
            details: WorkoutDetails::Cycling {
                elevation,
                speed: distance / (duration / 60.0),
            },
        })
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self.details {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Derived metric: pace for running, speed for cycling.
    pub const fn primary_metric(&self) -> f64 {
        match self.details {
            WorkoutDetails::Running { pace, .. } => pace,
            WorkoutDetails::Cycling { speed, .. } => speed,
        }
    }

    /// Category-specific input: cadence for running, elevation for cycling.
    pub const fn secondary_metric(&self) -> f64 {
        match self.details {
            WorkoutDetails::Running { cadence, .. } => cadence,
            WorkoutDetails::Cycling { elevation, .. } => elevation,
        }
    }

    pub fn pace(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running { pace, .. } => Some(pace),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Cycling { speed, .. } => Some(speed),
            WorkoutDetails::Running { .. } => None,
        }
    }

    /// Human-readable description, e.g. "Running on February 15".
    /// Month name is shifted by one (see `MONTHS`); a December date yields
    /// the literal "undefined", as the original did.
    pub fn label(&self) -> String {
        let month_index = self.date.month0() as usize + 1;
        let month = MONTHS.get(month_index).copied().unwrap_or("undefined");
        format!("{} on {} {}", self.kind().title(), month, self.date.day())
    }

    /// Copy with id and date overridden. Used on edit, where the rebuilt
    /// record must keep the original identity and creation time.
    #[must_use]
    pub fn with_identity(&self, id: &str, date: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            date,
            ..self.clone()
        }
    }

    pub fn register_click(&mut self) {
        self.clicks += 1;
    }
}

fn base_field_errors(distance: f64, duration: f64) -> Vec<InvalidField> {
    let mut fields = Vec::new();
    if !is_valid(distance) {
        fields.push(InvalidField::Distance);
    }
    if !is_valid(duration) {
        fields.push(InvalidField::Duration);
    }
    fields
}

fn is_valid(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

// Last 10 digits of the creation time in epoch milliseconds, matching the
// id format of previously stored entries.
fn generate_id(date: DateTime<Utc>) -> String {
    let millis = date.timestamp_millis().to_string();
    let start = millis.len().saturating_sub(10);
    millis[start..].to_string()
}
