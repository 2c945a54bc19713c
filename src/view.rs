//src/view.rs
use crate::workout::{Workout, WorkoutKind};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Category filter cycled by repeated activation: all -> running -> cycling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Running,
    Cycling,
}

impl CategoryFilter {
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Running,
            Self::Running => Self::Cycling,
            Self::Cycling => Self::All,
        }
    }

    pub fn matches(self, kind: WorkoutKind) -> bool {
        match self {
            Self::All => true,
            Self::Running => kind == WorkoutKind::Running,
            Self::Cycling => kind == WorkoutKind::Cycling,
        }
    }
}

/// Numeric sort key. `Primary` and `Secondary` resolve per category (pace or
/// speed, cadence or elevation) and are only selectable while a single
/// category is filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Distance,
    Duration,
    Primary,
    Secondary,
}

impl SortField {
    /// Whether the field only resolves within a single category (pace/speed,
    /// cadence/elevation).
    pub const fn is_category_specific(self) -> bool {
        matches!(self, Self::Primary | Self::Secondary)
    }
}

/// Sort direction cycled by repeated activation of the same field:
/// none -> descending -> ascending -> none.
///
/// The labels are inverted relative to the produced order: `Descending`
/// sorts low-to-high and `Ascending` high-to-low. Stored selections have
/// always carried these labels, so they are kept as-is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    None,
    Descending,
    Ascending,
}

impl SortDirection {
    pub const fn next(self) -> Self {
        match self {
            Self::None => Self::Descending,
            Self::Descending => Self::Ascending,
            Self::Ascending => Self::None,
        }
    }
}

/// Current category filter + sort field + sort direction, advanced by the
/// two cycling controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    category: CategoryFilter,
    sort_field: Option<SortField>,
    direction: SortDirection,
}

impl Selection {
    pub const fn category(&self) -> CategoryFilter {
        self.category
    }

    pub const fn sort_field(&self) -> Option<SortField> {
        self.sort_field
    }

    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Advances the category filter. Entering `All` drops a
    /// category-specific sort field, since pace/speed and cadence/elevation
    /// do not resolve uniformly across a mixed list.
    pub fn cycle_category(&mut self) -> CategoryFilter {
        self.category = self.category.next();
        if self.category == CategoryFilter::All
            && self.sort_field.is_some_and(SortField::is_category_specific)
        {
            self.sort_field = None;
            self.direction = SortDirection::None;
        }
        self.category
    }

    /// Activates a sort field. Repeated activation of the same field cycles
    /// the direction; switching fields restarts the cycle. When the
    /// direction comes back around to `None` the field selection clears.
    ///
    /// Category-specific fields are inert while no category is filtered,
    /// mirroring the controls that are hidden in the "all" view. The
    /// selection is left untouched and the current direction returned.
    pub fn cycle_sort_field(&mut self, field: SortField) -> SortDirection {
        if field.is_category_specific() && self.category == CategoryFilter::All {
            return self.direction;
        }
        if self.sort_field != Some(field) {
            self.direction = SortDirection::None;
        }
        self.direction = self.direction.next();
        self.sort_field = if self.direction == SortDirection::None {
            None
        } else {
            Some(field)
        };
        self.direction
    }
}

/// Reduces `records` to those matching `category`, preserving relative
/// order. `All` is the identity on membership and order.
pub fn by_category(records: &[Workout], category: CategoryFilter) -> Vec<&Workout> {
    records
        .iter()
        .filter(|w| category.matches(w.kind()))
        .collect()
}

/// Orders `records` by the selected field and direction, falling back to
/// chronological order when no sort is active. Returns a new sequence; the
/// input is never mutated. Stable: equal keys keep their store order.
pub fn by_field<'a>(
    records: &[&'a Workout],
    field: Option<SortField>,
    direction: SortDirection,
) -> Vec<&'a Workout> {
    let mut sorted = records.to_vec();
    match (field, direction) {
        (Some(field), SortDirection::Descending) => {
            sorted.sort_by(|a, b| sort_value(a, field).total_cmp(&sort_value(b, field)));
        }
        (Some(field), SortDirection::Ascending) => {
            sorted.sort_by(|a, b| sort_value(b, field).total_cmp(&sort_value(a, field)));
        }
        _ => sorted.sort_by_key(|w| w.date),
    }
    sorted
}

fn sort_value(workout: &Workout, field: SortField) -> f64 {
    match field {
        SortField::Distance => workout.distance,
        SortField::Duration => workout.duration,
        SortField::Primary => workout.primary_metric(),
        SortField::Secondary => workout.secondary_metric(),
    }
}
