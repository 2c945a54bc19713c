//src/store.rs
use crate::workout::Workout;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Workout not found: {0}")]
    WorkoutNotFound(String),
}

/// Authoritative ordered collection of workouts. Order is insertion order;
/// sorting happens on projected views, never here.
#[derive(Debug, Default)]
pub struct Store {
    workouts: Vec<Workout>,
}

impl Store {
    pub fn from_records(workouts: Vec<Workout>) -> Self {
        Self { workouts }
    }

    pub fn add(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    /// Removes the workout with the given id.
    /// # Errors
    /// `StoreError::WorkoutNotFound` if the id is absent. Ids handed to the
    /// frontend always come from a current view, so hitting this indicates
    /// a caller bug rather than user error.
    pub fn remove_by_id(&mut self, id: &str) -> Result<Workout, StoreError> {
        let index = self
            .workouts
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| StoreError::WorkoutNotFound(id.to_string()))?;
        Ok(self.workouts.remove(index))
    }

    /// Removes the workout with `old_id` and appends `new` at the end of
    /// insertion order. Returns the removed workout.
    /// # Errors
    /// `StoreError::WorkoutNotFound` if `old_id` is absent; the store is
    /// left untouched in that case.
    pub fn replace(&mut self, old_id: &str, new: Workout) -> Result<Workout, StoreError> {
        let removed = self.remove_by_id(old_id)?;
        self.workouts.push(new);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Workout> {
        self.workouts.iter_mut().find(|w| w.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.workouts.iter().any(|w| w.id == id)
    }

    /// All workouts in insertion order. Views borrow from this slice and
    /// never mutate it.
    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}
