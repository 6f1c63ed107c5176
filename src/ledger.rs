//! Completion ledger - persisted done/not-done flag per exercise

use tracing::warn;

use crate::db::Database;
use crate::plan::{DayPlan, ExerciseId};

const KEY_PREFIX: &str = "completed_";

/// Notifications raised by completion changes, consumed by the stopwatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutEvent {
    /// Any completion toggle, on or off
    ExerciseInteraction,
    /// The active day just reached all exercises done
    DayComplete { day: usize },
}

pub struct CompletionLedger<'a> {
    db: &'a Database,
}

impl<'a> CompletionLedger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn key(id: ExerciseId) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }

    pub fn is_completed(&self, id: ExerciseId) -> bool {
        match self.db.get(&Self::key(id)) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!("Completion read failed for {}: {}", id, e);
                false
            }
        }
    }

    pub fn set_completed(&self, id: ExerciseId, value: bool) {
        if let Err(e) = self.db.set(&Self::key(id), if value { "true" } else { "false" }) {
            warn!("Completion write failed for {}: {}", id, e);
        }
    }

    /// Drop the record of an exercise that left the plan
    pub fn forget(&self, id: ExerciseId) {
        if let Err(e) = self.db.remove(&Self::key(id)) {
            warn!("Completion delete failed for {}: {}", id, e);
        }
    }

    /// Drop every completion record
    pub fn purge(&self) -> usize {
        self.db.remove_prefix(KEY_PREFIX).unwrap_or_else(|e| {
            warn!("Completion purge failed: {}", e);
            0
        })
    }

    pub fn completed_count(&self, day: &DayPlan) -> usize {
        day.exercises.iter().filter(|e| self.is_completed(e.id)).count()
    }

    /// Empty days are never complete
    pub fn is_day_complete(&self, day: &DayPlan) -> bool {
        !day.exercises.is_empty() && self.completed_count(day) == day.exercises.len()
    }

    /// Set one exercise of `day` and work out which events that raises.
    ///
    /// `DayComplete` fires only on the transition into "all done", and only
    /// when `day_index` is the day on screen.
    pub fn update(
        &self,
        day: &DayPlan,
        day_index: usize,
        id: ExerciseId,
        value: bool,
        active_day: usize,
    ) -> Vec<WorkoutEvent> {
        let was_complete = self.is_day_complete(day);
        self.set_completed(id, value);
        let now_complete = self.is_day_complete(day);

        let mut events = vec![WorkoutEvent::ExerciseInteraction];
        if now_complete && !was_complete && day_index == active_day {
            events.push(WorkoutEvent::DayComplete { day: day_index });
        }
        events
    }
}
