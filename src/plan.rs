//! Weekly plan model - days, exercises and their stable ids

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable exercise identity, assigned when an exercise enters the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(Uuid);

impl ExerciseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExerciseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One exercise of a day.
///
/// The AI service never sends `id`; a fresh one is generated on parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(default)]
    pub id: ExerciseId,
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub rest_time: String, // e.g. "60s", "90s"
    #[serde(alias = "tiktokSearchTerm")]
    pub search_term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub day_name: String,
    pub focus: String,
    pub description: String,
    pub exercises: Vec<Exercise>,
}

impl DayPlan {
    /// Short tab label ("Mon", "Tue", ...)
    pub fn short_name(&self) -> String {
        self.day_name.chars().take(3).collect()
    }

    pub fn position_of(&self, id: ExerciseId) -> Option<usize> {
        self.exercises.iter().position(|e| e.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub days: Vec<DayPlan>,
}

impl WeeklyPlan {
    pub fn day(&self, index: usize) -> Option<&DayPlan> {
        self.days.get(index)
    }

    pub fn exercise(&self, day: usize, exercise: usize) -> Option<&Exercise> {
        self.days.get(day).and_then(|d| d.exercises.get(exercise))
    }

    /// Every exercise id in the plan
    pub fn exercise_ids(&self) -> impl Iterator<Item = ExerciseId> + '_ {
        self.days.iter().flat_map(|d| d.exercises.iter().map(|e| e.id))
    }

    /// Shape checks beyond what serde enforces
    pub fn validate(&self) -> Result<(), String> {
        if self.days.is_empty() {
            return Err("plan has no days".to_string());
        }
        for day in &self.days {
            if day.day_name.trim().is_empty() {
                return Err("day without a name".to_string());
            }
            for exercise in &day.exercises {
                exercise.validate()?;
            }
        }
        Ok(())
    }
}

impl Exercise {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("exercise without a name".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn exercise(name: &str) -> Exercise {
        Exercise {
            id: ExerciseId::new(),
            name: name.to_string(),
            sets: "4".to_string(),
            reps: "10-12".to_string(),
            rest_time: "60s".to_string(),
            search_term: format!("{} technique", name),
        }
    }

    pub fn day(name: &str, focus: &str, exercises: &[&str]) -> DayPlan {
        DayPlan {
            day_name: name.to_string(),
            focus: focus.to_string(),
            description: String::new(),
            exercises: exercises.iter().map(|n| exercise(n)).collect(),
        }
    }

    /// Monday [Squat, Calf Raise], Tuesday [Row, Curl, Crunch]
    pub fn sample_plan() -> WeeklyPlan {
        WeeklyPlan {
            days: vec![
                day("Monday", "QUADS • CALVES", &["Squat", "Calf Raise"]),
                day("Tuesday", "BACK • BICEPS", &["Row", "Curl", "Crunch"]),
            ],
        }
    }

    #[test]
    fn test_parse_assigns_ids() {
        let json =
            r#"{"name":"Squat","sets":"4","reps":"8","restTime":"90s","searchTerm":"squat form"}"#;
        let a: Exercise = serde_json::from_str(json).unwrap();
        let b: Exercise = serde_json::from_str(json).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.rest_time, "90s");
    }

    #[test]
    fn test_legacy_search_term_alias() {
        let json = r#"{"name":"Squat","sets":"4","reps":"8","restTime":"90s",
            "tiktokSearchTerm":"squat form"}"#;
        let ex: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(ex.search_term, "squat form");
    }

    #[test]
    fn test_missing_rest_time_rejected() {
        let json = r#"{"name":"Squat","sets":"4","reps":"8","searchTerm":"squat form"}"#;
        assert!(serde_json::from_str::<Exercise>(json).is_err());
    }

    #[test]
    fn test_id_survives_serialization() {
        let plan = sample_plan();
        let json = serde_json::to_string(&plan).unwrap();
        let back: WeeklyPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_validate() {
        assert!(sample_plan().validate().is_ok());
        assert!(WeeklyPlan { days: vec![] }.validate().is_err());

        let mut plan = sample_plan();
        plan.days[1].exercises[0].name = "  ".to_string();
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_short_name_and_lookup() {
        let plan = sample_plan();
        assert_eq!(plan.days[0].short_name(), "Mon");
        assert_eq!(plan.exercise(1, 2).map(|e| e.name.as_str()), Some("Crunch"));
        assert!(plan.exercise(2, 0).is_none());
        let id = plan.days[1].exercises[1].id;
        assert_eq!(plan.days[1].position_of(id), Some(1));
        assert_eq!(plan.exercise_ids().count(), 5);
    }
}
