//! AI collaborator - generates weekly plans and replacement exercises
//!
//! The service is asked for JSON matching a declared schema. Anything that
//! does not parse into the plan model, or fails [`WeeklyPlan::validate`],
//! is rejected as malformed.

pub mod gemini;

use async_trait::async_trait;
use serde_json::{Value, json};

pub use gemini::GeminiClient;

use crate::error::AiError;
use crate::plan::{Exercise, WeeklyPlan};

/// Source of new plan content
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate_plan(&self) -> Result<WeeklyPlan, AiError>;

    /// One alternative for `current_name` working the same muscles
    async fn replace_exercise(
        &self,
        current_name: &str,
        day_focus: &str,
    ) -> Result<Exercise, AiError>;
}

pub const PLAN_PROMPT: &str = r#"
Create a complete weekly training guide (Monday to Friday) for an INTERMEDIATE trainee focused on HYPERTROPHY.

STRICT DISTRIBUTION RULES (follow exactly):

1. GOLDEN RULE (DAILY): every day, Monday to Friday, ends with 1 CALF exercise AND 1 ABS exercise.

2. Monday (Chest, Triceps, Lower back):
   * 3 chest exercises.
   * 3 triceps exercises.
   * 1 lower back exercise.
   * (+ 1 mandatory calf, + 1 mandatory abs).

3. Tuesday (Back, Biceps):
   * 3 back exercises.
   * 3 biceps exercises.
   * (+ 1 mandatory calf, + 1 mandatory abs).

4. Wednesday (LEGS):
   * Set the 'focus' field of this day to exactly "LEGS".
   * 2 quadriceps exercises.
   * 2 hamstring exercises.
   * 2 glute exercises.
   * 1 adductor exercise (inner thigh).
   * 1 abductor exercise (outer thigh).
   * (+ 1 mandatory calf, + 1 mandatory abs).

5. Thursday (Shoulders and Forearms):
   * Complete shoulder work (lateral, anterior and posterior deltoid).
   * Forearm exercises.
   * (+ 1 mandatory calf, + 1 mandatory abs).

6. Friday (UPPER BODY):
   * Set the 'focus' field of this day to exactly "UPPER BODY".
   * Whole body EXCLUDING legs (except calves).
   * At least 1 exercise for each of: chest, back, shoulders, biceps, triceps.
   * 1 trapezius exercise (mandatory).
   * (+ 1 mandatory calf, + 1 mandatory abs).

7. Formatting:
   * 'focus': list ONLY the main muscles of the day in UPPER CASE separated by " • " (except Wednesday "LEGS" and Friday "UPPER BODY").
   * 'searchTerm': a SHORT technical search term about execution, e.g. "Bench Press Technique", "Barbell Curl Form". No long sentences.
   * 'restTime': a suggested rest per exercise ("45s", "60s", "90s") based on the intensity of the movement.
"#;

pub fn replacement_prompt(current_name: &str, day_focus: &str) -> String {
    format!(
        r#"
The user wants to replace the exercise "{}" in a workout focused on "{}".

Provide ONE (1) alternative exercise that:
1. Works EXACTLY the same main muscle group and biomechanical function.
2. Suits an INTERMEDIATE trainee.
3. Has a short 'searchTerm' (e.g. "[Exercise name] Technique").
4. Has a suggested 'restTime'.

Return ONLY one JSON object.
"#,
        current_name, day_focus
    )
}

/// Response schema for a single exercise
pub fn exercise_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "sets": { "type": "STRING" },
            "reps": { "type": "STRING" },
            "restTime": { "type": "STRING", "description": "Suggested rest, e.g. 60s" },
            "searchTerm": { "type": "STRING", "description": "Short search term, e.g. 'Bench Press Technique'" }
        },
        "required": ["name", "sets", "reps", "restTime", "searchTerm"]
    })
}

/// Response schema for the whole week
pub fn plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "days": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "dayName": { "type": "STRING", "description": "Weekday, e.g. Monday" },
                        "focus": { "type": "STRING", "description": "Focus title, e.g. BACK • BICEPS, or LEGS" },
                        "description": { "type": "STRING", "description": "Short motivational line" },
                        "exercises": { "type": "ARRAY", "items": exercise_schema() }
                    },
                    "required": ["dayName", "focus", "exercises", "description"]
                }
            }
        },
        "required": ["days"]
    })
}

pub fn parse_plan(text: &str) -> Result<WeeklyPlan, AiError> {
    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    let plan: WeeklyPlan = serde_json::from_str(text)?;
    plan.validate().map_err(AiError::Malformed)?;
    Ok(plan)
}

pub fn parse_exercise(text: &str) -> Result<Exercise, AiError> {
    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    let exercise: Exercise = serde_json::from_str(text)?;
    exercise.validate().map_err(AiError::Malformed)?;
    Ok(exercise)
}
