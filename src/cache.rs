//! Versioned plan cache
//!
//! The plan is stored as JSON under a key that carries the schema version.
//! Whenever `Exercise` or `DayPlan` change shape the key is bumped and old
//! entries are simply left behind.

use tracing::warn;

use crate::db::Database;
use crate::plan::WeeklyPlan;

/// v12: exercises carry a stable `id`
pub const PLAN_CACHE_KEY: &str = "workout_plan_intermediate_v12_stable_ids";

pub struct PlanCache {
    key: String,
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new(PLAN_CACHE_KEY)
    }
}

impl PlanCache {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cached plan, if any. Store errors and unreadable entries count as a miss.
    pub fn load(&self, db: &Database) -> Option<WeeklyPlan> {
        let raw = match db.get(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Plan cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<WeeklyPlan>(&raw) {
            Ok(plan) => Some(plan),
            Err(e) => {
                warn!("Ignoring unreadable cached plan under {}: {}", self.key, e);
                None
            }
        }
    }

    pub fn save(&self, db: &Database, plan: &WeeklyPlan) {
        let json = match serde_json::to_string(plan) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize plan: {}", e);
                return;
            }
        };
        if let Err(e) = db.set(&self.key, &json) {
            warn!("Plan cache write failed: {}", e);
        }
    }

    pub fn clear(&self, db: &Database) {
        if let Err(e) = db.remove(&self.key) {
            warn!("Plan cache clear failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::tests::sample_plan;

    #[test]
    fn test_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let cache = PlanCache::default();
        let plan = sample_plan();

        assert!(cache.load(&db).is_none());
        cache.save(&db, &plan);
        assert_eq!(cache.load(&db), Some(plan));
    }

    #[test]
    fn test_no_cross_version_leakage() {
        let db = Database::open_in_memory().unwrap();
        PlanCache::new("workout_plan_intermediate_v11_rest_autostop").save(&db, &sample_plan());

        assert!(PlanCache::default().load(&db).is_none());
    }

    #[test]
    fn test_unreadable_entry_is_a_miss() {
        let db = Database::open_in_memory().unwrap();
        // v11-shaped data written under the current key
        db.set(PLAN_CACHE_KEY, r#"{"days":[{"dayName":"Mon","focus":"X","exercises":[]}]}"#)
            .unwrap();

        assert!(PlanCache::default().load(&db).is_none());
    }

    #[test]
    fn test_clear() {
        let db = Database::open_in_memory().unwrap();
        let cache = PlanCache::default();
        cache.save(&db, &sample_plan());
        cache.clear(&db);
        assert!(cache.load(&db).is_none());
        assert!(db.keys().unwrap().is_empty());
    }
}
