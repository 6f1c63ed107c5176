//! Session - the one place the plan, ledger, stopwatch and navigation change
//!
//! Every user action and every AI response goes through [`Session::dispatch`].
//! A dispatch may ask for one [`Effect`] (an AI call); [`run_effect`] performs
//! it off the session and turns the response back into an [`Action`].
//!
//! The async helpers ([`Session::load_plan`], [`Session::swap_exercise`], ...)
//! run the same transitions with the AI call inline, for the CLI and tests.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::ai::PlanGenerator;
use crate::cache::PlanCache;
use crate::db::Database;
use crate::error::{AcquisitionError, AiError, SwapError};
use crate::ledger::{CompletionLedger, WorkoutEvent};
use crate::nav::Navigation;
use crate::plan::{Exercise, ExerciseId, WeeklyPlan};
use crate::stopwatch::Stopwatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Everything the UI renders
#[derive(Debug)]
pub struct AppState {
    pub plan: Option<WeeklyPlan>,
    pub phase: LoadPhase,
    pub nav: Navigation,
    pub stopwatch: Stopwatch,
    /// Exercises waiting for a replacement
    pub swapping: HashSet<ExerciseId>,
    /// Transient message, e.g. a failed swap
    pub notice: Option<String>,
}

/// Context captured when a swap starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTicket {
    pub day: usize,
    pub exercise: usize,
    pub exercise_id: ExerciseId,
    pub exercise_name: String,
    pub focus: String,
}

#[derive(Debug)]
pub enum Action {
    Load,
    Regenerate,
    PlanArrived(Result<WeeklyPlan, AiError>),
    ToggleComplete { day: usize, exercise: usize },
    Swap { day: usize, exercise: usize },
    ReplacementArrived { ticket: SwapTicket, result: Result<Exercise, AiError> },
    NextDay,
    PrevDay,
    JumpTo(usize),
    Tick,
    ToggleStopwatch,
    ResetStopwatch,
    DismissNotice,
}

/// Side effect requested by a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    GeneratePlan,
    ReplaceExercise(SwapTicket),
}

/// Perform `effect` and report back as the action to dispatch next
pub async fn run_effect(generator: &dyn PlanGenerator, effect: Effect) -> Action {
    match effect {
        Effect::GeneratePlan => Action::PlanArrived(generator.generate_plan().await),
        Effect::ReplaceExercise(ticket) => {
            let result = generator.replace_exercise(&ticket.exercise_name, &ticket.focus).await;
            Action::ReplacementArrived { ticket, result }
        }
    }
}

pub struct Session {
    db: Database,
    cache: PlanCache,
    generator: Arc<dyn PlanGenerator>,
    state: AppState,
}

impl Session {
    pub fn new(db: Database, generator: Arc<dyn PlanGenerator>) -> Self {
        Self {
            db,
            cache: PlanCache::default(),
            generator,
            state: AppState {
                plan: None,
                phase: LoadPhase::Idle,
                nav: Navigation::today(),
                stopwatch: Stopwatch::default(),
                swapping: HashSet::new(),
                notice: None,
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn generator(&self) -> Arc<dyn PlanGenerator> {
        Arc::clone(&self.generator)
    }

    pub fn plan(&self) -> Option<&WeeklyPlan> {
        self.state.plan.as_ref()
    }

    fn ledger(&self) -> CompletionLedger<'_> {
        CompletionLedger::new(&self.db)
    }

    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Load => {
                if self.state.phase == LoadPhase::Loading {
                    return None;
                }
                self.begin_load()
            }
            Action::Regenerate => {
                if self.state.phase == LoadPhase::Loading {
                    return None;
                }
                self.begin_regenerate()
            }
            Action::PlanArrived(result) => {
                // failure is recorded in `phase`
                let _ = self.finish_load(result);
                None
            }
            Action::ToggleComplete { day, exercise } => {
                self.toggle_completed(day, exercise);
                None
            }
            Action::Swap { day, exercise } => match self.begin_swap(day, exercise) {
                Ok(ticket) => Some(Effect::ReplaceExercise(ticket)),
                Err(e) => {
                    self.state.notice = Some(e.to_string());
                    None
                }
            },
            Action::ReplacementArrived { ticket, result } => {
                let name = ticket.exercise_name.clone();
                match self.finish_swap(ticket, result) {
                    Ok(_) => {}
                    // the slot is gone, nobody is waiting for it
                    Err(SwapError::Stale) => {
                        info!("Dropped replacement for '{}', plan changed", name)
                    }
                    Err(e) => self.state.notice = Some(e.to_string()),
                }
                None
            }
            Action::NextDay => {
                let days = self.day_count();
                self.state.nav.advance(days);
                None
            }
            Action::PrevDay => {
                self.state.nav.retreat();
                None
            }
            Action::JumpTo(index) => {
                let days = self.day_count();
                self.state.nav.jump_to(index, days);
                None
            }
            Action::Tick => {
                self.state.stopwatch.tick();
                None
            }
            Action::ToggleStopwatch => {
                self.state.stopwatch.toggle();
                None
            }
            Action::ResetStopwatch => {
                self.state.stopwatch.reset();
                None
            }
            Action::DismissNotice => {
                self.state.notice = None;
                None
            }
        }
    }

    fn day_count(&self) -> usize {
        self.state.plan.as_ref().map_or(0, |p| p.days.len())
    }

    // ---- plan acquisition ----

    fn install_plan(&mut self, plan: WeeklyPlan) -> &WeeklyPlan {
        self.state.nav.clamp(plan.days.len());
        self.state.phase = LoadPhase::Ready;
        self.state.plan.insert(plan)
    }

    /// Use the cached plan if there is one, otherwise ask for a new one
    pub fn begin_load(&mut self) -> Option<Effect> {
        self.state.notice = None;
        if let Some(plan) = self.cache.load(&self.db) {
            info!("Loaded cached plan ({} days)", plan.days.len());
            self.install_plan(plan);
            return None;
        }
        info!("No cached plan, requesting a new one");
        self.state.phase = LoadPhase::Loading;
        Some(Effect::GeneratePlan)
    }

    /// Accept a generated plan. Nothing is cached on failure.
    pub fn finish_load(
        &mut self,
        result: Result<WeeklyPlan, AiError>,
    ) -> Result<&WeeklyPlan, AcquisitionError> {
        match result {
            Ok(plan) => {
                self.cache.save(&self.db, &plan);
                info!("New plan generated ({} days)", plan.days.len());
                Ok(self.install_plan(plan))
            }
            Err(e) => {
                let err = AcquisitionError::from(e);
                error!("Failed to fetch plan: {}", err);
                self.state.phase = LoadPhase::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn load_plan(&mut self) -> Result<&WeeklyPlan, AcquisitionError> {
        self.state.notice = None;
        if let Some(plan) = self.cache.load(&self.db) {
            return Ok(self.install_plan(plan));
        }
        self.state.phase = LoadPhase::Loading;
        let result = self.generator.generate_plan().await;
        self.finish_load(result)
    }

    /// Drop the current plan and everything hanging off it.
    ///
    /// Resets happen before the remote call so a failed fetch still leaves
    /// day 0 selected and the stopwatch at zero.
    pub fn begin_regenerate(&mut self) -> Option<Effect> {
        self.cache.clear(&self.db);
        let purged = self.ledger().purge();
        info!("Regenerating plan, dropped {} completion records", purged);

        self.state.stopwatch.reset();
        self.state.nav.reset();
        self.state.swapping.clear();
        self.state.plan = None;
        self.begin_load()
    }

    pub async fn regenerate_plan(&mut self) -> Result<&WeeklyPlan, AcquisitionError> {
        self.begin_regenerate();
        let result = self.generator.generate_plan().await;
        self.finish_load(result)
    }

    // ---- exercise replacement ----

    /// Mark the exercise in flight and capture what the AI needs to know
    pub fn begin_swap(&mut self, day: usize, exercise: usize) -> Result<SwapTicket, SwapError> {
        let plan = self.state.plan.as_ref().ok_or(SwapError::NoPlan)?;
        let day_plan = plan.day(day).ok_or(SwapError::OutOfRange { day, exercise })?;
        let current = day_plan
            .exercises
            .get(exercise)
            .ok_or(SwapError::OutOfRange { day, exercise })?;

        if !self.state.swapping.insert(current.id) {
            return Err(SwapError::InFlight);
        }

        info!("Swapping '{}' ({})", current.name, day_plan.day_name);
        Ok(SwapTicket {
            day,
            exercise,
            exercise_id: current.id,
            exercise_name: current.name.clone(),
            focus: day_plan.focus.clone(),
        })
    }

    /// Apply a replacement; the in-flight marker is cleared whatever happens
    pub fn finish_swap(
        &mut self,
        ticket: SwapTicket,
        result: Result<Exercise, AiError>,
    ) -> Result<Exercise, SwapError> {
        let outcome = self.apply_replacement(&ticket, result);
        self.state.swapping.remove(&ticket.exercise_id);
        outcome
    }

    fn apply_replacement(
        &mut self,
        ticket: &SwapTicket,
        result: Result<Exercise, AiError>,
    ) -> Result<Exercise, SwapError> {
        let replacement =
            result.inspect_err(|e| warn!("Failed to swap '{}': {}", ticket.exercise_name, e))?;

        // Located by id: the plan may have been regenerated meanwhile
        let plan = self.state.plan.as_mut().ok_or(SwapError::Stale)?;
        let day = plan.days.get_mut(ticket.day).ok_or(SwapError::Stale)?;
        let slot = day.position_of(ticket.exercise_id).ok_or(SwapError::Stale)?;
        day.exercises[slot] = replacement.clone();

        self.cache.save(&self.db, plan);
        CompletionLedger::new(&self.db).forget(ticket.exercise_id);

        info!("Replaced '{}' with '{}'", ticket.exercise_name, replacement.name);
        Ok(replacement)
    }

    pub async fn swap_exercise(
        &mut self,
        day: usize,
        exercise: usize,
    ) -> Result<Exercise, SwapError> {
        let ticket = self.begin_swap(day, exercise)?;
        let result = self
            .generator
            .replace_exercise(&ticket.exercise_name, &ticket.focus)
            .await;
        self.finish_swap(ticket, result)
    }

    pub fn is_swapping(&self, id: ExerciseId) -> bool {
        self.state.swapping.contains(&id)
    }

    // ---- completion ----

    pub fn is_completed(&self, id: ExerciseId) -> bool {
        self.ledger().is_completed(id)
    }

    /// (done, total) for a day
    pub fn day_progress(&self, day: usize) -> (usize, usize) {
        self.state
            .plan
            .as_ref()
            .and_then(|p| p.day(day))
            .map_or((0, 0), |d| (self.ledger().completed_count(d), d.exercises.len()))
    }

    /// Set a completion flag and feed the resulting events to the stopwatch.
    /// `None` when the exercise does not exist.
    pub fn set_completed(
        &mut self,
        day: usize,
        exercise: usize,
        value: bool,
    ) -> Option<Vec<WorkoutEvent>> {
        let day_plan = self.state.plan.as_ref()?.day(day)?;
        let id = day_plan.exercises.get(exercise)?.id;

        let active = self.state.nav.current();
        let events = CompletionLedger::new(&self.db).update(day_plan, day, id, value, active);
        for event in &events {
            if let WorkoutEvent::DayComplete { day } = event {
                info!("Day {} complete", day);
            }
            self.state.stopwatch.apply(*event);
        }
        Some(events)
    }

    pub fn toggle_completed(&mut self, day: usize, exercise: usize) -> Option<Vec<WorkoutEvent>> {
        let id = self.state.plan.as_ref()?.exercise(day, exercise)?.id;
        let value = !self.is_completed(id);
        self.set_completed(day, exercise, value)
    }
}
