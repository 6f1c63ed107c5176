//! Workout stopwatch

use crate::ledger::WorkoutEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopwatch {
    Paused { elapsed: u64 },
    Running { elapsed: u64 },
}

impl Default for Stopwatch {
    fn default() -> Self {
        Stopwatch::Paused { elapsed: 0 }
    }
}

impl Stopwatch {
    pub fn elapsed(&self) -> u64 {
        match *self {
            Stopwatch::Paused { elapsed } | Stopwatch::Running { elapsed } => elapsed,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Stopwatch::Running { .. })
    }

    pub fn start(&mut self) {
        if let Stopwatch::Paused { elapsed } = *self {
            *self = Stopwatch::Running { elapsed };
        }
    }

    pub fn pause(&mut self) {
        if let Stopwatch::Running { elapsed } = *self {
            *self = Stopwatch::Paused { elapsed };
        }
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        *self = Stopwatch::default();
    }

    /// One second passed
    pub fn tick(&mut self) {
        if let Stopwatch::Running { elapsed } = self {
            *elapsed += 1;
        }
    }

    /// Interaction starts a paused watch, a finished day pauses it
    pub fn apply(&mut self, event: WorkoutEvent) {
        match event {
            WorkoutEvent::ExerciseInteraction => self.start(),
            WorkoutEvent::DayComplete { .. } => self.pause(),
        }
    }

    /// Compact form for the header: MM:SS, or H:MM past an hour
    pub fn header_time(&self) -> String {
        let secs = self.elapsed();
        if secs >= 3600 {
            format!("{}:{:02}", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{:02}:{:02}", secs / 60, secs % 60)
        }
    }

    /// Full form for the stopwatch panel: MM:SS, or H:MM:SS past an hour
    pub fn full_time(&self) -> String {
        let secs = self.elapsed();
        let hours = secs / 3600;
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, (secs % 3600) / 60, secs % 60)
        } else {
            format!("{:02}:{:02}", secs / 60, secs % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let sw = Stopwatch::default();
        assert_eq!(sw, Stopwatch::Paused { elapsed: 0 });
        assert!(!sw.is_running());
    }

    #[test]
    fn test_tick_only_while_running() {
        let mut sw = Stopwatch::default();
        sw.tick();
        assert_eq!(sw.elapsed(), 0);

        sw.start();
        sw.tick();
        sw.tick();
        sw.pause();
        sw.tick();
        assert_eq!(sw, Stopwatch::Paused { elapsed: 2 });
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut sw = Stopwatch::default();
        sw.start();
        sw.tick();
        sw.start();
        assert_eq!(sw, Stopwatch::Running { elapsed: 1 });
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut sw = Stopwatch::default();
        sw.toggle();
        assert!(sw.is_running());
        sw.tick();
        sw.toggle();
        assert_eq!(sw.elapsed(), 1);
        assert!(!sw.is_running());

        sw.start();
        sw.reset();
        assert_eq!(sw, Stopwatch::Paused { elapsed: 0 });
    }

    #[test]
    fn test_events() {
        let mut sw = Stopwatch::default();
        sw.apply(WorkoutEvent::ExerciseInteraction);
        assert!(sw.is_running());
        sw.apply(WorkoutEvent::DayComplete { day: 0 });
        assert!(!sw.is_running());
    }

    #[test]
    fn test_formatting() {
        let sw = Stopwatch::Paused { elapsed: 65 };
        assert_eq!(sw.header_time(), "01:05");
        assert_eq!(sw.full_time(), "01:05");

        let sw = Stopwatch::Paused { elapsed: 3_725 };
        assert_eq!(sw.header_time(), "1:02");
        assert_eq!(sw.full_time(), "1:02:05");
    }
}
