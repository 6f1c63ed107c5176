//! Day navigation

use chrono::{Datelike, Local, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigation {
    current: usize,
}

impl Navigation {
    /// Start on today's day; weekends open the first day
    pub fn today() -> Self {
        Self::for_weekday(Local::now().weekday())
    }

    pub fn for_weekday(weekday: Weekday) -> Self {
        let current = match weekday {
            Weekday::Sat | Weekday::Sun => 0,
            day => day.num_days_from_monday() as usize,
        };
        Self { current }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn advance(&mut self, day_count: usize) {
        if self.current + 1 < day_count {
            self.current += 1;
        }
    }

    pub fn retreat(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Ignored when `index` is outside the plan
    pub fn jump_to(&mut self, index: usize, day_count: usize) {
        if index < day_count {
            self.current = index;
        }
    }

    /// Keep the index inside a freshly loaded plan
    pub fn clamp(&mut self, day_count: usize) {
        self.current = self.current.min(day_count.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_mapping() {
        assert_eq!(Navigation::for_weekday(Weekday::Mon).current(), 0);
        assert_eq!(Navigation::for_weekday(Weekday::Wed).current(), 2);
        assert_eq!(Navigation::for_weekday(Weekday::Fri).current(), 4);
        assert_eq!(Navigation::for_weekday(Weekday::Sat).current(), 0);
        assert_eq!(Navigation::for_weekday(Weekday::Sun).current(), 0);
    }

    #[test]
    fn test_bounds() {
        let mut nav = Navigation::for_weekday(Weekday::Thu);
        nav.advance(5);
        assert_eq!(nav.current(), 4);
        nav.advance(5);
        assert_eq!(nav.current(), 4);

        nav.reset();
        nav.retreat();
        assert_eq!(nav.current(), 0);
    }

    #[test]
    fn test_jump_to_guarded() {
        let mut nav = Navigation::default();
        nav.jump_to(3, 5);
        assert_eq!(nav.current(), 3);
        nav.jump_to(5, 5);
        assert_eq!(nav.current(), 3);
    }

    #[test]
    fn test_clamp() {
        let mut nav = Navigation::for_weekday(Weekday::Fri);
        nav.clamp(3);
        assert_eq!(nav.current(), 2);
        nav.clamp(0);
        assert_eq!(nav.current(), 0);
    }
}
