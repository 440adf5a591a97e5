use std::fmt;
use std::thread;
use std::time::Duration;
use chrono::{Local, NaiveDateTime, Timelike};

/// Source of wall clock time and of blocking waits
pub trait Clock {
    /// Local wall clock time, truncated to whole seconds
    fn now(&self) -> NaiveDateTime;
    fn sleep(&self, duration: Duration);
}

/// The real clock, sleeping blocks the whole process
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// State of the polling job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Idle,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "Running"),
            JobState::Idle    => write!(f, "Idle   "),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use std::cell::RefCell;
    use chrono::{NaiveDate, TimeDelta};
    use super::*;

    /// Clock that advances instantly when asked to sleep
    pub struct FakeClock {
        now: RefCell<NaiveDateTime>,
        sleeps: RefCell<Vec<Duration>>,
    }

    impl FakeClock {
        pub fn new() -> FakeClock {
            FakeClock {
                now: RefCell::new(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap().and_hms_opt(8, 0, 0).unwrap()),
                sleeps: RefCell::new(Vec::new()),
            }
        }

        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.borrow().clone()
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.borrow()
        }

        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
            let delta = TimeDelta::from_std(duration).unwrap();
            *self.now.borrow_mut() += delta;
        }
    }

    impl<C: Clock + ?Sized> Clock for &C {
        fn now(&self) -> NaiveDateTime {
            (*self).now()
        }

        fn sleep(&self, duration: Duration) {
            (*self).sleep(duration)
        }
    }

    #[test]
    fn fake_clock_advances_on_sleep() {
        let clock = FakeClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_secs(900));
        assert_eq!(clock.now() - start, TimeDelta::seconds(900));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(900)]);
    }

    #[test]
    fn job_state_pads_to_equal_width() {
        assert_eq!(JobState::Running.to_string(), "Running");
        assert_eq!(JobState::Idle.to_string(), "Idle   ");
    }

    #[test]
    fn system_clock_has_second_precision() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }
}
