use thiserror::Error;

use crate::format::format_countdown;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("countdown needs a positive number of seconds")]
pub struct InvalidCountdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Idle,
    Running(u32),
    Finished,
}

/// Fixed-length combat countdown, driven by the one-second clock tick.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: Option<u32>,
}

impl Countdown {
    pub fn start(&mut self, seconds: u32) -> Result<(), InvalidCountdown> {
        if seconds == 0 {
            return Err(InvalidCountdown);
        }
        self.remaining = Some(seconds);
        Ok(())
    }

    pub fn tick(&mut self) -> CountdownTick {
        match self.remaining {
            None => CountdownTick::Idle,
            Some(left) if left <= 1 => {
                self.remaining = None;
                CountdownTick::Finished
            }
            Some(left) => {
                self.remaining = Some(left - 1);
                CountdownTick::Running(left - 1)
            }
        }
    }

    /// Stop early. Returns true if a countdown was running.
    pub fn abort(&mut self) -> bool {
        self.remaining.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// `mm:ss` while running, empty otherwise.
    pub fn text(&self) -> String {
        self.remaining.map(format_countdown).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero() {
        let mut countdown = Countdown::default();
        assert_eq!(countdown.start(0), Err(InvalidCountdown));
        assert!(!countdown.is_running());
    }

    #[test]
    fn test_counts_down_to_finished() {
        let mut countdown = Countdown::default();
        countdown.start(3).unwrap();
        assert_eq!(countdown.text(), "00:03");

        assert_eq!(countdown.tick(), CountdownTick::Running(2));
        assert_eq!(countdown.tick(), CountdownTick::Running(1));
        assert_eq!(countdown.tick(), CountdownTick::Finished);
        assert_eq!(countdown.tick(), CountdownTick::Idle);
        assert_eq!(countdown.text(), "");
    }

    #[test]
    fn test_abort() {
        let mut countdown = Countdown::default();
        countdown.start(90).unwrap();
        assert_eq!(countdown.text(), "01:30");
        assert!(countdown.abort());
        assert!(!countdown.abort());
    }
}
