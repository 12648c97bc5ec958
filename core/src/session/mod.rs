//! Session timing: the activity-gated combat clock and the countdown.

mod clock;
mod countdown;

pub use clock::{ACTIVITY_GRACE, CombatClock};
pub use countdown::{Countdown, CountdownTick, InvalidCountdown};
