//! Timers on the widget clock.
//!
//! The clock is the `Duration` elapsed since the widget was created. Nothing here sleeps:
//! the owner asks for the next deadline and fires timers once the clock passes it.

use std::time::Duration;

use log::trace;

/// A one-shot or periodic deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
  deadline: Duration,
  period: Option<Duration>,
}

impl Timer {
  /// Fires once, `delay` after `now`.
  #[must_use]
  pub fn timeout(now: Duration, delay: Duration) -> Self {
    Self {
      deadline: now + delay,
      period: None,
    }
  }

  /// Fires every `period`, the first time one period after `now`.
  #[must_use]
  pub fn interval(now: Duration, period: Duration) -> Self {
    Self {
      deadline: now + period,
      period: Some(period),
    }
  }

  #[must_use]
  pub fn deadline(&self) -> Duration {
    self.deadline
  }

  #[must_use]
  pub fn is_due(&self, now: Duration) -> bool {
    self.deadline <= now
  }
}

/// A named handle holding at most one live timer and the action it stands for.
#[derive(Debug)]
pub struct TimerSlot<T = ()> {
  name: &'static str,
  armed: Option<(Timer, T)>,
}

impl<T: Copy> TimerSlot<T> {
  #[must_use]
  pub const fn new(name: &'static str) -> Self {
    Self { name, armed: None }
  }

  /// Arms the slot, cancelling whatever was armed before.
  pub fn arm_with(&mut self, timer: Timer, action: T) {
    self.cancel();
    trace!("{}: armed for {:?}", self.name, timer.deadline);
    self.armed = Some((timer, action));
  }

  /// Returns whether a timer was actually cancelled.
  pub fn cancel(&mut self) -> bool {
    let cancelled = self.armed.take().is_some();
    if cancelled {
      trace!("{}: cancelled", self.name);
    }
    cancelled
  }

  #[must_use]
  pub fn is_armed(&self) -> bool {
    self.armed.is_some()
  }

  #[must_use]
  pub fn deadline(&self) -> Option<Duration> {
    self.armed.as_ref().map(|(t, _)| t.deadline)
  }

  /// Fires the timer if it is due at `now` and returns the deadline it fired for.
  ///
  /// One-shot timers are disarmed, periodic ones move on by one period, so repeated calls
  /// catch up on missed ticks one at a time and in order.
  pub fn take_due(&mut self, now: Duration) -> Option<(Duration, T)> {
    let (timer, action) = self.armed.as_mut().filter(|armed| armed.0.is_due(now))?;
    let fired_at = timer.deadline;
    let action = *action;
    match timer.period {
      Some(period) => timer.deadline += period,
      None => self.armed = None,
    }
    trace!("{}: fired at {fired_at:?}", self.name);
    Some((fired_at, action))
  }
}

impl TimerSlot<()> {
  pub fn arm(&mut self, timer: Timer) {
    self.arm_with(timer, ());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
  }

  #[test]
  fn timeout_fires_once() {
    let mut slot: TimerSlot = TimerSlot::new("test");
    slot.arm(Timer::timeout(ms(100), ms(50)));
    assert_eq!(slot.take_due(ms(149)), None);
    assert_eq!(slot.take_due(ms(200)), Some((ms(150), ())));
    assert!(!slot.is_armed());
    assert_eq!(slot.take_due(ms(1000)), None);
  }

  #[test]
  fn interval_catches_up_in_order() {
    let mut slot: TimerSlot = TimerSlot::new("test");
    slot.arm(Timer::interval(ms(0), ms(50)));
    assert_eq!(slot.take_due(ms(120)), Some((ms(50), ())));
    assert_eq!(slot.take_due(ms(120)), Some((ms(100), ())));
    assert_eq!(slot.take_due(ms(120)), None);
    assert_eq!(slot.deadline(), Some(ms(150)));
  }

  #[test]
  fn arming_replaces_the_previous_timer() {
    let mut slot = TimerSlot::new("test");
    slot.arm_with(Timer::timeout(ms(0), ms(10)), 1);
    slot.arm_with(Timer::timeout(ms(0), ms(500)), 2);
    assert_eq!(slot.take_due(ms(100)), None);
    assert_eq!(slot.take_due(ms(500)), Some((ms(500), 2)));
  }

  #[test]
  fn cancel_reports_whether_armed() {
    let mut slot: TimerSlot = TimerSlot::new("test");
    assert!(!slot.cancel());
    slot.arm(Timer::interval(ms(0), ms(10)));
    assert!(slot.cancel());
    assert_eq!(slot.deadline(), None);
  }
}
