use std::time::Duration;

use super::timer::{Timer, TimerSlot};

/// Number of equal steps of a panel width animation.
pub const WIDTH_STEPS: u32 = 20;
/// Time between two width steps.
pub const WIDTH_STEP_PERIOD: Duration = Duration::from_millis(50);

/// One tick of a [`WidthAnimation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthStep {
  pub width: f32,
  /// The animation reached its end value with this step.
  pub finished: bool,
}

/// Drives a width from one value to another in [`WIDTH_STEPS`] equal steps.
///
/// Used for both opening and closing the side panel. Each step value is computed from the
/// step index rather than accumulated, so the last step lands exactly on the end value and
/// no step overshoots it.
#[derive(Debug)]
pub struct WidthAnimation {
  from: f32,
  to: f32,
  step: u32,
  interval: TimerSlot,
}

impl WidthAnimation {
  #[must_use]
  pub fn new(now: Duration, from: f32, to: f32) -> Self {
    let mut interval = TimerSlot::new("width animation");
    interval.arm(Timer::interval(now, WIDTH_STEP_PERIOD));
    Self {
      from,
      to,
      step: 0,
      interval,
    }
  }

  #[must_use]
  pub fn next_deadline(&self) -> Option<Duration> {
    self.interval.deadline()
  }

  /// Advances by one step if the interval is due. The interval is released with the
  /// finishing step.
  pub fn tick(&mut self, now: Duration) -> Option<(Duration, WidthStep)> {
    let (at, ()) = self.interval.take_due(now)?;
    self.step += 1;
    let finished = self.step >= WIDTH_STEPS || (self.to - self.from).abs() < f32::EPSILON;
    let width = if finished {
      self.to
    } else {
      #[allow(clippy::cast_precision_loss)]
      let width = self.from + (self.to - self.from) * self.step as f32 / WIDTH_STEPS as f32;
      width.clamp(self.from.min(self.to), self.from.max(self.to))
    };
    if finished {
      self.interval.cancel();
    }
    Some((at, WidthStep { width, finished }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;

  fn run(mut animation: WidthAnimation) -> Vec<WidthStep> {
    let mut steps = Vec::new();
    while let Some(deadline) = animation.next_deadline() {
      let (_, step) = animation.tick(deadline).expect("due at its own deadline");
      steps.push(step);
    }
    steps
  }

  #[test]
  fn opening_to_400() {
    let steps = run(WidthAnimation::new(Duration::ZERO, 0., 400.));
    assert_eq!(steps.len(), 20);
    for (i, step) in steps.iter().enumerate() {
      #[allow(clippy::cast_precision_loss)]
      let expected = 20. * (i + 1) as f32;
      assert_approx_eq!(step.width, expected, 1e-3);
      assert_eq!(step.finished, i == 19);
    }
    assert!((steps[19].width - 400.).abs() < f32::EPSILON);
  }

  #[test]
  fn closing_is_non_increasing_and_ends_at_zero() {
    let steps = run(WidthAnimation::new(Duration::ZERO, 333.3, 0.));
    assert_eq!(steps.len(), 20);
    assert!(steps.windows(2).all(|w| w[1].width <= w[0].width));
    assert!(steps.iter().all(|s| (0.0..=333.3).contains(&s.width)));
    assert!(steps[19].width.abs() < f32::EPSILON);
  }

  #[test]
  fn steps_are_50ms_apart() {
    let mut animation = WidthAnimation::new(Duration::from_millis(1000), 0., 100.);
    assert_eq!(animation.tick(Duration::from_millis(1049)), None);
    let (at, _) = animation.tick(Duration::from_millis(1050)).unwrap();
    assert_eq!(at, Duration::from_millis(1050));
    assert_eq!(animation.next_deadline(), Some(Duration::from_millis(1100)));
  }

  #[test]
  fn empty_animation_finishes_on_first_tick() {
    let steps = run(WidthAnimation::new(Duration::ZERO, 0., 0.));
    assert_eq!(
      steps,
      vec![WidthStep {
        width: 0.,
        finished: true
      }]
    );
  }
}
