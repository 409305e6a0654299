use std::time::Duration;

use log::debug;

use super::{
  state::InteractionState,
  surface::{CameraControl, EaseTo, Easing},
  timer::{Timer, TimerSlot},
};

/// Quiet time after which the camera starts to pan on its own.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10);
/// Longitude covered by one pan step.
pub const PAN_STEP_DEGREES: f64 = 5.;
/// Duration of one pan step, also the period between steps.
pub const PAN_STEP_DURATION: Duration = Duration::from_secs(5);

/// Autonomous panning while nobody touches the map.
///
/// Owns the idle timer and the pan interval. At most one of the two is armed at any time.
#[derive(Debug)]
pub struct IdlePanController {
  idle_timer: TimerSlot,
  pan_interval: TimerSlot,
  popup_open: bool,
}

impl Default for IdlePanController {
  fn default() -> Self {
    Self::new()
  }
}

impl IdlePanController {
  #[must_use]
  pub fn new() -> Self {
    Self {
      idle_timer: TimerSlot::new("idle timer"),
      pan_interval: TimerSlot::new("pan interval"),
      popup_open: false,
    }
  }

  /// Pointer down, drag, zoom, pitch, rotate or touch.
  pub fn notify_user_interaction(&mut self, state: &mut InteractionState) {
    self.stop(state);
  }

  /// The backend settled. Starts the countdown towards panning.
  pub fn notify_map_idle(&mut self, now: Duration, state: &mut InteractionState) {
    if !self.is_live(state) {
      self.stop(state);
      return;
    }
    // The backend also settles between two pan steps.
    if self.is_panning() {
      return;
    }
    self.arm_idle(now, state);
  }

  /// A modal popup opened.
  pub fn suspend(&mut self, state: &mut InteractionState) {
    self.popup_open = true;
    self.stop(state);
  }

  /// The modal popup closed.
  pub fn resume(&mut self, now: Duration, state: &mut InteractionState) {
    self.popup_open = false;
    self.rearm_idle(now, state);
  }

  /// Restarts the countdown, e.g. once the side panel is closed.
  pub fn rearm_idle(&mut self, now: Duration, state: &mut InteractionState) {
    if self.is_live(state) {
      self.arm_idle(now, state);
    }
  }

  /// Cancels the idle timer and any panning.
  pub fn stop(&mut self, state: &mut InteractionState) {
    self.idle_timer.cancel();
    self.stop_panning(state);
  }

  #[must_use]
  pub fn is_panning(&self) -> bool {
    self.pan_interval.is_armed()
  }

  #[must_use]
  pub fn is_idle_timer_armed(&self) -> bool {
    self.idle_timer.is_armed()
  }

  #[must_use]
  pub fn is_popup_open(&self) -> bool {
    self.popup_open
  }

  #[must_use]
  pub fn next_deadline(&self) -> Option<Duration> {
    match (self.idle_timer.deadline(), self.pan_interval.deadline()) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, b) => a.or(b),
    }
  }

  /// Fires whichever timer is due at `now`, one at a time.
  pub fn fire(
    &mut self,
    now: Duration,
    state: &mut InteractionState,
    camera: &mut impl CameraControl,
  ) {
    if let Some((at, ())) = self.idle_timer.take_due(now) {
      if self.is_live(state) {
        self.start_panning(at, state, camera);
      }
    } else if self.pan_interval.take_due(now).is_some() {
      if self.is_live(state) {
        Self::pan_step(camera);
      } else {
        self.stop_panning(state);
      }
    }
  }

  fn is_live(&self, state: &InteractionState) -> bool {
    !self.popup_open && !state.has_selection()
  }

  fn arm_idle(&mut self, now: Duration, state: &mut InteractionState) {
    self.stop_panning(state);
    self.idle_timer.arm(Timer::timeout(now, IDLE_TIMEOUT));
  }

  fn start_panning(
    &mut self,
    now: Duration,
    state: &mut InteractionState,
    camera: &mut impl CameraControl,
  ) {
    self.idle_timer.cancel();
    debug!("Starting to pan after {IDLE_TIMEOUT:?} of inactivity.");
    *state = InteractionState::Panning;
    Self::pan_step(camera);
    self.pan_interval.arm(Timer::interval(now, PAN_STEP_DURATION));
  }

  fn stop_panning(&mut self, state: &mut InteractionState) {
    if self.pan_interval.cancel() {
      debug!("Stopped panning.");
    }
    if state.is_panning() {
      *state = InteractionState::Idle;
    }
  }

  fn pan_step(camera: &mut impl CameraControl) {
    let center = camera.center();
    camera.ease_to(EaseTo {
      center: center.shifted_lng(PAN_STEP_DEGREES),
      duration: PAN_STEP_DURATION,
      easing: Easing::Linear,
    });
  }
}
